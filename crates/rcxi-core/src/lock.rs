// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Lock Detector
// ─────────────────────────────────────────────────────────────────────
//! Two-state detector: `Unlocked` → `Locked(t)`.
//!
//! At turn `t` the lock condition holds when the last `m` tension values
//! ξ_{t-m+1..=t} are all strictly below `eps_xi` and LVS_t is strictly
//! below `eps_lvs`. The reported lock is the first such turn; nothing
//! after it is re-checked.

use rcxi_types::{HarnessError, HarnessResult, LockState, MetricSeries, RunConfig};

/// Streaming lock detector, fed one turn at a time.
///
/// `Locked` is terminal: later turns are ignored.
#[derive(Debug, Clone)]
pub struct LockDetector {
    m: usize,
    eps_xi: f64,
    eps_lvs: f64,
    start: usize,
    turn: usize,
    below_run: usize,
    state: LockState,
}

impl LockDetector {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            m: config.m,
            eps_xi: config.eps_xi,
            eps_lvs: config.eps_lvs,
            start: config.first_lock_turn(),
            turn: 0,
            below_run: 0,
            state: LockState::Unlocked,
        }
    }

    /// Feed the ξ and LVS values of the next turn (turn 0 first).
    pub fn push(&mut self, xi: Option<f64>, lvs: Option<f64>) -> LockState {
        if self.state.is_locked() {
            return self.state;
        }
        let t = self.turn;
        self.turn += 1;

        // Consecutive-run counter gives the "all last m below" check in O(1).
        match xi {
            Some(x) if x < self.eps_xi => self.below_run += 1,
            _ => self.below_run = 0,
        }

        if t >= self.start && self.below_run >= self.m {
            if let Some(l) = lvs {
                if l < self.eps_lvs {
                    log::info!("lock detected at turn {t} (lvs={l:.6})");
                    self.state = LockState::Locked(t);
                }
            }
        }
        self.state
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    /// Turns consumed so far.
    pub fn turns_seen(&self) -> usize {
        self.turn
    }
}

/// Single forward scan over a metric series.
pub fn detect_lock(metrics: &MetricSeries, config: &RunConfig) -> LockState {
    let mut detector = LockDetector::new(config);
    for (xi, lvs) in metrics.xi.iter().zip(&metrics.lvs) {
        if detector.push(*xi, *lvs).is_locked() {
            break;
        }
    }
    detector.state()
}

/// Whether the lock condition holds at exactly turn `t`.
///
/// Turns before both windows have filled have no defined lock state.
pub fn lock_condition_at(
    metrics: &MetricSeries,
    config: &RunConfig,
    t: usize,
) -> HarnessResult<bool> {
    let start = config.first_lock_turn();
    if t < start {
        return Err(HarnessError::InsufficientHistory {
            turn: t,
            needed: start + 1,
        });
    }
    if t >= metrics.len() {
        return Err(HarnessError::Configuration(format!(
            "turn {t} beyond series of {} turns",
            metrics.len()
        )));
    }
    let tension_ok = metrics.xi[t + 1 - config.m..=t]
        .iter()
        .all(|x| matches!(x, Some(v) if *v < config.eps_xi));
    let lvs_ok = matches!(metrics.lvs[t], Some(v) if v < config.eps_lvs);
    Ok(tension_ok && lvs_ok)
}

/// Stricter variant: the first qualifying turn whose condition also holds
/// for the following `hold` turns. `hold = 0` matches [`detect_lock`].
pub fn detect_lock_persistent(
    metrics: &MetricSeries,
    config: &RunConfig,
    hold: usize,
) -> LockState {
    let start = config.first_lock_turn();
    let n = metrics.len();
    if n == 0 || start >= n {
        return LockState::Unlocked;
    }
    let qualifies: Vec<bool> = (start..n)
        .map(|t| lock_condition_at(metrics, config, t).unwrap_or(false))
        .collect();

    let mut streak = 0usize;
    for (i, &ok) in qualifies.iter().enumerate() {
        if ok {
            streak += 1;
            if streak > hold {
                return LockState::Locked(start + i - hold);
            }
        } else {
            streak = 0;
        }
    }
    LockState::Unlocked
}
