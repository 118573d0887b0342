// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Metric Engine (ξ, LVS, P_t, EWMA)
// ─────────────────────────────────────────────────────────────────────
//! Turns an ordered embedding sequence into four per-turn series:
//!
//!   ξ_t    = 1 - cos(e_t, e_{t-1})                      (tension, t >= 1)
//!   LVS_t  = sample var of pairwise (1 - cos) in the
//!            last k turns ending at t                    (t >= k-1)
//!   P_t    = cos(e_t, a),  a = mean(e_0 .. e_2)          (anchor projection)
//!   EWMA_t = alpha * ξ_t + (1 - alpha) * EWMA_{t-1}      (causal smoothing)
//!
//! Every function here is pure: all history is passed in explicitly and
//! nothing is cached between calls.

use rcxi_types::{EmbeddingSeries, HarnessError, HarnessResult, MetricMode, MetricSeries, RunConfig};

/// Number of leading turns averaged into the anchor vector.
pub const ANCHOR_TURNS: usize = 3;

#[inline]
fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m: f64, x| m.max(x.abs()))
}

/// Euclidean norm, accumulated on the max-abs-scaled vector so large and
/// tiny finite components neither overflow nor underflow.
pub fn norm(v: &[f64]) -> f64 {
    let scale = max_abs(v);
    if scale == 0.0 {
        return 0.0;
    }
    scale * v.iter().map(|x| (x / scale).powi(2)).sum::<f64>().sqrt()
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity, clamped to [-1, 1]. `None` if either vector is all zeros.
pub fn cosine(a: &[f64], b: &[f64]) -> Option<f64> {
    let ua = unit(a)?;
    let ub = unit(b)?;
    Some(dot(&ua, &ub).clamp(-1.0, 1.0))
}

/// Cosine distance `1 - cos`, in [0, 2].
#[inline]
pub fn cosine_distance(a: &[f64], b: &[f64]) -> Option<f64> {
    cosine(a, b).map(|c| 1.0 - c)
}

/// Unit-normalised copy, `None` only when every component is exactly zero.
fn unit(v: &[f64]) -> Option<Vec<f64>> {
    let scale = max_abs(v);
    if scale == 0.0 {
        return None;
    }
    let scaled: Vec<f64> = v.iter().map(|x| x / scale).collect();
    // max component is exactly ±1, so this norm lies in [1, sqrt(d)].
    let n = scaled.iter().map(|x| x * x).sum::<f64>().sqrt();
    Some(scaled.into_iter().map(|x| x / n).collect())
}

/// Sample variance (n - 1 denominator). A single value has zero spread.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1) as f64).max(0.0)
}

fn first_degenerate(units: &[Option<Vec<f64>>]) -> Option<usize> {
    units.iter().position(Option::is_none)
}

/// Tension ξ per turn. Index 0 is always `None`.
///
/// Returns the series and the number of points skipped (best-effort only).
pub fn tension_series(
    series: &EmbeddingSeries,
    mode: MetricMode,
) -> HarnessResult<(Vec<Option<f64>>, usize)> {
    let units: Vec<Option<Vec<f64>>> = series.iter().map(unit).collect();
    tension_from_units(&units, mode)
}

fn tension_from_units(
    units: &[Option<Vec<f64>>],
    mode: MetricMode,
) -> HarnessResult<(Vec<Option<f64>>, usize)> {
    if mode == MetricMode::Strict {
        if let Some(turn) = first_degenerate(units) {
            return Err(HarnessError::DegenerateVector { turn });
        }
    }
    let mut xi = vec![None; units.len()];
    let mut skipped = 0;
    for t in 1..units.len() {
        match (&units[t - 1], &units[t]) {
            (Some(prev), Some(cur)) => {
                xi[t] = Some((1.0 - dot(prev, cur).clamp(-1.0, 1.0)).clamp(0.0, 2.0));
            }
            _ => {
                log::warn!("tension: degenerate vector near turn {t}, recording null");
                skipped += 1;
            }
        }
    }
    Ok((xi, skipped))
}

/// Local variance of stability per turn. `None` before turn `k - 1`.
pub fn lvs_series(
    series: &EmbeddingSeries,
    k: usize,
    mode: MetricMode,
) -> HarnessResult<(Vec<Option<f64>>, usize)> {
    if k < 2 {
        return Err(HarnessError::Configuration(format!(
            "k must be >= 2, got {k}"
        )));
    }
    let units: Vec<Option<Vec<f64>>> = series.iter().map(unit).collect();
    lvs_from_units(&units, k, mode)
}

fn lvs_from_units(
    units: &[Option<Vec<f64>>],
    k: usize,
    mode: MetricMode,
) -> HarnessResult<(Vec<Option<f64>>, usize)> {
    if mode == MetricMode::Strict {
        if let Some(turn) = first_degenerate(units) {
            return Err(HarnessError::DegenerateVector { turn });
        }
    }
    let t_len = units.len();
    let mut lvs = vec![None; t_len];
    let mut skipped = 0;
    if k > t_len {
        return Ok((lvs, 0));
    }
    let mut dists = Vec::with_capacity(k * (k - 1) / 2);

    for t in (k - 1)..t_len {
        let window = &units[t + 1 - k..=t];
        if window.iter().any(Option::is_none) {
            log::warn!("lvs: degenerate vector in window ending at turn {t}, recording null");
            skipped += 1;
            continue;
        }
        dists.clear();
        for i in 0..k {
            for j in (i + 1)..k {
                if let (Some(a), Some(b)) = (&window[i], &window[j]) {
                    dists.push(1.0 - dot(a, b).clamp(-1.0, 1.0));
                }
            }
        }
        lvs[t] = Some(sample_variance(&dists));
    }
    Ok((lvs, skipped))
}

/// Anchor mean divided by the largest component magnitude among the
/// anchor turns, plus that magnitude. Same direction as the mean.
fn scaled_anchor(series: &EmbeddingSeries) -> (Vec<f64>, f64) {
    let n = ANCHOR_TURNS.min(series.len());
    let scale = series
        .iter()
        .take(n)
        .map(max_abs)
        .fold(0.0, f64::max);
    let mut a = vec![0.0; series.dim()];
    if scale == 0.0 {
        return (a, 0.0);
    }
    for v in series.iter().take(n) {
        for (acc, x) in a.iter_mut().zip(v) {
            *acc += x / scale;
        }
    }
    for acc in a.iter_mut() {
        *acc /= n as f64;
    }
    (a, scale)
}

/// Mean of the first `ANCHOR_TURNS` turns (fewer if the series is shorter).
pub fn anchor_vector(series: &EmbeddingSeries) -> Vec<f64> {
    let (a, scale) = scaled_anchor(series);
    a.into_iter().map(|x| x * scale).collect()
}

/// Anchor projection P_t = cos(e_t, a) for every turn.
pub fn anchor_projection_series(
    series: &EmbeddingSeries,
    mode: MetricMode,
) -> HarnessResult<(Vec<Option<f64>>, usize)> {
    let anchor_turns = ANCHOR_TURNS.min(series.len());
    let (scaled, _) = scaled_anchor(series);
    let Some(anchor) = unit(&scaled) else {
        return match mode {
            MetricMode::Strict => Err(HarnessError::DegenerateAnchor {
                turns: anchor_turns,
            }),
            MetricMode::BestEffort => {
                log::warn!("anchor: mean of leading turns has zero norm, P_t recorded as null");
                Ok((vec![None; series.len()], series.len()))
            }
        };
    };
    if mode == MetricMode::BestEffort {
        for t in series.degenerate_turns().into_iter().filter(|t| *t < anchor_turns) {
            log::warn!("anchor: zero vector at turn {t} averaged into the anchor");
        }
    }

    let mut pt = Vec::with_capacity(series.len());
    let mut skipped = 0;
    for (t, v) in series.iter().enumerate() {
        match unit(v) {
            Some(u) => pt.push(Some(dot(&u, &anchor).clamp(-1.0, 1.0))),
            None => match mode {
                MetricMode::Strict => return Err(HarnessError::DegenerateVector { turn: t }),
                MetricMode::BestEffort => {
                    log::warn!("anchor projection: degenerate vector at turn {t}, recording null");
                    skipped += 1;
                    pt.push(None);
                }
            },
        }
    }
    Ok((pt, skipped))
}

/// Exponentially weighted moving average over a tension series.
///
/// Seeded by the first available value; missing values leave the filter
/// state untouched and produce `None` at that turn.
pub fn ewma(xi: &[Option<f64>], alpha: f64) -> Vec<Option<f64>> {
    let mut state: Option<f64> = None;
    xi.iter()
        .map(|x| {
            let x = (*x)?;
            let next = match state {
                None => x,
                Some(prev) => alpha * x + (1.0 - alpha) * prev,
            };
            state = Some(next);
            Some(next)
        })
        .collect()
}

/// Compute all four series for one run.
pub fn compute_metrics(
    series: &EmbeddingSeries,
    config: &RunConfig,
) -> HarnessResult<MetricSeries> {
    config.validate()?;
    let mode = config.mode;
    let units: Vec<Option<Vec<f64>>> = series.iter().map(unit).collect();

    let (xi, xi_skipped) = tension_from_units(&units, mode)?;
    let (lvs, lvs_skipped) = lvs_from_units(&units, config.k, mode)?;
    let (pt, pt_skipped) = anchor_projection_series(series, mode)?;
    let ewma = ewma(&xi, config.alpha);

    let skipped_points = 2 * xi_skipped + lvs_skipped + pt_skipped;
    if skipped_points > 0 {
        log::warn!(
            "metrics: {skipped_points} points skipped over {} turns ({})",
            series.len(),
            config.provider
        );
    }
    log::debug!(
        "metrics: T={} d={} k={} alpha={}",
        series.len(),
        series.dim(),
        config.k,
        config.alpha
    );

    Ok(MetricSeries {
        xi,
        lvs,
        pt,
        ewma,
        k: config.k,
        skipped_points,
    })
}
