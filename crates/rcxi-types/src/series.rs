// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Stabilization Harness Series Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

/// Ordered turn embeddings, all of one dimensionality `d`.
///
/// Construction checks shape (≥ 2 turns, equal lengths, finite values).
/// Zero-norm turns are allowed here; the metric engine decides whether
/// they are fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct EmbeddingSeries {
    turns: Vec<Vec<f64>>,
    dim: usize,
}

impl EmbeddingSeries {
    pub fn new(turns: Vec<Vec<f64>>) -> HarnessResult<Self> {
        if turns.len() < 2 {
            return Err(HarnessError::TooFewTurns { found: turns.len() });
        }
        let dim = turns[0].len();
        if dim == 0 {
            return Err(HarnessError::ShapeMismatch {
                turn: 0,
                expected: 1,
                found: 0,
            });
        }
        for (t, v) in turns.iter().enumerate() {
            if v.len() != dim {
                return Err(HarnessError::ShapeMismatch {
                    turn: t,
                    expected: dim,
                    found: v.len(),
                });
            }
            if let Some(j) = v.iter().position(|x| !x.is_finite()) {
                return Err(HarnessError::NonFinite { turn: t, dim: j });
            }
        }
        Ok(Self { turns, dim })
    }

    /// Number of turns `T`.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: a valid series holds at least two turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Dimensionality `d`.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn turn(&self, t: usize) -> &[f64] {
        &self.turns[t]
    }

    pub fn turns(&self) -> &[Vec<f64>] {
        &self.turns
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.turns.iter().map(Vec::as_slice)
    }

    /// Indices of zero-norm turns.
    pub fn degenerate_turns(&self) -> Vec<usize> {
        self.turns
            .iter()
            .enumerate()
            .filter(|(_, v)| v.iter().all(|&x| x == 0.0))
            .map(|(t, _)| t)
            .collect()
    }

    pub fn into_inner(self) -> Vec<Vec<f64>> {
        self.turns
    }
}

impl TryFrom<Vec<Vec<f64>>> for EmbeddingSeries {
    type Error = HarnessError;

    fn try_from(turns: Vec<Vec<f64>>) -> HarnessResult<Self> {
        Self::new(turns)
    }
}

impl From<EmbeddingSeries> for Vec<Vec<f64>> {
    fn from(series: EmbeddingSeries) -> Self {
        series.turns
    }
}

/// Derived per-turn series, indexed by turn `0..T`.
///
/// `None` marks a point that is undefined: ξ and EWMA at turn 0, LVS
/// before turn `k - 1`, and any point skipped in best-effort mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub xi: Vec<Option<f64>>,
    pub lvs: Vec<Option<f64>>,
    pub pt: Vec<Option<f64>>,
    pub ewma: Vec<Option<f64>>,
    /// LVS window the series was computed with.
    pub k: usize,
    /// Points recorded as missing because of a zero-norm vector.
    pub skipped_points: usize,
}

impl MetricSeries {
    pub fn len(&self) -> usize {
        self.xi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xi.is_empty()
    }

    /// Defined tension values in turn order.
    pub fn xi_values(&self) -> Vec<f64> {
        self.xi.iter().flatten().copied().collect()
    }

    /// Defined anchor projections in turn order.
    pub fn pt_values(&self) -> Vec<f64> {
        self.pt.iter().flatten().copied().collect()
    }

    /// LVS at turn `t`; an error before the window has filled.
    pub fn lvs_at(&self, t: usize) -> HarnessResult<Option<f64>> {
        if t + 1 < self.k {
            return Err(HarnessError::InsufficientHistory {
                turn: t,
                needed: self.k,
            });
        }
        Ok(self.lvs.get(t).copied().flatten())
    }

    /// Tension at turn `t`; turn 0 has no predecessor.
    pub fn xi_at(&self, t: usize) -> HarnessResult<Option<f64>> {
        if t == 0 {
            return Err(HarnessError::InsufficientHistory { turn: 0, needed: 2 });
        }
        Ok(self.xi.get(t).copied().flatten())
    }
}

/// Result of the lock scan over one metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "Option<usize>", from = "Option<usize>")]
pub enum LockState {
    #[default]
    Unlocked,
    /// First turn at which the lock condition held.
    Locked(usize),
}

impl LockState {
    pub fn turn(&self) -> Option<usize> {
        match self {
            Self::Unlocked => None,
            Self::Locked(t) => Some(*t),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked(_))
    }
}

impl From<LockState> for Option<usize> {
    fn from(state: LockState) -> Self {
        state.turn()
    }
}

impl From<Option<usize>> for LockState {
    fn from(turn: Option<usize>) -> Self {
        turn.map_or(Self::Unlocked, Self::Locked)
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlocked => f.write_str("none"),
            Self::Locked(t) => write!(f, "{t}"),
        }
    }
}
