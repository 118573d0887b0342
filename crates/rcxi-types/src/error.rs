// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Stabilization Harness Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all stabilization harness failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HarnessError {
    /// Zero-norm vector where a cosine is required.
    #[error("degenerate vector at turn {turn}: zero norm, cosine undefined")]
    DegenerateVector { turn: usize },

    /// Anchor mean over turns `0..turns` has zero norm. Attributed to turn 0.
    #[error("degenerate anchor: mean of turns 0..{turns} has zero norm")]
    DegenerateAnchor { turns: usize },

    /// Embedding dimensionality differs between turns.
    #[error("shape mismatch at turn {turn}: expected dimension {expected}, found {found}")]
    ShapeMismatch {
        turn: usize,
        expected: usize,
        found: usize,
    },

    /// Fewer than two turns supplied; tension needs a predecessor.
    #[error("shape mismatch: at least 2 turns required, found {found}")]
    TooFewTurns { found: usize },

    /// NaN or Inf in an input vector.
    #[error("non-finite value at turn {turn}, dimension {dim}")]
    NonFinite { turn: usize, dim: usize },

    /// A windowed metric or lock state was requested before its window filled.
    #[error("insufficient history at turn {turn}: {needed} turns required")]
    InsufficientHistory { turn: usize, needed: usize },

    /// Invalid configuration.
    #[error("config error: {0}")]
    Configuration(String),

    /// Cross-run aggregation received inconsistent inputs.
    #[error("aggregation error: {0}")]
    Aggregation(String),

    /// Filesystem failure at the serialization boundary.
    #[error("io error: {0}")]
    Io(String),

    /// Malformed input or output artifact.
    #[error("parse error: {0}")]
    Parse(String),
}

impl HarnessError {
    /// Stable error-kind name reported with failed runs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DegenerateVector { .. } | Self::DegenerateAnchor { .. } => {
                "DegenerateVectorError"
            }
            Self::ShapeMismatch { .. } | Self::TooFewTurns { .. } | Self::NonFinite { .. } => {
                "ShapeMismatchError"
            }
            Self::InsufficientHistory { .. } => "InsufficientHistoryError",
            Self::Configuration(_) => "ConfigurationError",
            Self::Aggregation(_) => "AggregationError",
            Self::Io(_) => "IoError",
            Self::Parse(_) => "ParseError",
        }
    }

    /// Turn index the failure is attributed to, when there is one.
    pub fn turn(&self) -> Option<usize> {
        match self {
            Self::DegenerateVector { turn }
            | Self::ShapeMismatch { turn, .. }
            | Self::NonFinite { turn, .. }
            | Self::InsufficientHistory { turn, .. } => Some(*turn),
            Self::DegenerateAnchor { .. } => Some(0),
            _ => None,
        }
    }

    /// Fatal errors abort a run before any output is written.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InsufficientHistory { .. })
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(format!("JSON: {e}"))
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
