// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Stabilization Harness Configuration
// ─────────────────────────────────────────────────────────────────────

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

/// Experimental condition applied to a base embedding sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    /// Unmodified conversation.
    #[default]
    Identity,
    /// Caller-supplied sequence with periodic topic drift.
    Null,
    /// Seeded permutation of the identity sequence.
    Shuffled,
}

impl RunType {
    pub const ALL: [RunType; 3] = [RunType::Identity, RunType::Null, RunType::Shuffled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Null => "null",
            Self::Shuffled => "shuffled",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunType {
    type Err = HarnessError;

    fn from_str(s: &str) -> HarnessResult<Self> {
        match s.trim() {
            "identity" => Ok(Self::Identity),
            "null" => Ok(Self::Null),
            "shuffled" => Ok(Self::Shuffled),
            other => Err(HarnessError::Configuration(format!(
                "unrecognized run_type {other:?} (expected identity|null|shuffled)"
            ))),
        }
    }
}

/// How the metric engine treats zero-norm vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricMode {
    /// Fail on the first degenerate vector.
    #[default]
    Strict,
    /// Record a missing point and keep going.
    BestEffort,
}

/// Per-run configuration. Immutable for the lifetime of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// LVS window size (turns).
    /// Default: 5.
    pub k: usize,

    /// Lock window size: number of trailing tension values that must
    /// all sit below `eps_xi`.
    /// Default: 5.
    pub m: usize,

    /// Tension lock threshold (strict `<`).
    /// Default: 0.02.
    pub eps_xi: f64,

    /// LVS lock threshold (strict `<`).
    /// Default: 0.015.
    pub eps_lvs: f64,

    /// EWMA smoothing factor in (0, 1].
    /// Default: 0.5.
    pub alpha: f64,

    /// Seed for the shuffled-run permutation.
    /// Default: 42.
    pub seed: u64,

    pub run_type: RunType,

    /// Identifier of the embedding source.
    pub provider: String,

    pub mode: MetricMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            k: 5,
            m: 5,
            eps_xi: 0.02,
            eps_lvs: 0.015,
            alpha: 0.5,
            seed: 42,
            run_type: RunType::Identity,
            provider: "unknown".to_string(),
            mode: MetricMode::Strict,
        }
    }
}

impl RunConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> HarnessResult<()> {
        if self.k < 2 {
            return Err(HarnessError::Configuration(format!(
                "k must be >= 2 (an LVS window needs at least one pair), got {}",
                self.k
            )));
        }
        if self.m < 1 {
            return Err(HarnessError::Configuration(format!(
                "m must be >= 1, got {}",
                self.m
            )));
        }
        if !(self.eps_xi.is_finite() && self.eps_xi > 0.0) {
            return Err(HarnessError::Configuration(format!(
                "eps_xi must be a positive finite number, got {}",
                self.eps_xi
            )));
        }
        if !(self.eps_lvs.is_finite() && self.eps_lvs > 0.0) {
            return Err(HarnessError::Configuration(format!(
                "eps_lvs must be a positive finite number, got {}",
                self.eps_lvs
            )));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(HarnessError::Configuration(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if self.provider.trim().is_empty() {
            return Err(HarnessError::Configuration(
                "provider must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string and validate.
    pub fn from_json(json: &str) -> HarnessResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| HarnessError::Configuration(format!("JSON parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Copy of this config tagged with another run type.
    pub fn with_run_type(&self, run_type: RunType) -> Self {
        Self {
            run_type,
            ..self.clone()
        }
    }

    /// First turn at which both the LVS window and the tension window are full.
    pub fn first_lock_turn(&self) -> usize {
        self.m.max(self.k.saturating_sub(1))
    }
}

/// Knobs for the endpoint aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointConfig {
    /// Trailing window for E1 and the numeric P_t trend.
    /// Default: 10.
    pub tail_window: usize,

    /// Early/late segment length for the E3 classification.
    /// Default: 3.
    pub segment_len: usize,

    /// Late-minus-early margin separating `increasing` from `flat`.
    /// Default: 0.01.
    pub trend_margin: f64,

    /// Relative tolerance on E1 for cross-provider agreement.
    /// Default: 0.10.
    pub e1_rel_tol: f64,

    /// Allowed difference (turns) between lock times for agreement.
    /// Default: 1.
    pub tlock_turn_tol: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            tail_window: 10,
            segment_len: 3,
            trend_margin: 0.01,
            e1_rel_tol: 0.10,
            tlock_turn_tol: 1,
        }
    }
}

impl EndpointConfig {
    pub fn validate(&self) -> HarnessResult<()> {
        if self.tail_window < 1 {
            return Err(HarnessError::Configuration(format!(
                "tail_window must be >= 1, got {}",
                self.tail_window
            )));
        }
        if self.segment_len < 1 {
            return Err(HarnessError::Configuration(format!(
                "segment_len must be >= 1, got {}",
                self.segment_len
            )));
        }
        if !(self.trend_margin.is_finite() && self.trend_margin >= 0.0) {
            return Err(HarnessError::Configuration(format!(
                "trend_margin must be finite and >= 0, got {}",
                self.trend_margin
            )));
        }
        if !(self.e1_rel_tol.is_finite() && self.e1_rel_tol >= 0.0) {
            return Err(HarnessError::Configuration(format!(
                "e1_rel_tol must be finite and >= 0, got {}",
                self.e1_rel_tol
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> HarnessResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| HarnessError::Configuration(format!("JSON parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
