// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Identity vs Null Evaluation
// ─────────────────────────────────────────────────────────────────────
//! Compares an identity run against its topic-drift null run.
//!
//! E1 passes when the identity tail median of ξ is lower than the null
//! one. E3 passes when the identity P_t trend rises and beats the null
//! trend. Rank statistics are computed on the two ξ tails, ordered null
//! first so a positive effect means the identity run is lower.

use serde::{Deserialize, Serialize};

use rcxi_types::{EndpointConfig, HarnessResult, MetricSeries};

use crate::endpoints::{e1_median_tail, pt_trend};
use crate::stats::{cliffs_delta, mann_whitney_u};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityNullEvaluation {
    #[serde(rename = "E1_identity_median_xi_last10")]
    pub e1_identity: f64,
    #[serde(rename = "E1_null_median_xi_last10")]
    pub e1_null: f64,
    #[serde(rename = "mann_whitney_U")]
    pub mann_whitney_u: f64,
    pub mann_whitney_p: f64,
    /// > 0 means the identity tail sits lower than the null tail.
    #[serde(rename = "cliffs_delta_null_vs_identity")]
    pub cliffs_delta: f64,
    #[serde(rename = "Pt_trend_identity")]
    pub pt_trend_identity: Option<f64>,
    #[serde(rename = "Pt_trend_null")]
    pub pt_trend_null: Option<f64>,
    #[serde(rename = "E1_pass")]
    pub e1_pass: bool,
    #[serde(rename = "E3_pass")]
    pub e3_pass: bool,
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

/// Evaluate raw ξ and P_t value sequences (missing points already removed).
pub fn evaluate_identity_vs_null(
    xi_identity: &[f64],
    xi_null: &[f64],
    pt_identity: &[f64],
    pt_null: &[f64],
    endpoints: &EndpointConfig,
) -> HarnessResult<IdentityNullEvaluation> {
    endpoints.validate()?;
    let window = endpoints.tail_window;

    let e1_id = e1_median_tail(xi_identity, window)?.median;
    let e1_nu = e1_median_tail(xi_null, window)?.median;

    let id_tail = tail(xi_identity, window);
    let nu_tail = tail(xi_null, window);
    let mw = mann_whitney_u(nu_tail, id_tail)?;
    let delta = cliffs_delta(nu_tail, id_tail)?;

    let pt_id = pt_trend(pt_identity, window);
    let pt_nu = pt_trend(pt_null, window);
    let e3_pass = match (pt_id, pt_nu) {
        (Some(id), Some(nu)) => id > nu.max(0.0),
        _ => false,
    };

    let evaluation = IdentityNullEvaluation {
        e1_identity: e1_id,
        e1_null: e1_nu,
        mann_whitney_u: mw.u,
        mann_whitney_p: mw.p,
        cliffs_delta: delta,
        pt_trend_identity: pt_id,
        pt_trend_null: pt_nu,
        e1_pass: e1_id < e1_nu,
        e3_pass,
    };
    log::info!(
        "identity vs null: E1 {e1_id:.4} vs {e1_nu:.4} (pass={}), E3 pass={}, p={:.4}",
        evaluation.e1_pass,
        evaluation.e3_pass,
        evaluation.mann_whitney_p
    );
    Ok(evaluation)
}

/// Evaluate two computed metric series.
pub fn evaluate_runs(
    identity: &MetricSeries,
    null: &MetricSeries,
    endpoints: &EndpointConfig,
) -> HarnessResult<IdentityNullEvaluation> {
    evaluate_identity_vs_null(
        &identity.xi_values(),
        &null.xi_values(),
        &identity.pt_values(),
        &null.pt_values(),
        endpoints,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| a + (b - a) * i as f64 / (n - 1) as f64)
            .collect()
    }

    #[test]
    fn test_identity_beats_null() {
        let t = 40;
        let mut xi_id = vec![0.12; 20];
        xi_id.extend(vec![0.02; t - 1 - 20]);
        let xi_nu = vec![0.10; t - 1];
        let pt_id = linspace(0.2, 0.8, t);
        let pt_nu = linspace(0.6, 0.55, t);

        let out =
            evaluate_identity_vs_null(&xi_id, &xi_nu, &pt_id, &pt_nu, &EndpointConfig::default())
                .unwrap();
        assert!(out.e1_pass);
        assert!(out.e3_pass);
        assert!((0.0..=1.0).contains(&out.mann_whitney_p));
        assert!(out.mann_whitney_p < 0.01);
        assert_eq!(out.cliffs_delta, 1.0);
    }

    #[test]
    fn test_null_like_identity_fails() {
        let xi = vec![0.1; 30];
        let pt = vec![0.5; 30];
        let out =
            evaluate_identity_vs_null(&xi, &xi, &pt, &pt, &EndpointConfig::default()).unwrap();
        assert!(!out.e1_pass);
        assert!(!out.e3_pass);
        assert_eq!(out.mann_whitney_p, 1.0);
        assert_eq!(out.cliffs_delta, 0.0);
    }

    #[test]
    fn test_missing_pt_fails_e3() {
        let xi = vec![0.1, 0.2, 0.3];
        let out =
            evaluate_identity_vs_null(&xi, &xi, &[], &[0.5], &EndpointConfig::default()).unwrap();
        assert!(out.pt_trend_identity.is_none());
        assert!(!out.e3_pass);
    }

    #[test]
    fn test_serialized_field_names() {
        let xi = vec![0.1, 0.2, 0.3];
        let pt = vec![0.5, 0.6, 0.7];
        let out =
            evaluate_identity_vs_null(&xi, &xi, &pt, &pt, &EndpointConfig::default()).unwrap();
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"E1_identity_median_xi_last10\""));
        assert!(json.contains("\"mann_whitney_U\""));
        assert!(json.contains("\"E3_pass\""));
    }
}
