// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Endpoint Aggregator (E1–E4)
// ─────────────────────────────────────────────────────────────────────
//! Summary endpoints for one run and cross-provider agreement.
//!
//! - E1: median ξ over the trailing window (shorter series use all values)
//! - E2: lock turn or none
//! - E3: anchor-projection trend, early vs late segment means
//! - E4: agreement of E1/E2 across providers for one run type
//!
//! The aggregator only reports. Pass/fail judgement against the expected
//! contract (identity rising, null flat) belongs to the caller.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use rcxi_types::{
    EndpointConfig, HarnessError, HarnessResult, LockState, MetricSeries, RunConfig, RunType,
};

use crate::stats::{mean, median};

/// E3 trend class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Flat,
    Decreasing,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increasing => "increasing",
            Self::Flat => "flat",
            Self::Decreasing => "decreasing",
        })
    }
}

/// E1 value together with the window it was taken over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailMedian {
    pub median: f64,
    /// Number of ξ values actually used (< `tail_window` for short series).
    pub window: usize,
}

/// Endpoints of one (run_type, provider) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointResult {
    pub run_type: RunType,
    pub provider: String,
    pub e1: TailMedian,
    pub e2: LockState,
    pub e3: Option<Trend>,
    /// Late-segment mean minus early-segment mean of P_t.
    pub e3_delta: Option<f64>,
}

/// E1: median of the last `tail` tension values.
pub fn e1_median_tail(xi_values: &[f64], tail: usize) -> HarnessResult<TailMedian> {
    let start = xi_values.len().saturating_sub(tail);
    let window = &xi_values[start..];
    let median = median(window).ok_or_else(|| {
        HarnessError::Aggregation("E1 needs at least one tension value".to_string())
    })?;
    if window.len() < tail {
        log::debug!("E1: only {} of {tail} tension values available", window.len());
    }
    Ok(TailMedian {
        median,
        window: window.len(),
    })
}

/// E3: compare the mean of the first and last `segment_len` projections.
///
/// Returns the class and the late-minus-early delta, or `None` with no data.
pub fn classify_trend(pt_values: &[f64], segment_len: usize, margin: f64) -> Option<(Trend, f64)> {
    let seg = segment_len.min(pt_values.len());
    let early = mean(&pt_values[..seg])?;
    let late = mean(&pt_values[pt_values.len() - seg..])?;
    let delta = late - early;
    let trend = if delta > margin {
        Trend::Increasing
    } else if delta >= -margin {
        Trend::Flat
    } else {
        Trend::Decreasing
    };
    Some((trend, delta))
}

/// Numeric P_t trend: median of the last `tail` minus median of the first
/// `tail` values (whole series when shorter). Positive means rising.
pub fn pt_trend(pt_values: &[f64], tail: usize) -> Option<f64> {
    let n = pt_values.len();
    let first = median(&pt_values[..tail.min(n)])?;
    let last = median(&pt_values[n.saturating_sub(tail)..])?;
    Some(last - first)
}

/// Compute E1–E3 for one run.
pub fn endpoint_result(
    metrics: &MetricSeries,
    lock: LockState,
    run: &RunConfig,
    endpoints: &EndpointConfig,
) -> HarnessResult<EndpointResult> {
    endpoints.validate()?;
    let e1 = e1_median_tail(&metrics.xi_values(), endpoints.tail_window)?;
    let trend = classify_trend(&metrics.pt_values(), endpoints.segment_len, endpoints.trend_margin);
    Ok(EndpointResult {
        run_type: run.run_type,
        provider: run.provider.clone(),
        e1,
        e2: lock,
        e3: trend.map(|(t, _)| t),
        e3_delta: trend.map(|(_, d)| d),
    })
}

/// E4 outcome for one run type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub run_type: RunType,
    pub providers: Vec<String>,
    pub e1_agree: bool,
    pub e2_agree: bool,
    /// E4: both endpoints agree for every provider pair.
    pub agree: bool,
}

fn e1_within(a: f64, b: f64, rel_tol: f64) -> bool {
    let scale = a.abs().max(b.abs());
    scale == 0.0 || (a - b).abs() <= rel_tol * scale
}

fn e2_within(a: LockState, b: LockState, turn_tol: usize) -> bool {
    match (a.turn(), b.turn()) {
        (None, None) => true,
        (Some(x), Some(y)) => x.abs_diff(y) <= turn_tol,
        _ => false,
    }
}

/// E4: cross-provider agreement for results sharing one run type.
pub fn cross_provider_agreement(
    results: &[EndpointResult],
    endpoints: &EndpointConfig,
) -> HarnessResult<Agreement> {
    if results.len() < 2 {
        return Err(HarnessError::Aggregation(format!(
            "agreement needs at least 2 providers, got {}",
            results.len()
        )));
    }
    let run_type = results[0].run_type;
    if let Some(other) = results.iter().find(|r| r.run_type != run_type) {
        return Err(HarnessError::Aggregation(format!(
            "mixed run types: {run_type} and {}",
            other.run_type
        )));
    }
    let mut providers: Vec<String> = Vec::with_capacity(results.len());
    for r in results {
        if providers.contains(&r.provider) {
            return Err(HarnessError::Aggregation(format!(
                "provider {:?} appears twice for run type {run_type}",
                r.provider
            )));
        }
        providers.push(r.provider.clone());
    }

    let mut e1_agree = true;
    let mut e2_agree = true;
    for (i, a) in results.iter().enumerate() {
        for b in &results[i + 1..] {
            e1_agree &= e1_within(a.e1.median, b.e1.median, endpoints.e1_rel_tol);
            e2_agree &= e2_within(a.e2, b.e2, endpoints.tlock_turn_tol);
        }
    }
    Ok(Agreement {
        run_type,
        providers,
        e1_agree,
        e2_agree,
        agree: e1_agree && e2_agree,
    })
}

/// Group results by run type and compute E4 for every type with at least
/// two providers.
pub fn agreement_by_run_type(
    results: &[EndpointResult],
    endpoints: &EndpointConfig,
) -> HarnessResult<Vec<Agreement>> {
    let mut groups: BTreeMap<&'static str, (RunType, Vec<EndpointResult>)> = BTreeMap::new();
    for r in results {
        groups
            .entry(r.run_type.as_str())
            .or_insert_with(|| (r.run_type, Vec::new()))
            .1
            .push(r.clone());
    }
    groups
        .into_values()
        .filter(|(_, group)| group.len() >= 2)
        .map(|(_, group)| cross_provider_agreement(&group, endpoints))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(run_type: RunType, provider: &str, e1: f64, lock: Option<usize>) -> EndpointResult {
        EndpointResult {
            run_type,
            provider: provider.to_string(),
            e1: TailMedian {
                median: e1,
                window: 10,
            },
            e2: LockState::from(lock),
            e3: Some(Trend::Flat),
            e3_delta: Some(0.0),
        }
    }

    #[test]
    fn test_endpoint_result_from_metrics() {
        use rcxi_core::{compute_metrics, detect_lock};
        use rcxi_types::EmbeddingSeries;

        // Drifts away from the anchor direction, then settles on [1, 1].
        let mut turns: Vec<Vec<f64>> = vec![vec![1.0, 0.0]; 3];
        turns.extend((1..=4).map(|i| vec![1.0, i as f64 * 0.25]));
        turns.extend(vec![vec![1.0, 1.0]; 8]);
        let series = EmbeddingSeries::new(turns).unwrap();
        let run = RunConfig {
            provider: "unit".to_string(),
            ..Default::default()
        };
        let metrics = compute_metrics(&series, &run).unwrap();
        let lock = detect_lock(&metrics, &run);
        let result = endpoint_result(&metrics, lock, &run, &EndpointConfig::default()).unwrap();

        assert_eq!(result.provider, "unit");
        assert_eq!(result.e1.window, 10);
        assert!(result.e1.median.abs() < 1e-12);
        assert!(result.e2.is_locked());
        assert_eq!(result.e3, Some(Trend::Decreasing));
    }

    #[test]
    fn test_e1_last_ten() {
        let xi: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let e1 = e1_median_tail(&xi, 10).unwrap();
        assert_eq!(e1.window, 10);
        assert!((e1.median - 14.5).abs() < 1e-12);
    }

    #[test]
    fn test_e1_short_series_fallback() {
        let xi = [0.5, 0.1, 0.3, 0.9, 0.2];
        let e1 = e1_median_tail(&xi, 10).unwrap();
        assert_eq!(e1.window, 5);
        assert!((e1.median - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_e1_empty() {
        assert_eq!(e1_median_tail(&[], 10).unwrap_err().kind(), "AggregationError");
    }

    #[test]
    fn test_trend_classes() {
        let rising = [0.2, 0.25, 0.3, 0.5, 0.7, 0.8, 0.9];
        assert_eq!(classify_trend(&rising, 3, 0.01).unwrap().0, Trend::Increasing);
        let flat = [0.5, 0.5, 0.5, 0.1, 0.5, 0.5, 0.505];
        assert_eq!(classify_trend(&flat, 3, 0.01).unwrap().0, Trend::Flat);
        let falling = [0.9, 0.8, 0.7, 0.4, 0.3, 0.2];
        let (trend, delta) = classify_trend(&falling, 3, 0.01).unwrap();
        assert_eq!(trend, Trend::Decreasing);
        assert!((delta + 0.5).abs() < 1e-12);
        assert!(classify_trend(&[], 3, 0.01).is_none());
    }

    #[test]
    fn test_pt_trend() {
        let pt: Vec<f64> = (0..30).map(|i| i as f64 / 30.0).collect();
        let d = pt_trend(&pt, 10).unwrap();
        assert!((d - 20.0 / 30.0).abs() < 1e-12);
        assert_eq!(pt_trend(&[0.4, 0.6], 10), Some(0.0));
    }

    #[test]
    fn test_agreement_within_tolerance() {
        let results = [
            result(RunType::Identity, "a", 0.010, Some(12)),
            result(RunType::Identity, "b", 0.0105, Some(13)),
        ];
        let agreement = cross_provider_agreement(&results, &EndpointConfig::default()).unwrap();
        assert!(agreement.agree);
        assert_eq!(agreement.providers, vec!["a", "b"]);
    }

    #[test]
    fn test_agreement_e1_outside_tolerance() {
        let results = [
            result(RunType::Identity, "a", 0.010, Some(12)),
            result(RunType::Identity, "b", 0.020, Some(12)),
        ];
        let agreement = cross_provider_agreement(&results, &EndpointConfig::default()).unwrap();
        assert!(!agreement.e1_agree);
        assert!(agreement.e2_agree);
        assert!(!agreement.agree);
    }

    #[test]
    fn test_agreement_lock_mismatch() {
        let results = [
            result(RunType::Null, "a", 0.3, None),
            result(RunType::Null, "b", 0.3, Some(9)),
        ];
        assert!(!cross_provider_agreement(&results, &EndpointConfig::default()).unwrap().agree);
        let results = [
            result(RunType::Null, "a", 0.3, Some(7)),
            result(RunType::Null, "b", 0.3, Some(9)),
        ];
        assert!(!cross_provider_agreement(&results, &EndpointConfig::default()).unwrap().e2_agree);
        let results = [
            result(RunType::Null, "a", 0.0, None),
            result(RunType::Null, "b", 0.0, None),
        ];
        assert!(cross_provider_agreement(&results, &EndpointConfig::default()).unwrap().agree);
    }

    #[test]
    fn test_agreement_input_checks() {
        let cfg = EndpointConfig::default();
        let single = [result(RunType::Identity, "a", 0.1, None)];
        assert!(cross_provider_agreement(&single, &cfg).is_err());
        let mixed = [
            result(RunType::Identity, "a", 0.1, None),
            result(RunType::Null, "b", 0.1, None),
        ];
        assert!(cross_provider_agreement(&mixed, &cfg).is_err());
        let dup = [
            result(RunType::Identity, "a", 0.1, None),
            result(RunType::Identity, "a", 0.1, None),
        ];
        assert!(cross_provider_agreement(&dup, &cfg).is_err());
    }

    #[test]
    fn test_agreement_grouped() {
        let results = [
            result(RunType::Identity, "a", 0.01, Some(10)),
            result(RunType::Null, "a", 0.4, None),
            result(RunType::Identity, "b", 0.01, Some(10)),
            result(RunType::Null, "b", 0.2, None),
            result(RunType::Shuffled, "a", 0.5, None),
        ];
        let groups = agreement_by_run_type(&results, &EndpointConfig::default()).unwrap();
        assert_eq!(groups.len(), 2);
        let identity = groups.iter().find(|g| g.run_type == RunType::Identity).unwrap();
        let null = groups.iter().find(|g| g.run_type == RunType::Null).unwrap();
        assert!(identity.agree);
        assert!(!null.agree);
    }
}
