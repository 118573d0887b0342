// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rank Statistics
// ─────────────────────────────────────────────────────────────────────
//! Order statistics used by the endpoint evaluation: median,
//! Mann–Whitney U (normal approximation with tie correction) and
//! Cliff's delta.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use rcxi_types::{HarnessError, HarnessResult};

/// Median; `None` for an empty slice. Even lengths average the middle pair.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    let n = v.len();
    Some(if n % 2 == 1 {
        v[n / 2]
    } else {
        0.5 * (v[n / 2 - 1] + v[n / 2])
    })
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mann–Whitney U test outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MannWhitney {
    /// U statistic of the first sample.
    pub u: f64,
    /// Two-sided p-value.
    pub p: f64,
}

/// Two-sided Mann–Whitney U test of `x` against `y`.
///
/// Ties receive average ranks; the p-value uses the normal approximation
/// with tie-corrected variance and a 0.5 continuity correction.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> HarnessResult<MannWhitney> {
    if x.is_empty() || y.is_empty() {
        return Err(HarnessError::Aggregation(format!(
            "Mann-Whitney U needs two non-empty samples, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    let n = n1 + n2;

    let mut pooled: Vec<(f64, bool)> = x
        .iter()
        .map(|&v| (v, true))
        .chain(y.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut rank_sum_x = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < pooled.len() {
        let mut j = i + 1;
        while j < pooled.len() && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        // Ranks are 1-based; tied block i..j shares the mean rank.
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let ties = (j - i) as f64;
        tie_term += ties.powi(3) - ties;
        rank_sum_x += pooled[i..j].iter().filter(|(_, from_x)| *from_x).count() as f64 * avg_rank;
        i = j;
    }

    let u = rank_sum_x - n1 * (n1 + 1.0) / 2.0;
    let mu = n1 * n2 / 2.0;
    let var = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    let p = if var <= 0.0 {
        1.0
    } else {
        let z = ((u - mu).abs() - 0.5).max(0.0) / var.sqrt();
        (2.0 * normal_sf(z)?).clamp(0.0, 1.0)
    };
    Ok(MannWhitney { u, p })
}

/// Cliff's delta: P(x > y) - P(x < y), in [-1, 1].
pub fn cliffs_delta(x: &[f64], y: &[f64]) -> HarnessResult<f64> {
    if x.is_empty() || y.is_empty() {
        return Err(HarnessError::Aggregation(
            "Cliff's delta needs two non-empty samples".to_string(),
        ));
    }
    let mut balance: i64 = 0;
    for &a in x {
        for &b in y {
            if a > b {
                balance += 1;
            } else if a < b {
                balance -= 1;
            }
        }
    }
    Ok(balance as f64 / (x.len() * y.len()) as f64)
}

/// Upper-tail probability of the standard normal, 1 - Φ(z).
pub fn normal_sf(z: f64) -> HarnessResult<f64> {
    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| HarnessError::Aggregation(format!("standard normal: {e}")))?;
    Ok(standard.sf(z))
}
