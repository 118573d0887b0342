// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Stabilization Harness Endpoints
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Endpoint aggregation (E1–E4), rank statistics, and the
//! identity-vs-null evaluation.

pub mod endpoints;
pub mod evaluate;
pub mod stats;

pub use endpoints::{
    agreement_by_run_type, classify_trend, cross_provider_agreement, e1_median_tail,
    endpoint_result, pt_trend, Agreement, EndpointResult, TailMedian, Trend,
};
pub use evaluate::{evaluate_identity_vs_null, evaluate_runs, IdentityNullEvaluation};
pub use stats::{cliffs_delta, mann_whitney_u, median, MannWhitney};
