// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Stabilization Harness Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! RC+ξ stabilization harness.

pub mod config;
pub mod error;
pub mod series;

pub use config::{EndpointConfig, MetricMode, RunConfig, RunType};
pub use error::{HarnessError, HarnessResult};
pub use series::{EmbeddingSeries, LockState, MetricSeries};
