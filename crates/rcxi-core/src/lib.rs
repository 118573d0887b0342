// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Stabilization Harness Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Metric engine, lock detector and run-type transforms for the RC+ξ
//! stabilization harness.
//!
//! # Invariants
//!
//! 1. **Pure computation**: every entry point is a function of its inputs
//!    (plus the explicit seed for shuffles). No globals, no caches, no
//!    shared random stream, so independent runs can execute in parallel
//!    without synchronisation.
//!
//! 2. **Undefined is not zero**: ξ before turn 1, LVS before turn `k - 1`
//!    and points skipped in best-effort mode are `None`, never `0.0`.
//!
//! 3. **First qualifying turn**: the lock time is the first turn at which
//!    both windows sit below threshold. Forward persistence is only
//!    checked by [`lock::detect_lock_persistent`], on request.

pub mod lock;
pub mod metrics;
pub mod protocol;
pub mod provider;

pub use lock::{detect_lock, detect_lock_persistent, lock_condition_at, LockDetector};
pub use metrics::{
    anchor_projection_series, anchor_vector, compute_metrics, cosine, cosine_distance, ewma,
    lvs_series, sample_variance, tension_series, ANCHOR_TURNS,
};
pub use protocol::{prepare_run, seeded_permutation, shuffle_series, Permutation, PreparedRun};
pub use provider::{EmbeddingProvider, ExternalProvider, HashProvider};
