// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Stabilization Harness Pipeline
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Serialization boundary and run pipeline for the RC+ξ stabilization
//! harness: load embeddings, run identity / null / shuffled conditions,
//! write per-turn CSV and summary JSON, and evaluate identity vs null.

pub mod io;
pub mod pipeline;

pub use io::{
    load_embeddings, parse_embeddings_csv, parse_embeddings_json, parse_turn_csv, read_summary_json,
    read_turn_csv, records_to_csv, turn_records, write_summary_json, write_turn_csv, RunSummary,
    TurnColumns, TurnRecord, CSV_COLUMNS,
};
pub use pipeline::{
    compare_providers, run_all, run_condition, run_one, run_pair, run_shuffled,
    run_with_endpoints, write_run, CombinedResults, PairOutput, RunFailure, RunOutput, WrittenRun,
};
