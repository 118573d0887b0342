// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Run Pipeline
// ─────────────────────────────────────────────────────────────────────
//! embeddings → metrics → {lock, endpoints} → rows + summary.
//!
//! All computation for a run finishes before anything is written, so a
//! configuration or shape failure never leaves partial output on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rcxi_core::{compute_metrics, detect_lock, prepare_run, Permutation};
use rcxi_endpoints::{
    agreement_by_run_type, endpoint_result, evaluate_runs, pt_trend, Agreement, EndpointResult,
    IdentityNullEvaluation,
};
use rcxi_types::{
    EmbeddingSeries, EndpointConfig, HarnessError, HarnessResult, LockState, MetricSeries,
    RunConfig, RunType,
};

use crate::io::{records_to_csv, summary_to_json, turn_records, RunSummary, TurnRecord};

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub config: RunConfig,
    pub metrics: MetricSeries,
    pub lock: LockState,
    pub endpoints: EndpointResult,
    pub rows: Vec<TurnRecord>,
    pub summary: RunSummary,
    /// Source turn of each shuffled turn (shuffled runs only).
    pub permutation: Option<Permutation>,
}

/// Run the metric pipeline on an already prepared sequence.
pub fn run_one(series: &EmbeddingSeries, config: &RunConfig) -> HarnessResult<RunOutput> {
    run_with_endpoints(series, config, &EndpointConfig::default())
}

pub fn run_with_endpoints(
    series: &EmbeddingSeries,
    config: &RunConfig,
    endpoints: &EndpointConfig,
) -> HarnessResult<RunOutput> {
    config.validate()?;
    endpoints.validate()?;

    let metrics = compute_metrics(series, config)?;
    let lock = detect_lock(&metrics, config);
    let result = endpoint_result(&metrics, lock, config, endpoints)?;
    let rows = turn_records(&metrics, config.run_type, &config.provider);

    let summary = RunSummary {
        e1_median_xi: result.e1.median,
        e1_window: result.e1.window,
        tlock: lock,
        k: config.k,
        m: config.m,
        eps_xi: config.eps_xi,
        eps_lvs: config.eps_lvs,
        alpha: config.alpha,
        seed: config.seed,
        provider: config.provider.clone(),
        run_type: config.run_type,
        mode: config.mode,
        skipped_points: metrics.skipped_points,
        e3_trend: result.e3,
        pt_trend: pt_trend(&metrics.pt_values(), endpoints.tail_window),
    };
    log::info!(
        "run {}/{}: T={} E1={:.4} Tlock={}",
        config.run_type,
        config.provider,
        series.len(),
        summary.e1_median_xi,
        lock
    );

    Ok(RunOutput {
        config: config.clone(),
        metrics,
        lock,
        endpoints: result,
        rows,
        summary,
        permutation: None,
    })
}

/// Build the condition named by `config.run_type`, then run it.
pub fn run_condition(
    base: &EmbeddingSeries,
    drifted: Option<&EmbeddingSeries>,
    config: &RunConfig,
    endpoints: &EndpointConfig,
) -> HarnessResult<RunOutput> {
    let prepared = prepare_run(config, base, drifted)?;
    let mut output = run_with_endpoints(&prepared.series, config, endpoints)?;
    output.permutation = prepared.permutation;
    Ok(output)
}

/// Shuffled condition of `base` with `config.seed`.
pub fn run_shuffled(base: &EmbeddingSeries, config: &RunConfig) -> HarnessResult<RunOutput> {
    run_condition(
        base,
        None,
        &config.with_run_type(RunType::Shuffled),
        &EndpointConfig::default(),
    )
}

/// Identity and null runs sharing one configuration.
#[derive(Debug, Clone)]
pub struct PairOutput {
    pub identity: RunOutput,
    pub null: RunOutput,
}

pub fn run_pair(
    base: &EmbeddingSeries,
    drifted: &EmbeddingSeries,
    config: &RunConfig,
    endpoints: &EndpointConfig,
) -> HarnessResult<PairOutput> {
    let identity = run_condition(base, None, &config.with_run_type(RunType::Identity), endpoints)?;
    let null = run_condition(base, Some(drifted), &config.with_run_type(RunType::Null), endpoints)?;
    Ok(PairOutput { identity, null })
}

/// E4 for runs of one or more run types over several providers.
pub fn compare_providers(
    runs: &[RunOutput],
    endpoints: &EndpointConfig,
) -> HarnessResult<Vec<Agreement>> {
    let results: Vec<EndpointResult> = runs.iter().map(|r| r.endpoints.clone()).collect();
    agreement_by_run_type(&results, endpoints)
}

/// Paths of a persisted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenRun {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Persist `<stem>.<run_type>.csv` and `<stem>.<run_type>.json` into `dir`.
pub fn write_run(dir: &Path, stem: &str, output: &RunOutput) -> HarnessResult<WrittenRun> {
    // Render first; only touch the filesystem once both artifacts exist.
    let csv = records_to_csv(&output.rows);
    let json = summary_to_json(&output.summary)?;

    fs::create_dir_all(dir)?;
    let run_type = output.config.run_type;
    let written = WrittenRun {
        csv: dir.join(format!("{stem}.{run_type}.csv")),
        json: dir.join(format!("{stem}.{run_type}.json")),
    };
    fs::write(&written.csv, csv)?;
    fs::write(&written.json, json)?;
    log::info!(
        "wrote {} and {}",
        written.csv.display(),
        written.json.display()
    );
    Ok(written)
}

/// Combined identity-vs-null record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResults {
    #[serde(flatten)]
    pub evaluation: IdentityNullEvaluation,
    #[serde(rename = "Tlock_identity")]
    pub tlock_identity: LockState,
    #[serde(rename = "Tlock_null")]
    pub tlock_null: LockState,
    pub k: usize,
    pub m: usize,
    pub eps_xi: f64,
    pub eps_lvs: f64,
    pub identity_csv: PathBuf,
    pub null_csv: PathBuf,
    pub identity_json: PathBuf,
    pub null_json: PathBuf,
}

/// Identity + null runs, evaluation, and all artifacts written to `out_dir`
/// (`<stem>.identity.*`, `<stem>.null.*`, `<stem>.results.json`).
pub fn run_all(
    base: &EmbeddingSeries,
    drifted: &EmbeddingSeries,
    config: &RunConfig,
    endpoints: &EndpointConfig,
    out_dir: &Path,
    stem: &str,
) -> HarnessResult<CombinedResults> {
    let pair = run_pair(base, drifted, config, endpoints)?;
    let evaluation = evaluate_runs(&pair.identity.metrics, &pair.null.metrics, endpoints)?;

    let id_paths = write_run(out_dir, stem, &pair.identity)?;
    let nu_paths = write_run(out_dir, stem, &pair.null)?;

    let combined = CombinedResults {
        evaluation,
        tlock_identity: pair.identity.lock,
        tlock_null: pair.null.lock,
        k: config.k,
        m: config.m,
        eps_xi: config.eps_xi,
        eps_lvs: config.eps_lvs,
        identity_csv: id_paths.csv,
        null_csv: nu_paths.csv,
        identity_json: id_paths.json,
        null_json: nu_paths.json,
    };
    let results_path = out_dir.join(format!("{stem}.results.json"));
    fs::write(&results_path, serde_json::to_string_pretty(&combined)?)?;
    log::info!("wrote combined results to {}", results_path.display());
    Ok(combined)
}

/// Reportable description of a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    pub kind: String,
    pub turn: Option<usize>,
    pub message: String,
}

impl From<&HarnessError> for RunFailure {
    fn from(err: &HarnessError) -> Self {
        Self {
            kind: err.kind().to_string(),
            turn: err.turn(),
            message: err.to_string(),
        }
    }
}
