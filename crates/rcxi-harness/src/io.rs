// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Serialization Boundary
// ─────────────────────────────────────────────────────────────────────
//! Per-turn CSV rows, per-run summary JSON, and embedding loaders.
//!
//! Per-turn CSV columns: `t,xi,lvs,Pt,ewma_xi,run_type,provider`, one row
//! per turn from turn 1, empty cells for undefined values. Floats use the
//! shortest round-trip form so reruns are byte-identical.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use rcxi_endpoints::Trend;
use rcxi_types::{
    EmbeddingSeries, HarnessError, HarnessResult, LockState, MetricMode, MetricSeries, RunType,
};

pub const CSV_COLUMNS: [&str; 7] = ["t", "xi", "lvs", "Pt", "ewma_xi", "run_type", "provider"];

/// One per-turn output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub t: usize,
    pub xi: Option<f64>,
    pub lvs: Option<f64>,
    #[serde(rename = "Pt")]
    pub pt: Option<f64>,
    pub ewma_xi: Option<f64>,
    pub run_type: RunType,
    pub provider: String,
}

/// Rows for turns `1..T` in turn order.
pub fn turn_records(metrics: &MetricSeries, run_type: RunType, provider: &str) -> Vec<TurnRecord> {
    (1..metrics.len())
        .map(|t| TurnRecord {
            t,
            xi: metrics.xi[t],
            lvs: metrics.lvs[t],
            pt: metrics.pt[t],
            ewma_xi: metrics.ewma[t],
            run_type,
            provider: provider.to_string(),
        })
        .collect()
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_number(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Render rows as CSV text, header first.
pub fn records_to_csv(records: &[TurnRecord]) -> String {
    let mut csv = CSV_COLUMNS.join(",");
    csv.push('\n');
    for r in records {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.t,
            csv_number(r.xi),
            csv_number(r.lvs),
            csv_number(r.pt),
            csv_number(r.ewma_xi),
            r.run_type,
            csv_field(&r.provider),
        ));
    }
    csv
}

pub fn write_turn_csv(path: &Path, records: &[TurnRecord]) -> HarnessResult<()> {
    fs::write(path, records_to_csv(records))?;
    log::info!("wrote {} per-turn rows to {}", records.len(), path.display());
    Ok(())
}

/// Split one CSV line, honouring double-quoted fields.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                cur.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => fields.push(std::mem::take(&mut cur)),
            _ => cur.push(c),
        }
    }
    fields.push(cur);
    fields
}

/// ξ and P_t recovered from a per-turn CSV, blank cells dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnColumns {
    pub xi: Vec<f64>,
    pub pt: Vec<f64>,
}

pub fn parse_turn_csv(text: &str) -> HarnessResult<TurnColumns> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| HarnessError::Parse("per-turn CSV is empty".to_string()))?;
    let header = split_csv_line(header);
    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| HarnessError::Parse(format!("per-turn CSV has no {name:?} column")))
    };
    let xi_col = column("xi")?;
    let pt_col = column("Pt")?;

    let mut out = TurnColumns::default();
    for (row, line) in lines.enumerate() {
        let fields = split_csv_line(line);
        for (col, dest) in [(xi_col, &mut out.xi), (pt_col, &mut out.pt)] {
            let cell = fields.get(col).map(|s| s.trim()).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            let v = cell.parse::<f64>().map_err(|e| {
                HarnessError::Parse(format!("row {}: bad number {cell:?}: {e}", row + 1))
            })?;
            dest.push(v);
        }
    }
    Ok(out)
}

pub fn read_turn_csv(path: &Path) -> HarnessResult<TurnColumns> {
    parse_turn_csv(&fs::read_to_string(path)?)
}

/// Per-run summary record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(rename = "E1_median_xi_last10")]
    pub e1_median_xi: f64,
    /// Number of ξ values E1 was taken over.
    #[serde(rename = "E1_window")]
    pub e1_window: usize,
    /// `null` when no lock was found.
    #[serde(rename = "Tlock")]
    pub tlock: LockState,
    pub k: usize,
    pub m: usize,
    pub eps_xi: f64,
    pub eps_lvs: f64,
    pub alpha: f64,
    pub seed: u64,
    pub provider: String,
    pub run_type: RunType,
    pub mode: MetricMode,
    pub skipped_points: usize,
    #[serde(rename = "E3_trend")]
    pub e3_trend: Option<Trend>,
    #[serde(rename = "Pt_trend")]
    pub pt_trend: Option<f64>,
}

pub fn summary_to_json(summary: &RunSummary) -> HarnessResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

pub fn write_summary_json(path: &Path, summary: &RunSummary) -> HarnessResult<()> {
    fs::write(path, summary_to_json(summary)?)?;
    log::info!("wrote run summary to {}", path.display());
    Ok(())
}

pub fn read_summary_json(path: &Path) -> HarnessResult<RunSummary> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Parse a `[[f64, ...], ...]` JSON array of turn vectors.
pub fn parse_embeddings_json(text: &str) -> HarnessResult<EmbeddingSeries> {
    let rows: Vec<Vec<f64>> = serde_json::from_str(text)?;
    EmbeddingSeries::new(rows)
}

/// Parse a rectangular numeric CSV, one turn per row. A first line that
/// does not parse as numbers is treated as a header.
pub fn parse_embeddings_csv(text: &str) -> HarnessResult<EmbeddingSeries> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: Result<Vec<f64>, _> =
            line.split(',').map(|c| c.trim().parse::<f64>()).collect();
        match parsed {
            Ok(row) => rows.push(row),
            Err(_) if i == 0 => continue,
            Err(e) => {
                return Err(HarnessError::Parse(format!(
                    "embedding CSV line {}: {e}",
                    i + 1
                )))
            }
        }
    }
    EmbeddingSeries::new(rows)
}

/// Load an embedding array; format chosen by extension (`.json` or `.csv`).
pub fn load_embeddings(path: &Path) -> HarnessResult<EmbeddingSeries> {
    let text = fs::read_to_string(path)?;
    let series = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_embeddings_json(&text)?,
        Some("csv") => parse_embeddings_csv(&text)?,
        other => {
            return Err(HarnessError::Parse(format!(
                "unsupported embedding file extension {other:?} (use .json or .csv)"
            )))
        }
    };
    log::info!(
        "loaded {} turns x {} dims from {}",
        series.len(),
        series.dim(),
        path.display()
    );
    Ok(series)
}
