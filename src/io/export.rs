//! Export per-peer results to CSV and a full snapshot to JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets; the JSON snapshot
//! carries everything needed to reproduce the view later.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::{AxisLabels, CoefficientSource, FitMode, FitView, PeerResidual, RegressionCoefficients};
use crate::error::AppError;
use crate::fit::diagnostics::{BandPoint, PeerInfluence};

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    x: f64,
    y: f64,
    predicted: f64,
    residual: f64,
    residual_pct: Option<f64>,
    included: &'a str,
    cooks_d: Option<f64>,
}

/// Write one row per peer plus the target overlay row.
pub fn write_results_csv(path: &Path, view: &FitView, influence: &[PeerInfluence]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for p in &view.peers {
        let cooks_d = influence
            .iter()
            .find(|i| i.id == p.peer.id)
            .and_then(|i| i.cooks_distance);
        let included = if p.included { "Yes" } else { "No" };
        writer
            .serialize(csv_row(p, included, cooks_d))
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    let overlay = PeerResidual {
        peer: view.target.clone(),
        included: false,
        record: view.target_record,
    };
    writer
        .serialize(csv_row(&overlay, "Overlay", None))
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    info!(path = %path.display(), rows = view.peers.len() + 1, "wrote results CSV");
    Ok(())
}

fn csv_row<'a>(p: &'a PeerResidual, included: &'a str, cooks_d: Option<f64>) -> CsvRow<'a> {
    CsvRow {
        id: &p.peer.id,
        x: p.peer.x,
        y: p.peer.y,
        predicted: p.record.predicted,
        residual: p.record.residual,
        residual_pct: p.record.residual_pct,
        included,
        cooks_d,
    }
}

/// Portable JSON representation of one analysis state.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    pub labels: &'a AxisLabels,
    pub mode: FitMode,
    pub source: CoefficientSource,
    pub using_fallback: bool,
    pub coefficients: &'a RegressionCoefficients,
    pub fixed_coefficients: &'a RegressionCoefficients,
    pub residual_std_error: f64,
    /// `fitted ± residual_std_error` across the included x range.
    pub band: &'a [BandPoint],
    pub selected: &'a [String],
    pub peers: &'a [PeerResidual],
    pub target: &'a PeerResidual,
    pub influence: &'a [PeerInfluence],
}

/// Write the snapshot as pretty JSON.
pub fn write_snapshot_json(
    path: &Path,
    view: &FitView,
    fixed: &RegressionCoefficients,
    labels: &AxisLabels,
    residual_std_error: f64,
    band: &[BandPoint],
    influence: &[PeerInfluence],
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create snapshot JSON '{}': {e}", path.display())))?;

    let target = PeerResidual {
        peer: view.target.clone(),
        included: false,
        record: view.target_record,
    };
    let snapshot = Snapshot {
        tool: "peerfit",
        generated_at: Utc::now(),
        labels,
        mode: view.mode,
        source: view.source,
        using_fallback: view.using_fallback,
        coefficients: &view.coefficients,
        fixed_coefficients: fixed,
        residual_std_error,
        band,
        selected: &view.selected,
        peers: &view.peers,
        target: &target,
        influence,
    };

    serde_json::to_writer_pretty(file, &snapshot)
        .map_err(|e| AppError::new(2, format!("Failed to write snapshot JSON: {e}")))?;

    info!(path = %path.display(), "wrote snapshot JSON");
    Ok(())
}
