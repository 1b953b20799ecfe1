//! JSON ingest and validation.
//!
//! This module is responsible for turning a peer dataset JSON file into a clean
//! set of `(id, x, y)` peers plus a target that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for structure (clear errors + exit code 2)
//! - **Row-level validation** (skip bad peers, but report what happened)
//! - **No fitting logic here**

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{AxisLabels, DatasetStats, Peer, PeerDataset, RegressionCoefficients};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    x_label: Option<String>,
    #[serde(default)]
    y_label: Option<String>,
    #[serde(default)]
    peers: Vec<RawPeer>,
    target: Option<RawPeer>,
    #[serde(default)]
    fixed_coefficients: Option<RawCoefficients>,
}

#[derive(Debug, Deserialize)]
struct RawPeer {
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCoefficients {
    slope: f64,
    intercept: f64,
    #[serde(default)]
    r_squared: Option<f64>,
    #[serde(default)]
    n: Option<usize>,
}

/// A peer entry that was skipped during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    /// Zero-based position in the `peers` array.
    pub index: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: validated dataset + stats + skipped rows.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: PeerDataset,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load and validate a peer dataset file.
pub fn load_peer_dataset(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open dataset '{}': {e}", path.display())))?;
    let data = parse_peer_dataset(BufReader::new(file))?;
    info!(
        path = %path.display(),
        peers = data.stats.n_peers,
        skipped = data.row_errors.len(),
        "loaded peer dataset"
    );
    Ok(data)
}

/// Parse and validate a peer dataset from any reader.
pub fn parse_peer_dataset(reader: impl Read) -> Result<IngestedData, AppError> {
    let raw: RawDataset =
        serde_json::from_reader(reader).map_err(|e| AppError::new(2, format!("Invalid dataset JSON: {e}")))?;

    let target = validate_target(raw.target)?;

    let rows_read = raw.peers.len();
    let mut peers = Vec::with_capacity(rows_read);
    let mut row_errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, row) in raw.peers.into_iter().enumerate() {
        match normalize_peer(row) {
            Ok(peer) => {
                if peer.id == target.id {
                    return Err(AppError::new(
                        2,
                        format!("Target '{}' must not also be listed as a peer.", target.id),
                    ));
                }
                if !seen.insert(peer.id.clone()) {
                    return Err(AppError::new(2, format!("Duplicate peer id '{}'.", peer.id)));
                }
                peers.push(peer);
            }
            Err((id, message)) => {
                warn!(index, id = id.as_deref().unwrap_or(""), %message, "skipping peer row");
                row_errors.push(RowError { index, id, message });
            }
        }
    }

    let stats = compute_stats(&peers).ok_or_else(|| {
        AppError::new(3, "No valid peers remain after validation.")
    })?;

    let fixed = match raw.fixed_coefficients {
        Some(c) => Some(validate_fixed(c, peers.len())?),
        None => None,
    };

    let defaults = AxisLabels::default();
    let labels = AxisLabels {
        x: raw.x_label.unwrap_or(defaults.x),
        y: raw.y_label.unwrap_or(defaults.y),
    };

    Ok(IngestedData {
        dataset: PeerDataset {
            labels,
            peers,
            target,
            fixed,
        },
        stats,
        row_errors,
        rows_read,
    })
}

fn normalize_peer(row: RawPeer) -> Result<Peer, (Option<String>, String)> {
    let id = row.id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let Some(id) = id else {
        return Err((None, "missing `id`".to_string()));
    };
    let x = match row.x {
        Some(v) if v.is_finite() => v,
        _ => return Err((Some(id), "missing or non-finite `x`".to_string())),
    };
    let y = match row.y {
        Some(v) if v.is_finite() => v,
        _ => return Err((Some(id), "missing or non-finite `y`".to_string())),
    };
    Ok(Peer {
        id,
        name: row.name,
        x,
        y,
    })
}

fn validate_target(raw: Option<RawPeer>) -> Result<Peer, AppError> {
    let Some(raw) = raw else {
        return Err(AppError::new(2, "Missing required field: `target`"));
    };
    normalize_peer(raw).map_err(|(id, message)| {
        AppError::new(
            2,
            format!("Invalid target '{}': {message}", id.unwrap_or_default()),
        )
    })
}

fn validate_fixed(raw: RawCoefficients, n_peers: usize) -> Result<RegressionCoefficients, AppError> {
    if !(raw.slope.is_finite() && raw.intercept.is_finite()) {
        return Err(AppError::new(2, "Fixed coefficients must be finite."));
    }
    let r_squared = raw.r_squared.filter(|r| r.is_finite()).map(|r| r.clamp(0.0, 1.0));
    Ok(RegressionCoefficients {
        slope: raw.slope,
        intercept: raw.intercept,
        r_squared,
        n: raw.n.unwrap_or(n_peers),
    })
}

/// Range summary of the peers; `None` for an empty list.
pub fn compute_stats(peers: &[Peer]) -> Option<DatasetStats> {
    let first = peers.first()?;
    let mut stats = DatasetStats {
        n_peers: peers.len(),
        x_min: first.x,
        x_max: first.x,
        y_min: first.y,
        y_max: first.y,
    };
    for p in &peers[1..] {
        stats.x_min = stats.x_min.min(p.x);
        stats.x_max = stats.x_max.max(p.x);
        stats.y_min = stats.y_min.min(p.y);
        stats.y_max = stats.y_max.max(p.y);
    }
    Some(stats)
}
