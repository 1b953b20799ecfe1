//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the controller and diagnostics
//! - exported to JSON/CSV
//! - compared across runs (fixed vs refit)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One comparable entity used as a regression sample point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    pub id: String,
    /// Optional display name (e.g. the bank's full name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Independent variable (e.g. ROTE in percent).
    pub x: f64,
    /// Dependent variable (e.g. P/TBV multiple).
    pub y: f64,
}

impl Peer {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            x,
            y,
        }
    }

    pub fn point(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// The entity evaluated against the fit but never part of it.
///
/// Same shape as a peer.
pub type Target = Peer;

/// Simple linear regression output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionCoefficients {
    pub slope: f64,
    pub intercept: f64,
    /// `None` when the dependent variable has zero variance.
    pub r_squared: Option<f64>,
    pub n: usize,
}

impl RegressionCoefficients {
    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fitted value and residual for one point under one coefficient set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualRecord {
    pub predicted: f64,
    pub residual: f64,
    /// `None` when `predicted` is exactly zero.
    pub residual_pct: Option<f64>,
}

/// Which regime the controller is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// All peers, fixed reference coefficients.
    Fixed,
    /// User-selected subset, coefficients refit on every change.
    Refit,
}

/// Where the active coefficients came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoefficientSource {
    Fixed,
    Refit,
    /// Refit was requested but could not be computed; fixed values shown.
    RefitFallback,
}

impl CoefficientSource {
    pub fn label(self) -> &'static str {
        match self {
            CoefficientSource::Fixed => "Fixed",
            CoefficientSource::Refit => "Refit",
            CoefficientSource::RefitFallback => "Fixed fallback (<2 peers)",
        }
    }
}

/// A peer's position relative to the active fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerResidual {
    pub peer: Peer,
    pub included: bool,
    pub record: ResidualRecord,
}

/// Everything a consumer needs to render one state of the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitView {
    pub mode: FitMode,
    pub source: CoefficientSource,
    pub using_fallback: bool,
    pub coefficients: RegressionCoefficients,
    /// Included peer ids in dataset order.
    pub selected: Vec<String>,
    /// One entry per known peer, included or not.
    pub peers: Vec<PeerResidual>,
    pub target: Target,
    pub target_record: ResidualRecord,
}

impl FitView {
    /// Peers that took part in the active selection.
    pub fn included(&self) -> impl Iterator<Item = &PeerResidual> {
        self.peers.iter().filter(|p| p.included)
    }
}

/// Axis labels used in reports and exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            x: "ROTE (%)".to_string(),
            y: "P/TBV (x)".to_string(),
        }
    }
}

/// Validated peer dataset, ready for the controller.
#[derive(Debug, Clone)]
pub struct PeerDataset {
    pub labels: AxisLabels,
    pub peers: Vec<Peer>,
    pub target: Target,
    /// Reference coefficients shipped with the data, if any.
    pub fixed: Option<RegressionCoefficients>,
}

/// Summary stats about the peers actually loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_peers: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, the environment and defaults.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    pub refit: bool,
    /// Explicit refit selection; `None` keeps every peer.
    pub peers: Option<Vec<String>>,
    pub top_n: usize,
    pub sensitivity: bool,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_is_affine() {
        let c = RegressionCoefficients {
            slope: 0.5,
            intercept: 1.0,
            r_squared: Some(0.9),
            n: 3,
        };
        assert_eq!(c.predict(0.0), 1.0);
        assert_eq!(c.predict(4.0), 3.0);
    }

    #[test]
    fn source_serializes_kebab_case() {
        let s = serde_json::to_string(&CoefficientSource::RefitFallback).unwrap();
        assert_eq!(s, "\"refit-fallback\"");
    }
}
