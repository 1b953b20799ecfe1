//! Fit diagnostics computed from a [`FitView`].
//!
//! - residual standard error and a ±1σ band around the fitted line
//! - Cook's distance per included peer
//! - drop-one sensitivity of the target's fitted value (parallel refits)

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::domain::{FitView, PeerResidual, RegressionCoefficients};
use crate::math::{cooks_distance, fit_ols};

/// Number of samples along the confidence band.
pub const BAND_STEPS: usize = 40;

/// One x position on the ±σ band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPoint {
    pub x: f64,
    pub fitted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Influence of one included peer on the fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerInfluence {
    pub id: String,
    pub cooks_distance: Option<f64>,
}

/// Refit outcome with one peer left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropOneSensitivity {
    pub dropped: String,
    pub slope: f64,
    pub intercept: f64,
    /// Target's fitted value under the reduced fit.
    pub target_predicted: f64,
    /// Change against the target's value under the full included-peer fit.
    pub target_delta: f64,
}

/// Residual standard error with `n − 2` degrees of freedom.
///
/// Returns `0.0` for two or fewer residuals, matching the dashboard which
/// then draws no band at all.
pub fn residual_std_error(residuals: &[f64]) -> f64 {
    if residuals.len() <= 2 {
        return 0.0;
    }
    let sum_squares: f64 = residuals.iter().map(|r| r * r).sum();
    let variance = sum_squares / (residuals.len() - 2) as f64;
    variance.max(0.0).sqrt()
}

/// Residual standard error of the included peers in `view`.
pub fn view_std_error(view: &FitView) -> f64 {
    let residuals: Vec<f64> = view.included().map(|p| p.record.residual).collect();
    residual_std_error(&residuals)
}

/// Sample `fitted ± sigma` on `steps + 1` evenly spaced x positions.
///
/// Returns an empty band when `sigma` is not positive or the range is empty.
pub fn confidence_band(view: &FitView, sigma: f64, x_min: f64, x_max: f64, steps: usize) -> Vec<BandPoint> {
    if !(sigma.is_finite() && sigma > 0.0) || !(x_min.is_finite() && x_max.is_finite()) || x_max < x_min {
        return Vec::new();
    }
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let ratio = i as f64 / steps as f64;
            let x = x_min + (x_max - x_min) * ratio;
            let fitted = view.coefficients.predict(x);
            BandPoint {
                x,
                fitted,
                lower: fitted - sigma,
                upper: fitted + sigma,
            }
        })
        .collect()
}

/// x range spanned by the included peers.
pub fn included_x_range(view: &FitView) -> Option<(f64, f64)> {
    view.included().fold(None, |acc, p| {
        let x = p.peer.x;
        Some(match acc {
            None => (x, x),
            Some((lo, hi)) => (f64::min(lo, x), f64::max(hi, x)),
        })
    })
}

/// OLS fit of the included peers, whatever coefficients the view displays.
///
/// Influence measures are only defined against the least squares fit of the
/// sample itself, so fixed-mode and fallback views are refitted here.
fn included_fit(included: &[&PeerResidual]) -> Option<RegressionCoefficients> {
    let points: Vec<(f64, f64)> = included.iter().map(|p| p.peer.point()).collect();
    fit_ols(&points).ok()
}

/// Cook's distance of every included peer under their own OLS fit.
///
/// All entries are `None` when the included peers cannot be fitted.
pub fn peer_influence(view: &FitView) -> Vec<PeerInfluence> {
    let included: Vec<&PeerResidual> = view.included().collect();
    let distances = match included_fit(&included) {
        Some(coeffs) => {
            let points: Vec<(f64, f64)> = included.iter().map(|p| p.peer.point()).collect();
            cooks_distance(&points, &coeffs)
        }
        None => vec![None; included.len()],
    };
    included
        .iter()
        .zip(distances)
        .map(|(p, d)| PeerInfluence {
            id: p.peer.id.clone(),
            cooks_distance: d,
        })
        .collect()
}

/// Refit once per included peer with that peer left out.
///
/// Deltas are measured against the OLS fit of all included peers. Returns
/// nothing when that fit is impossible; reduced samples the estimator rejects
/// are skipped.
pub fn drop_one_sensitivity(view: &FitView) -> Vec<DropOneSensitivity> {
    let included: Vec<&PeerResidual> = view.included().collect();
    let target_x = view.target.x;
    let Some(full) = included_fit(&included) else {
        debug!(candidates = included.len(), "no base fit for drop-one sensitivity");
        return Vec::new();
    };
    let base = full.predict(target_x);

    let out: Vec<DropOneSensitivity> = (0..included.len())
        .into_par_iter()
        .filter_map(|skip| {
            let points: Vec<(f64, f64)> = included
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, p)| p.peer.point())
                .collect();
            let coeffs = fit_ols(&points).ok()?;
            let target_predicted = coeffs.predict(target_x);
            Some(DropOneSensitivity {
                dropped: included[skip].peer.id.clone(),
                slope: coeffs.slope,
                intercept: coeffs.intercept,
                target_predicted,
                target_delta: target_predicted - base,
            })
        })
        .collect();

    debug!(refits = out.len(), candidates = included.len(), "drop-one sensitivity");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AxisLabels, Peer, PeerDataset};
    use crate::fit::controller::{Action, SelectionController};

    fn controller() -> SelectionController {
        SelectionController::new(PeerDataset {
            labels: AxisLabels::default(),
            peers: vec![
                Peer::new("EWBC", 16.38, 1.830),
                Peer::new("HOPE", 8.65, 0.930),
                Peer::new("CVBF", 14.10, 1.730),
                Peer::new("HAFC", 11.20, 1.050),
                Peer::new("BANC", 9.80, 1.150),
            ],
            target: Peer::new("CATY", 11.95, 1.269),
            fixed: None,
        })
        .unwrap()
    }

    #[test]
    fn influence_ignores_displayed_fixed_coefficients() {
        let data = PeerDataset {
            labels: AxisLabels::default(),
            peers: controller().peers().to_vec(),
            target: Peer::new("CATY", 11.95, 1.269),
            fixed: Some(RegressionCoefficients {
                slope: 0.058,
                intercept: 0.82,
                r_squared: None,
                n: 5,
            }),
        };
        let c = SelectionController::new(data).unwrap();
        let view = c.view();
        assert_eq!(view.coefficients.slope, 0.058);

        let points: Vec<(f64, f64)> = view.included().map(|p| p.peer.point()).collect();
        let ols = fit_ols(&points).unwrap();
        let expected = cooks_distance(&points, &ols);
        let influence = peer_influence(view);
        assert_eq!(influence.len(), 5);
        for (i, e) in influence.iter().zip(&expected) {
            let (got, want) = (i.cooks_distance.unwrap(), e.unwrap());
            assert!((got - want).abs() < 1e-12);
        }
        let hope = influence.iter().find(|i| i.id == "HOPE").unwrap();
        assert!(hope.cooks_distance.unwrap() < 1.0);

        let base = ols.predict(11.95);
        let sens = drop_one_sensitivity(view);
        assert_eq!(sens.len(), 5);
        for s in &sens {
            assert!((s.target_delta - (s.target_predicted - base)).abs() < 1e-12);
        }
        let hope = sens.iter().find(|s| s.dropped == "HOPE").unwrap();
        assert!(hope.target_delta.abs() < 0.05, "delta={}", hope.target_delta);
    }

    #[test]
    fn influence_is_undefined_when_included_peers_cannot_be_fitted() {
        let c = SelectionController::new(PeerDataset {
            labels: AxisLabels::default(),
            peers: vec![
                Peer::new("A", 14.1, 1.0),
                Peer::new("B", 14.1, 1.1),
                Peer::new("C", 14.1, 1.2),
            ],
            target: Peer::new("T", 12.0, 1.0),
            fixed: Some(RegressionCoefficients {
                slope: 0.1,
                intercept: 0.0,
                r_squared: None,
                n: 3,
            }),
        })
        .unwrap();
        let influence = peer_influence(c.view());
        assert_eq!(influence.len(), 3);
        assert!(influence.iter().all(|i| i.cooks_distance.is_none()));
        assert!(drop_one_sensitivity(c.view()).is_empty());
    }

    #[test]
    fn std_error_uses_n_minus_two() {
        assert_eq!(residual_std_error(&[0.1, -0.1]), 0.0);
        let se = residual_std_error(&[0.1, -0.2, 0.1]);
        assert!((se - (0.06f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn band_brackets_fitted_line() {
        let c = controller();
        let view = c.view();
        let sigma = view_std_error(view);
        assert!(sigma > 0.0);

        let (lo, hi) = included_x_range(view).unwrap();
        assert_eq!((lo, hi), (8.65, 16.38));

        let band = confidence_band(view, sigma, lo, hi, BAND_STEPS);
        assert_eq!(band.len(), BAND_STEPS + 1);
        assert_eq!(band[0].x, lo);
        assert!((band[BAND_STEPS].x - hi).abs() < 1e-12);
        for b in &band {
            assert!((b.upper - b.fitted - sigma).abs() < 1e-12);
            assert!((b.fitted - b.lower - sigma).abs() < 1e-12);
        }

        assert!(confidence_band(view, 0.0, lo, hi, BAND_STEPS).is_empty());
    }

    #[test]
    fn influence_covers_included_peers_only() {
        let mut c = controller();
        c.apply(Action::EnableRefit);
        let view = c.apply(Action::TogglePeer("BANC".to_string()));
        let influence = peer_influence(view);
        assert_eq!(influence.len(), 4);
        assert!(influence.iter().all(|i| i.id != "BANC"));
        assert!(influence.iter().all(|i| i.cooks_distance.is_some()));
    }

    #[test]
    fn drop_one_reports_each_peer_and_skips_failed_refits() {
        let c = controller();
        let view = c.view();
        let sens = drop_one_sensitivity(view);
        assert_eq!(sens.len(), 5);
        for s in &sens {
            let expected = s.intercept + s.slope * 11.95;
            assert!((s.target_predicted - expected).abs() < 1e-12);
            assert!((s.target_delta - (expected - view.target_record.predicted)).abs() < 1e-12);
        }

        let mut c = controller();
        c.apply(Action::EnableRefit);
        let view = c.apply(Action::SetSelection(vec!["EWBC".to_string(), "HOPE".to_string()]));
        // Each reduced sample has one point.
        assert!(drop_one_sensitivity(view).is_empty());
    }
}
