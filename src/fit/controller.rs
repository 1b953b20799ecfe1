//! Selection/refit controller.
//!
//! One controller owns the state of one analysis: the peer universe, the
//! target, the fixed reference coefficients, the current mode and the refit
//! selection. All changes go through [`SelectionController::apply`], which
//! recomputes the [`FitView`] before returning it.
//!
//! State machine:
//!
//! ```text
//!            EnableRefit (selection := all)
//!   Fixed ─────────────────────────────────▶ Refit ─┐ TogglePeer / SetSelection
//!     ▲                                        │    │ (recompute)
//!     └────────────────────────────────────────┘ ◀──┘
//!        DisableRefit / Reset (selection := all)
//! ```
//!
//! In `Refit` with fewer than two selected peers the estimator is not called
//! and the fixed coefficients are reported with `using_fallback = true`.
//! Estimator failures on larger selections take the same path.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::{
    CoefficientSource, FitMode, FitView, Peer, PeerDataset, RegressionCoefficients, Target,
};
use crate::error::{AppError, FitError};
use crate::fit::residual::{peer_residuals, residual};
use crate::math::fit_ols;

/// Smallest selection the estimator is asked to fit.
pub const MIN_REFIT_PEERS: usize = 2;

/// Signature of a regression estimator over `(x, y)` points.
pub type EstimatorFn = fn(&[(f64, f64)]) -> Result<RegressionCoefficients, FitError>;

/// User-level state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    EnableRefit,
    DisableRefit,
    SetRefit(bool),
    /// Flip inclusion of one peer (refit mode only).
    TogglePeer(String),
    /// Replace the refit selection (refit mode only).
    SetSelection(Vec<String>),
    /// Back to fixed mode with every peer selected.
    Reset,
}

/// Owns the peer universe and produces a [`FitView`] for every state.
#[derive(Debug, Clone)]
pub struct SelectionController<E = EstimatorFn> {
    peers: Vec<Peer>,
    target: Target,
    fixed: RegressionCoefficients,
    mode: FitMode,
    selected: HashSet<String>,
    estimator: E,
    view: FitView,
}

impl SelectionController {
    /// Build a controller using closed-form OLS.
    pub fn new(dataset: PeerDataset) -> Result<Self, AppError> {
        Self::with_estimator(dataset, fit_ols as EstimatorFn)
    }
}

impl<E> SelectionController<E>
where
    E: Fn(&[(f64, f64)]) -> Result<RegressionCoefficients, FitError>,
{
    /// Build a controller with a custom estimator.
    ///
    /// Fixed coefficients come from the dataset when supplied, otherwise from
    /// one fit over every peer. The controller starts in fixed mode.
    pub fn with_estimator(dataset: PeerDataset, estimator: E) -> Result<Self, AppError> {
        let PeerDataset {
            peers,
            target,
            fixed,
            ..
        } = dataset;

        let fixed = match fixed {
            Some(c) => c,
            None => {
                let points: Vec<(f64, f64)> = peers.iter().map(Peer::point).collect();
                let c = estimator(&points).map_err(|e| {
                    AppError::new(
                        3,
                        format!("No fixed coefficients supplied and the full-sample fit failed: {e}"),
                    )
                })?;
                debug!(slope = c.slope, intercept = c.intercept, n = c.n, "derived fixed coefficients");
                c
            }
        };

        let selected = peers.iter().map(|p| p.id.clone()).collect();
        let view = build_view(&peers, &target, fixed, FitMode::Fixed, &selected, &estimator);

        Ok(Self {
            peers,
            target,
            fixed,
            mode: FitMode::Fixed,
            selected,
            estimator,
            view,
        })
    }

    /// Apply a state change and return the recomputed view.
    pub fn apply(&mut self, action: Action) -> &FitView {
        match action {
            Action::EnableRefit => self.set_refit(true),
            Action::DisableRefit => self.set_refit(false),
            Action::SetRefit(on) => self.set_refit(on),
            Action::TogglePeer(id) => self.toggle_peer(&id),
            Action::SetSelection(ids) => self.set_selection(ids),
            Action::Reset => {
                self.mode = FitMode::Fixed;
                self.select_all();
            }
        }
        self.recompute();
        &self.view
    }

    pub fn view(&self) -> &FitView {
        &self.view
    }

    pub fn mode(&self) -> FitMode {
        self.mode
    }

    pub fn fixed(&self) -> &RegressionCoefficients {
        &self.fixed
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    fn set_refit(&mut self, on: bool) {
        let next = if on { FitMode::Refit } else { FitMode::Fixed };
        if next == self.mode {
            return;
        }
        self.mode = next;
        // Entering refit starts from the full universe; leaving it discards
        // any customisation.
        self.select_all();
    }

    fn toggle_peer(&mut self, id: &str) {
        if self.mode == FitMode::Fixed {
            debug!(peer = id, "peer toggle ignored outside refit mode");
            return;
        }
        if !self.knows(id) {
            warn!(peer = id, "unknown peer id; toggle ignored");
            return;
        }
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    fn set_selection(&mut self, ids: Vec<String>) {
        if self.mode == FitMode::Fixed {
            debug!("selection ignored outside refit mode");
            return;
        }
        let mut next = HashSet::with_capacity(ids.len());
        for id in ids {
            if self.knows(&id) {
                next.insert(id);
            } else {
                warn!(peer = %id, "unknown peer id dropped from selection");
            }
        }
        self.selected = next;
    }

    fn select_all(&mut self) {
        self.selected = self.peers.iter().map(|p| p.id.clone()).collect();
    }

    fn knows(&self, id: &str) -> bool {
        self.peers.iter().any(|p| p.id == id)
    }

    fn recompute(&mut self) {
        self.view = build_view(
            &self.peers,
            &self.target,
            self.fixed,
            self.mode,
            &self.selected,
            &self.estimator,
        );
    }
}

fn build_view<E>(
    peers: &[Peer],
    target: &Target,
    fixed: RegressionCoefficients,
    mode: FitMode,
    selected: &HashSet<String>,
    estimator: &E,
) -> FitView
where
    E: Fn(&[(f64, f64)]) -> Result<RegressionCoefficients, FitError>,
{
    let chosen: Vec<&Peer> = peers.iter().filter(|p| selected.contains(&p.id)).collect();

    let (coefficients, source) = match mode {
        FitMode::Fixed => (fixed, CoefficientSource::Fixed),
        FitMode::Refit if chosen.len() < MIN_REFIT_PEERS => {
            warn!(selected = chosen.len(), "refit needs at least {MIN_REFIT_PEERS} peers; using fixed coefficients");
            (fixed, CoefficientSource::RefitFallback)
        }
        FitMode::Refit => {
            let points: Vec<(f64, f64)> = chosen.iter().map(|p| p.point()).collect();
            match estimator(&points) {
                Ok(c) => (c, CoefficientSource::Refit),
                Err(e) => {
                    warn!(error = %e, "refit failed; using fixed coefficients");
                    (fixed, CoefficientSource::RefitFallback)
                }
            }
        }
    };

    debug!(
        ?mode,
        ?source,
        slope = coefficients.slope,
        intercept = coefficients.intercept,
        n = chosen.len(),
        "recomputed fit view"
    );

    FitView {
        mode,
        source,
        using_fallback: source == CoefficientSource::RefitFallback,
        coefficients,
        selected: chosen.iter().map(|p| p.id.clone()).collect(),
        peers: peer_residuals(peers, &coefficients, |p| selected.contains(&p.id)),
        target: target.clone(),
        target_record: residual(&coefficients, target.x, target.y),
    }
}
