//! Shared "fit pipeline" logic used by the `fit`, `rank` and `demo` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> controller -> view -> diagnostics -> rankings
//!
//! The command handlers can then focus on presentation.

use tracing::{debug, info};

use crate::domain::{FitView, PeerDataset, RunConfig};
use crate::error::AppError;
use crate::fit::controller::{Action, SelectionController};
use crate::fit::diagnostics::{
    BAND_STEPS, BandPoint, DropOneSensitivity, PeerInfluence, confidence_band, drop_one_sensitivity,
    included_x_range, peer_influence, view_std_error,
};
use crate::io::ingest::{IngestedData, load_peer_dataset};
use crate::report::{Rankings, rank_rich_cheap};

/// Options that shape a run once the dataset is in hand.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub refit: bool,
    pub peers: Option<Vec<String>>,
    pub top_n: usize,
    pub sensitivity: bool,
}

impl From<&RunConfig> for ViewOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            refit: config.refit,
            peers: config.peers.clone(),
            top_n: config.top_n,
            sensitivity: config.sensitivity,
        }
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub controller: SelectionController,
    pub residual_std_error: f64,
    pub band: Vec<BandPoint>,
    pub influence: Vec<PeerInfluence>,
    /// Empty unless sensitivity was requested.
    pub sensitivity: Vec<DropOneSensitivity>,
    pub rankings: Rankings,
}

impl RunOutput {
    pub fn view(&self) -> &FitView {
        self.controller.view()
    }
}

/// Load the configured dataset and run the pipeline over it.
pub fn run_fit(config: &RunConfig) -> Result<(IngestedData, RunOutput), AppError> {
    let ingest = load_peer_dataset(&config.data_path)?;
    let run = run_with_dataset(ingest.dataset.clone(), &ViewOptions::from(config))?;
    Ok((ingest, run))
}

/// Run the pipeline over an in-memory dataset.
pub fn run_with_dataset(dataset: PeerDataset, options: &ViewOptions) -> Result<RunOutput, AppError> {
    let mut controller = SelectionController::new(dataset)?;

    if options.refit || options.peers.is_some() {
        controller.apply(Action::EnableRefit);
    }
    if let Some(ids) = &options.peers {
        controller.apply(Action::SetSelection(ids.clone()));
    }

    let view = controller.view();
    let residual_std_error = view_std_error(view);
    let band = match included_x_range(view) {
        Some((lo, hi)) => confidence_band(view, residual_std_error, lo, hi, BAND_STEPS),
        None => Vec::new(),
    };
    let influence = peer_influence(view);
    let sensitivity = if options.sensitivity {
        drop_one_sensitivity(view)
    } else {
        Vec::new()
    };
    let rankings = rank_rich_cheap(view, options.top_n);

    debug!(band_points = band.len(), drops = sensitivity.len(), "diagnostics computed");
    info!(
        source = view.source.label(),
        selected = view.selected.len(),
        slope = view.coefficients.slope,
        intercept = view.coefficients.intercept,
        "fit complete"
    );

    Ok(RunOutput {
        controller,
        residual_std_error,
        band,
        influence,
        sensitivity,
        rankings,
    })
}
