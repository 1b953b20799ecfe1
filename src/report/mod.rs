//! Reporting utilities: residual leaders and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{FitView, PeerResidual};

/// Residual leaders among the included peers (top-N each side).
///
/// `rich` trades above the fit (positive residual), `cheap` below it.
#[derive(Debug, Clone)]
pub struct Rankings {
    pub rich: Vec<PeerResidual>,
    pub cheap: Vec<PeerResidual>,
}

/// Rank included peers by residual.
pub fn rank_rich_cheap(view: &FitView, top_n: usize) -> Rankings {
    let mut sorted: Vec<PeerResidual> = view.included().cloned().collect();
    sorted.sort_by(|a, b| {
        b.record
            .residual
            .partial_cmp(&a.record.residual)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let rich = sorted
        .iter()
        .filter(|p| p.record.residual > 0.0)
        .take(top_n)
        .cloned()
        .collect();
    let cheap = sorted
        .iter()
        .rev()
        .filter(|p| p.record.residual < 0.0)
        .take(top_n)
        .cloned()
        .collect();

    Rankings { rich, cheap }
}
