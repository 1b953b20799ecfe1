//! Fitted values and residuals under a single coefficient set.

use crate::domain::{Peer, PeerResidual, RegressionCoefficients, ResidualRecord};

/// Evaluate one point against `coeffs`.
pub fn residual(coeffs: &RegressionCoefficients, x: f64, y: f64) -> ResidualRecord {
    let predicted = coeffs.predict(x);
    let residual = y - predicted;
    let residual_pct = if predicted != 0.0 {
        Some(residual / predicted * 100.0)
    } else {
        None
    };
    ResidualRecord {
        predicted,
        residual,
        residual_pct,
    }
}

/// Evaluate every peer against the same coefficients.
///
/// `is_included` decides the `included` flag only; excluded peers are still
/// evaluated so tables can show where they sit relative to the fit.
pub fn peer_residuals(
    peers: &[Peer],
    coeffs: &RegressionCoefficients,
    is_included: impl Fn(&Peer) -> bool,
) -> Vec<PeerResidual> {
    peers
        .iter()
        .map(|p| PeerResidual {
            peer: p.clone(),
            included: is_included(p),
            record: residual(coeffs, p.x, p.y),
        })
        .collect()
}
