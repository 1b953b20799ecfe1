//! Synthetic peer universe generation.
//!
//! Peers are drawn around a known line `y = intercept + slope·x` with Gaussian
//! noise, so the demo run (and tests) can check the fit recovers it.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{AxisLabels, Peer, PeerDataset};
use crate::error::AppError;

/// Parameters of a synthetic peer set.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    pub slope: f64,
    pub intercept: f64,
    /// Standard deviation of the y noise.
    pub noise: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 12,
            seed: 42,
            slope: 0.058,
            intercept: 0.82,
            noise: 0.12,
            x_min: 6.0,
            x_max: 18.0,
        }
    }
}

/// Generate a seeded peer dataset plus a target in the middle of the range.
///
/// No fixed coefficients are attached; the controller derives them from the
/// full sample.
pub fn generate_peers(config: &SampleConfig) -> Result<PeerDataset, AppError> {
    if config.count < 2 {
        return Err(AppError::new(2, "Synthetic sample needs at least 2 peers."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::new(2, "Invalid x range for synthetic sample."));
    }
    if !(config.slope.is_finite() && config.intercept.is_finite()) {
        return Err(AppError::new(2, "Synthetic line parameters must be finite."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise must be finite and non-negative."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let width = (config.count.to_string()).len().max(2);
    let peers = (0..config.count)
        .map(|i| {
            let x = rng.gen_range(config.x_min..=config.x_max);
            let y = config.intercept + config.slope * x + normal.sample(&mut rng);
            Peer::new(format!("P{:0width$}", i + 1), x, y)
        })
        .collect();

    let target_x = 0.5 * (config.x_min + config.x_max);
    let target_y = config.intercept + config.slope * target_x + normal.sample(&mut rng);

    Ok(PeerDataset {
        labels: AxisLabels::default(),
        peers,
        target: Peer::new("TARGET", target_x, target_y),
        fixed: None,
    })
}
