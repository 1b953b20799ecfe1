//! Closed-form simple linear regression.
//!
//! We only ever regress one metric on another over a few dozen peers, so the
//! normal equations are solved directly from centered sums:
//!
//! ```text
//! m = Σ(x − x̄)(y − ȳ) / Σ(x − x̄)²
//! b = ȳ − m·x̄
//! ```
//!
//! Centering avoids the cancellation in `n·Σx² − (Σx)²`, which does not come
//! out exactly zero for repeated non-dyadic x values like `14.1`.
//!
//! R² is reported as `None` when the dependent variable has no variance and is
//! otherwise clamped to `[0, 1]` so ill-conditioned fits never display
//! overshoot like `1.0000000002`.

use crate::domain::RegressionCoefficients;
use crate::error::FitError;

#[derive(Debug, Default, Clone, Copy)]
struct RegSums {
    n: usize,
    sum_x: f64,
    sum_y: f64,
}

impl RegSums {
    fn add_obs(&mut self, x: f64, y: f64) {
        self.n += 1;
        self.sum_x += x;
        self.sum_y += y;
    }
}

/// Fit `y = intercept + slope·x` by ordinary least squares.
///
/// Fails with [`FitError::InsufficientSamples`] for fewer than two points and
/// [`FitError::DegenerateInput`] when every `x` is identical.
pub fn fit_ols(points: &[(f64, f64)]) -> Result<RegressionCoefficients, FitError> {
    let Some(&(first_x, first_y)) = points.first() else {
        return Err(FitError::InsufficientSamples { n: 0 });
    };
    if points.len() < 2 {
        return Err(FitError::InsufficientSamples { n: points.len() });
    }
    if points.iter().all(|&(x, _)| x == first_x) {
        return Err(FitError::DegenerateInput);
    }

    let mut sums = RegSums::default();
    for &(x, y) in points {
        sums.add_obs(x, y);
    }

    let n = sums.n as f64;
    let mean_x = sums.sum_x / n;
    let mean_y = sums.sum_y / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for &(x, y) in points {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if !sxx.is_finite() || sxx <= 0.0 {
        return Err(FitError::DegenerateInput);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if !(slope.is_finite() && intercept.is_finite()) {
        return Err(FitError::DegenerateInput);
    }

    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for &(x, y) in points {
        let predicted = intercept + slope * x;
        ss_tot += (y - mean_y).powi(2);
        ss_res += (y - predicted).powi(2);
    }

    let flat_y = points.iter().all(|&(_, y)| y == first_y);
    let r_squared = if flat_y || ss_tot == 0.0 {
        None
    } else {
        Some((1.0 - ss_res / ss_tot).clamp(0.0, 1.0))
    };

    Ok(RegressionCoefficients {
        slope,
        intercept,
        r_squared,
        n: sums.n,
    })
}

/// Sum of squared residuals of `points` under `coeffs`.
pub fn sum_squared_residuals(points: &[(f64, f64)], coeffs: &RegressionCoefficients) -> f64 {
    points
        .iter()
        .map(|&(x, y)| (y - coeffs.predict(x)).powi(2))
        .sum()
}
