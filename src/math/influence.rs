//! Leverage and Cook's distance for the simple regression.
//!
//! Leverage is the diagonal of the hat matrix `H = X (XᵀX)⁻¹ Xᵀ` with design
//! rows `[1, x_i]`. With only two columns `XᵀX` is a 2×2 matrix, so we invert
//! it directly and only form the diagonal of `H`.

use nalgebra::{DMatrix, Matrix2, RowVector2};

use crate::domain::RegressionCoefficients;

/// Number of fitted parameters (intercept and slope).
const PARAMS: usize = 2;

/// Build the `n × 2` design matrix for `y = b + m·x`.
fn design_matrix(xs: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(xs.len(), PARAMS, |r, c| if c == 0 { 1.0 } else { xs[r] })
}

/// Hat-matrix diagonal for the given regressor values.
///
/// Returns `None` when `XᵀX` is singular (fewer than two distinct x values).
pub fn leverage(xs: &[f64]) -> Option<Vec<f64>> {
    let x = design_matrix(xs);
    let xtx = x.transpose() * &x;
    let xtx = Matrix2::new(xtx[(0, 0)], xtx[(0, 1)], xtx[(1, 0)], xtx[(1, 1)]);
    let inv = xtx.try_inverse()?;

    let h = xs
        .iter()
        .map(|&xi| {
            let row = RowVector2::new(1.0, xi);
            (row * inv * row.transpose())[(0, 0)]
        })
        .collect();
    Some(h)
}

/// Cook's distance for every point under `coeffs`.
///
/// `D_i = e_i² / (p·s²) · h_ii / (1 − h_ii)²` with `s² = SSE / (n − p)`.
/// An entry is `None` when it is undefined: `n ≤ p`, a perfect fit (`s² = 0`)
/// or a point with full leverage.
pub fn cooks_distance(points: &[(f64, f64)], coeffs: &RegressionCoefficients) -> Vec<Option<f64>> {
    let n = points.len();
    if n <= PARAMS {
        return vec![None; n];
    }

    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let Some(h) = leverage(&xs) else {
        return vec![None; n];
    };

    let residuals: Vec<f64> = points.iter().map(|&(x, y)| y - coeffs.predict(x)).collect();
    let sse: f64 = residuals.iter().map(|e| e * e).sum();
    let s2 = sse / (n - PARAMS) as f64;
    if !(s2.is_finite() && s2 > 0.0) {
        return vec![None; n];
    }

    residuals
        .iter()
        .zip(&h)
        .map(|(&e, &hii)| {
            let one_minus = 1.0 - hii;
            if one_minus <= f64::EPSILON {
                return None;
            }
            Some(e * e / (PARAMS as f64 * s2) * hii / (one_minus * one_minus))
        })
        .collect()
}
