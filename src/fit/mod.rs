//! Regression fitting orchestration.
//!
//! Responsibilities:
//!
//! - evaluate points against a coefficient set (`residual`)
//! - own the fixed/refit state and selection (`controller`)
//! - compute diagnostics over a fitted view (`diagnostics`)

pub mod controller;
pub mod diagnostics;
pub mod residual;

pub use controller::*;
pub use diagnostics::*;
pub use residual::*;
