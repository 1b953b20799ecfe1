//! Mathematical utilities: closed-form OLS and influence measures.

pub mod influence;
pub mod ols;

pub use influence::*;
pub use ols::*;
