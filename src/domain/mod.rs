//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`Peer`, `Target`, `PeerDataset`)
//! - regression outputs (`RegressionCoefficients`, `ResidualRecord`)
//! - controller state and views (`FitMode`, `CoefficientSource`, `FitView`)

pub mod types;

pub use types::*;
