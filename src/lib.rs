//! `peer-regression` library crate.
//!
//! The binary (`peerfit`) is a thin wrapper around this library so that:
//!
//! - the estimator and controller are testable without spawning processes
//! - a dashboard or service front-end can drive the same controller

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
