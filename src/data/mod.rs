//! Dataset sources beyond the JSON ingest path.
//!
//! - seeded synthetic peer sets for the demo (`sample`)

pub mod sample;

pub use sample::*;
