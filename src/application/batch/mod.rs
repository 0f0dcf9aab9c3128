//! Batch fill runs
//!
//! - `manifest` - the JSON job list
//! - `runner` - parallel execution on a rayon pool

mod manifest;
mod runner;

pub use manifest::{BatchManifest, ManifestJob};
pub use runner::{BatchJob, BatchReport, BatchRunner};
