//! Application Layer
//!
//! Use cases that orchestrate the engine.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `FillUseCase` - One run: validate, normalize, recalculate, resolve, render
//! - `BatchRunner` - Independent runs in parallel

pub mod batch;
pub mod fill;

pub use batch::{BatchJob, BatchManifest, BatchReport, BatchRunner};
pub use fill::{FillJob, FillOptions, FillReport, FillUseCase, PreparedRun, RunError, RunStatus};
