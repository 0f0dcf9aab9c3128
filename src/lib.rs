//! Casilla - fills official tax-form PDFs from structured data
//!
//! Casilla resolves a declarative mapping model against a data tree,
//! normalizes and recalculates reductions, and paints the resulting
//! values as overlays onto a template PDF.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{BatchManifest, BatchReport, BatchRunner, FillJob, FillOptions, FillReport, FillUseCase};
pub use config::Config;
pub use domain::entities::{DataStructure, FieldTable, FieldValue, MappingModel};
pub use error::{CasillaError, CasillaResult};
