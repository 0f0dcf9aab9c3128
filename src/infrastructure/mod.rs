//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Local file access and atomic writes
//! - `repositories/` - Mapping model, data structure and data tree loading
//! - `pdf/` - Template loading, overlay encoding and document assembly
//! - `events/` - Run event sinks (log records, NDJSON)

pub mod events;
pub mod fs;
pub mod pdf;
pub mod repositories;

// Re-export for convenience
pub use events::{JsonEventSink, LogEventSink};
pub use fs::LocalFs;
pub use pdf::{PdfOverlayEncoder, PdfTemplate};
pub use repositories::{DocumentFormat, FsDocumentRepository};
