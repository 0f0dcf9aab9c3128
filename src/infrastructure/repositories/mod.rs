//! Repository Implementations
//!
//! Loading of model documents and input data from disk.

mod documents;

pub use documents::{parse_document, DocumentFormat, FsDocumentRepository};
