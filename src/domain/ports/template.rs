//! Template Document Port
//!
//! The engine never parses PDF itself. A template adapter exposes the page
//! geometry, accepts one encoded overlay per page and finally assembles the
//! output document.

use chrono::{DateTime, Local};

use crate::domain::services::PagePlan;
use crate::error::CasillaResult;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Information dictionary of the produced document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMetadata {
    pub title: String,
    pub subject: String,
    pub keywords: String,
    pub author: String,
    pub producer: String,
    pub created: DateTime<Local>,
    /// Compress content streams on save
    pub compress: bool,
}

impl DocumentMetadata {
    /// Metadata for one filled form of `model`
    pub fn for_model(model: &str, document_id: &str, author: &str) -> Self {
        Self {
            title: format!("Modelo {model} - {document_id}"),
            subject: format!("Autoliquidación modelo {model}"),
            keywords: format!("modelo {model}, autoliquidación, impuesto sobre sucesiones y donaciones"),
            author: author.to_string(),
            producer: format!("casilla {}", env!("CARGO_PKG_VERSION")),
            created: Local::now(),
            compress: true,
        }
    }
}

/// A loaded template, mutated by one run
pub trait TemplateDocument: Send {
    /// Number of pages in the template
    fn page_count(&self) -> usize;

    /// Size of `page`, if it exists
    fn page_size(&self, page: usize) -> Option<PageSize>;

    /// Composite an encoded overlay content stream on top of `page`.
    ///
    /// The page's existing content must be preserved untouched.
    fn merge_overlay(&mut self, page: usize, overlay: Vec<u8>) -> CasillaResult<()>;

    /// Emit the final document bytes, pages in template order.
    fn assemble(&mut self, metadata: &DocumentMetadata) -> CasillaResult<Vec<u8>>;
}

/// Turns a page plan into an overlay content stream
pub trait OverlayEncoder: Send + Sync {
    fn encode(&self, plan: &PagePlan) -> CasillaResult<Vec<u8>>;
}
