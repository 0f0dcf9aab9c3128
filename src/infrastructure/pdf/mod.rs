//! PDF adapters
//!
//! - `template` - lopdf template document (page geometry, merge, save)
//! - `overlay` - pdf-writer content streams for page plans
//! - `assembler` - ordered merge and document metadata
//! - `fonts` - Helvetica metrics and WinAnsi encoding

pub mod assembler;
pub mod fonts;
mod overlay;
mod template;

pub use assembler::{assemble_document, AssembledDocument};
pub use overlay::{encode_pages, PdfOverlayEncoder};
pub use template::PdfTemplate;

#[cfg(test)]
pub(crate) use template::testing;
