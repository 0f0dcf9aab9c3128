//! Document assembly
//!
//! Merges every page overlay in template order, then asks the template to
//! emit the final bytes. Any merge failure aborts the whole document.

use chrono::{DateTime, Local};
use lopdf::{Dictionary, Object, StringFormat};

use crate::domain::ports::{DocumentMetadata, TemplateDocument};
use crate::domain::value_objects::ContentHash;
use crate::error::{CasillaError, CasillaResult};

/// A finished output document
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub bytes: Vec<u8>,
    pub sha256: ContentHash,
    pub page_count: usize,
}

/// Merge `overlays` (one per template page, in page order) and assemble.
pub fn assemble_document(
    template: &mut dyn TemplateDocument,
    overlays: Vec<Vec<u8>>,
    metadata: &DocumentMetadata,
) -> CasillaResult<AssembledDocument> {
    let page_count = template.page_count();
    if overlays.len() != page_count {
        return Err(CasillaError::MergeFailure {
            page: overlays.len().min(page_count),
            reason: format!(
                "{} overlays for a {page_count}-page template",
                overlays.len()
            ),
        });
    }

    for (page, overlay) in overlays.into_iter().enumerate() {
        template.merge_overlay(page, overlay)?;
    }

    let bytes = template.assemble(metadata)?;
    let sha256 = ContentHash::from_bytes(&bytes);
    log::debug!("assembled {page_count} pages, {} bytes, {sha256}", bytes.len());
    Ok(AssembledDocument {
        bytes,
        sha256,
        page_count,
    })
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xfe, 0xff];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// PDF date string, e.g. `D:20260105093000+01'00'`
pub fn pdf_date(moment: &DateTime<Local>) -> String {
    let offset = moment.offset().local_minus_utc();
    let zone = if offset == 0 {
        "Z".to_string()
    } else {
        let sign = if offset < 0 { '-' } else { '+' };
        let minutes = offset.abs() / 60;
        format!("{sign}{:02}'{:02}'", minutes / 60, minutes % 60)
    };
    format!("{}{zone}", moment.format("D:%Y%m%d%H%M%S"))
}

/// Document information dictionary for `metadata`
pub fn info_dictionary(metadata: &DocumentMetadata) -> Dictionary {
    let mut info = Dictionary::new();
    info.set("Title", text_string(&metadata.title));
    info.set("Subject", text_string(&metadata.subject));
    info.set("Keywords", text_string(&metadata.keywords));
    info.set("Author", text_string(&metadata.author));
    info.set("Producer", text_string(&metadata.producer));
    info.set("Creator", text_string(&metadata.producer));
    info.set("CreationDate", text_string(&pdf_date(&metadata.created)));
    info
}
