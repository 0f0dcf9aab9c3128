//! Overlay content streams
//!
//! Each page plan becomes one self-contained content stream: a saved
//! graphics state, black fill, and one text object per placed string.

use pdf_writer::{Content, Name, Str};
use rayon::prelude::*;

use crate::domain::entities::Align;
use crate::domain::ports::OverlayEncoder;
use crate::domain::services::PagePlan;
use crate::error::CasillaResult;

use super::fonts::{encode_win_ansi, resource_name, text_width};

/// pdf-writer based overlay encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfOverlayEncoder;

impl PdfOverlayEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl OverlayEncoder for PdfOverlayEncoder {
    fn encode(&self, plan: &PagePlan) -> CasillaResult<Vec<u8>> {
        if plan.is_empty() {
            return Ok(Vec::new());
        }

        let mut content = Content::new();
        content.save_state();
        content.set_fill_gray(0.0);
        for item in &plan.items {
            let width = text_width(item.font, &item.text, item.size);
            let x = match item.align {
                Align::Left => item.x,
                Align::Center => item.x - width / 2.0,
                Align::Right => item.x - width,
            };
            let bytes = encode_win_ansi(&item.text);
            content
                .begin_text()
                .set_font(Name(resource_name(item.font).as_bytes()), item.size)
                .next_line(x, item.y)
                .show(Str(&bytes))
                .end_text();
        }
        content.restore_state();

        let raw = content.finish();
        Ok(raw.as_slice().to_vec())
    }
}

/// Encode every page in parallel; results keep page order.
pub fn encode_pages(encoder: &dyn OverlayEncoder, plans: &[PagePlan]) -> CasillaResult<Vec<Vec<u8>>> {
    plans.par_iter().map(|plan| encoder.encode(plan)).collect()
}
