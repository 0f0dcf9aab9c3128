//! Page layout planning
//!
//! Decides, for every template page, which strings are painted where. The
//! plan is complete before any content stream is encoded, so an out-of-range
//! page is reported without drawing anything.

use serde::Serialize;

use crate::domain::entities::{Align, FieldTable, FieldValue, FontFace, MappingModel};
use crate::domain::ports::PageSize;
use crate::error::{CasillaError, CasillaResult};

/// Placement knobs for checkbox marks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Horizontal offset of the mark, in multiples of the font size
    pub checkbox_x_offset: f32,
    /// Vertical offset of the mark, in multiples of the font size
    pub checkbox_y_offset: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            checkbox_x_offset: -0.35,
            checkbox_y_offset: -0.45,
        }
    }
}

/// One string anchored on a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedText {
    pub field_id: String,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font: FontFace,
    pub size: f32,
    pub align: Align,
}

/// Everything painted on one page, in mapping order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PagePlan {
    pub page: usize,
    pub items: Vec<PlacedText>,
}

impl PagePlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Reject any mapping that targets a page the template lacks.
pub fn check_page_range(mapping: &MappingModel, page_count: usize) -> CasillaResult<()> {
    for field in mapping.fields() {
        if let Some(&page) = field.pages.iter().find(|&&p| p >= page_count) {
            return Err(CasillaError::PageOutOfRange {
                field_id: field.id.clone(),
                page,
                page_count,
            });
        }
    }
    Ok(())
}

/// Fields whose anchor falls outside a page they are drawn on.
///
/// Such text would be clipped by viewers, so each hit is worth a warning.
/// Pages of unknown size are skipped.
pub fn off_page_fields(mapping: &MappingModel, size_of: impl Fn(usize) -> Option<PageSize>) -> Vec<String> {
    let mut messages = Vec::new();
    for field in mapping.fields() {
        for &page in &field.pages {
            let Some(size) = size_of(page) else { continue };
            let inside = (0.0..=size.width).contains(&field.x) && (0.0..=size.height).contains(&field.y);
            if !inside {
                messages.push(format!(
                    "field '{}' at ({}, {}) lies outside page {page} ({} x {} pt)",
                    field.id, field.x, field.y, size.width, size.height
                ));
            }
        }
    }
    messages
}

/// Builds per-page plans from a resolved table
pub struct LayoutPlanner<'a> {
    mapping: &'a MappingModel,
    options: LayoutOptions,
}

impl<'a> LayoutPlanner<'a> {
    pub fn new(mapping: &'a MappingModel, options: LayoutOptions) -> Self {
        Self { mapping, options }
    }

    /// One plan per template page, `page_count` entries long.
    pub fn plan(&self, table: &FieldTable, page_count: usize) -> CasillaResult<Vec<PagePlan>> {
        check_page_range(self.mapping, page_count)?;

        let mut pages: Vec<PagePlan> = (0..page_count)
            .map(|page| PagePlan {
                page,
                items: Vec::new(),
            })
            .collect();

        for field in self.mapping.fields() {
            let placed = match table.get(&field.id) {
                Some(FieldValue::Text(text)) if !text.is_empty() => PlacedText {
                    field_id: field.id.clone(),
                    text: text.clone(),
                    x: field.x,
                    y: field.y,
                    font: field.font,
                    size: field.size,
                    align: field.align,
                },
                Some(FieldValue::Check(true)) if !field.true_label.is_empty() => PlacedText {
                    field_id: field.id.clone(),
                    text: field.true_label.clone(),
                    x: field.x + self.options.checkbox_x_offset * field.size,
                    y: field.y + self.options.checkbox_y_offset * field.size,
                    font: FontFace::HelveticaBold,
                    size: field.size,
                    align: Align::Left,
                },
                _ => continue,
            };
            for &page in &field.pages {
                pages[page].items.push(placed.clone());
            }
        }
        Ok(pages)
    }
}
