//! Fill Options
//!
//! Knobs of one fill run, usually built from the loaded configuration.

use std::path::PathBuf;

use crate::domain::services::{FormatOptions, LayoutOptions, RecalcOptions};

/// Author written to the document information dictionary
pub const DEFAULT_AUTHOR: &str = "casilla";

/// Model code used when neither the caller nor the mapping names one
pub const DEFAULT_MODEL: &str = "650";

/// Options for the fill use case
#[derive(Debug, Clone, PartialEq)]
pub struct FillOptions {
    pub format: FormatOptions,
    pub recalc: RecalcOptions,
    pub layout: LayoutOptions,
    /// Overrides the model code from the mapping model
    pub model: Option<String>,
    /// Directory for outputs without an explicit path
    pub output_dir: PathBuf,
    pub author: String,
    /// Compress streams of the produced document
    pub compress: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            format: FormatOptions::default(),
            recalc: RecalcOptions::default(),
            layout: LayoutOptions::default(),
            model: None,
            output_dir: PathBuf::from("output"),
            author: DEFAULT_AUTHOR.to_string(),
            compress: true,
        }
    }
}

impl FillOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}
