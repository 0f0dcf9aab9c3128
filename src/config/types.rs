//! Configuration type definitions

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::FillOptions;
use crate::domain::services::{FormatOptions, LayoutOptions, RecalcOptions};
use crate::error::CasillaResult;

use super::loader::{self, ConfigWarning};

/// Display formatting of resolved values
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,

    #[serde(default = "default_fraction_digits")]
    pub fraction_digits: u32,

    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,

    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,

    #[serde(default = "default_true")]
    pub blank_zero_amounts: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            date_pattern: default_date_pattern(),
            fraction_digits: default_fraction_digits(),
            decimal_separator: default_decimal_separator(),
            thousands_separator: default_thousands_separator(),
            blank_zero_amounts: true,
        }
    }
}

fn default_date_pattern() -> String {
    "%d/%m/%Y".to_string()
}

fn default_fraction_digits() -> u32 {
    2
}

fn default_decimal_separator() -> char {
    ','
}

fn default_thousands_separator() -> char {
    '.'
}

fn default_true() -> bool {
    true
}

/// Totals check and adjustment factor precision
///
/// `tolerance` accepts a number or a string:
///   [recalculation]
///   tolerance = "0.01"
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecalculationConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,

    #[serde(default = "default_factor_digits")]
    pub factor_digits: u32,
}

impl Default for RecalculationConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            factor_digits: default_factor_digits(),
        }
    }
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_factor_digits() -> u32 {
    10
}

/// Overlay drawing and document metadata
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_checkbox_x_offset")]
    pub checkbox_x_offset: f32,

    #[serde(default = "default_checkbox_y_offset")]
    pub checkbox_y_offset: f32,

    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default = "default_true")]
    pub compress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            checkbox_x_offset: default_checkbox_x_offset(),
            checkbox_y_offset: default_checkbox_y_offset(),
            author: default_author(),
            compress: true,
        }
    }
}

fn default_checkbox_x_offset() -> f32 {
    -0.35
}

fn default_checkbox_y_offset() -> f32 {
    -0.45
}

fn default_author() -> String {
    crate::application::fill::DEFAULT_AUTHOR.to_string()
}

/// Where outputs land
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Batch execution
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct BatchConfig {
    /// Worker threads; 0 lets rayon pick one per core
    #[serde(default)]
    pub max_workers: usize,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub format: FormatConfig,

    #[serde(default)]
    pub recalculation: RecalculationConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> CasillaResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> CasillaResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Explicit file, `./casilla.toml`, user config or defaults; then env.
    pub fn discover(explicit: Option<&Path>) -> CasillaResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(explicit)
    }

    /// Apply environment variable overrides (CASILLA_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            date_pattern: self.format.date_pattern.clone(),
            fraction_digits: self.format.fraction_digits,
            decimal_separator: self.format.decimal_separator,
            thousands_separator: self.format.thousands_separator,
            blank_zero_amounts: self.format.blank_zero_amounts,
        }
    }

    pub fn recalc_options(&self) -> RecalcOptions {
        RecalcOptions {
            tolerance: self.recalculation.tolerance,
            factor_digits: self.recalculation.factor_digits,
        }
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            checkbox_x_offset: self.render.checkbox_x_offset,
            checkbox_y_offset: self.render.checkbox_y_offset,
        }
    }

    /// Options for one fill run
    pub fn fill_options(&self) -> FillOptions {
        FillOptions {
            format: self.format_options(),
            recalc: self.recalc_options(),
            layout: self.layout_options(),
            model: None,
            output_dir: self.output.dir.clone(),
            author: self.render.author.clone(),
            compress: self.render.compress,
        }
    }
}
