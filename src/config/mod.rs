//! Configuration module for Casilla
//!
//! Configuration hierarchy (first file found wins):
//! 1. `--config <file>` on the command line
//! 2. Project config (`./casilla.toml`)
//! 3. User config (`<config dir>/casilla/config.toml`)
//! 4. Built-in defaults
//!
//! Environment variables (`CASILLA_*`) are applied on top.

mod loader;
mod types;

pub use crate::domain::value_objects::ConfigWarning;

pub use loader::{apply_overrides, PROJECT_CONFIG};
pub use types::{BatchConfig, Config, FormatConfig, OutputConfig, RecalculationConfig, RenderConfig};
