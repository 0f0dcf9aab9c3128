//! Error types for Casilla
//!
//! Every engine failure is fatal to the current run and names the offending
//! field id, box, reduction key or page.

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::services::ValidationReport;

/// Result type alias for Casilla operations
pub type CasillaResult<T> = Result<T, CasillaError>;

/// Main error type for Casilla operations
#[derive(Error, Debug)]
pub enum CasillaError {
    /// A single supplied value is malformed
    #[error("invalid value for '{field}': {reason}{}", value_suffix(.value))]
    Validation {
        field: String,
        value: Option<String>,
        reason: String,
    },

    /// The data tree does not satisfy the declared data structure
    #[error("input data failed structure validation:\n{0}")]
    InvalidData(ValidationReport),

    /// A required source path is absent
    #[error("missing required value for field '{field_id}' (path '{path}')")]
    MissingField { field_id: String, path: String },

    /// Legacy reductions contain a key outside the recognized table
    #[error("unknown legacy reduction key '{key}' (recognized: {recognized})")]
    UnknownReductionKey { key: String, recognized: String },

    /// Declared reduction totals disagree with the recomputed sums
    #[error("totalesReducciones.{total} declared {declared} but reductions sum to {computed}")]
    TotalsMismatch {
        total: &'static str,
        declared: Decimal,
        computed: Decimal,
    },

    /// Reductions exceed the taxable base
    #[error(
        "box {casilla}: base {base_previa} minus reductions {total_reducciones} gives negative base {base_nueva}"
    )]
    NegativeBase {
        casilla: &'static str,
        base_previa: Decimal,
        total_reducciones: Decimal,
        base_nueva: Decimal,
    },

    /// A mapping targets a page the template does not have
    #[error("field '{field_id}' targets page {page} but the template has {page_count} page(s)")]
    PageOutOfRange {
        field_id: String,
        page: usize,
        page_count: usize,
    },

    /// A page overlay could not be composited onto the template
    #[error("failed to merge overlay onto page {page}: {reason}")]
    MergeFailure { page: usize, reason: String },

    /// Mapping model or data structure document is unusable
    #[error("invalid {kind} in {file}: {message}")]
    Document {
        kind: &'static str,
        file: PathBuf,
        message: String,
    },

    /// Template PDF is unusable
    #[error("unusable template {file}: {message}")]
    Template { file: PathBuf, message: String },

    /// Configuration file is unusable
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Low-level PDF error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

fn value_suffix(value: &Option<String>) -> String {
    match value {
        Some(v) => format!(" (got '{v}')"),
        None => String::new(),
    }
}

impl CasillaError {
    /// Shorthand for a [`CasillaError::Validation`] carrying the offending value.
    pub fn invalid(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            value: Some(value.into()),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`CasillaError::Validation`] about a value's shape.
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            value: None,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used in JSON reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } | Self::InvalidData(_) => "validation",
            Self::MissingField { .. } => "missing_field",
            Self::UnknownReductionKey { .. } => "unknown_reduction_key",
            Self::TotalsMismatch { .. } => "totals_mismatch",
            Self::NegativeBase { .. } => "negative_base",
            Self::PageOutOfRange { .. } => "page_out_of_range",
            Self::MergeFailure { .. } => "merge_failure",
            Self::Document { .. } => "document",
            Self::Template { .. } => "template",
            Self::Config { .. } => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Yaml(_) => "yaml",
            Self::Pdf(_) => "pdf",
        }
    }
}
