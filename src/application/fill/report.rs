//! Fill Report
//!
//! Outcome of one run, printed as a summary or emitted as JSON.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::entities::{FieldTable, ReductionShape};
use crate::domain::services::Recalculation;
use crate::domain::value_objects::ContentHash;
use crate::error::CasillaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Document written
    Success,
    /// Every stage except rendering passed
    Checked,
    Failed,
}

/// Machine-readable failure of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunError {
    pub code: &'static str,
    pub message: String,
}

impl From<&CasillaError> for RunError {
    fn from(err: &CasillaError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Result of a fill or check run
#[derive(Debug, Clone, Serialize)]
pub struct FillReport {
    pub job: String,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<ContentHash>,
    pub pages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reductions_shape: Option<ReductionShape>,
    pub reductions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recalculation: Option<Recalculation>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
}

impl FillReport {
    pub fn new(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            status: RunStatus::Failed,
            output: None,
            sha256: None,
            pages: 0,
            reductions_shape: None,
            reductions: 0,
            recalculation: None,
            warnings: Vec::new(),
            fields: None,
            error: None,
        }
    }

    /// Report for a run that failed before producing anything
    pub fn failed(job: impl Into<String>, err: &CasillaError) -> Self {
        Self {
            error: Some(err.into()),
            ..Self::new(job)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status != RunStatus::Failed
    }
}
