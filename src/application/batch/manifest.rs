//! Batch Manifest
//!
//! A JSON document listing jobs that share one mapping model, data
//! structure and template. Relative paths are resolved against the
//! manifest's own directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::runner::BatchJob;
use crate::error::{CasillaError, CasillaResult};
use crate::infrastructure::fs::LocalFs;
use crate::infrastructure::repositories::{parse_document, DocumentFormat};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestJob {
    pub id: String,
    pub data: PathBuf,
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchManifest {
    pub mapping: PathBuf,
    pub structure: PathBuf,
    pub template: PathBuf,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    pub jobs: Vec<ManifestJob>,
}

fn anchor(base: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

impl BatchManifest {
    pub fn load(path: &Path) -> CasillaResult<Self> {
        let text = LocalFs::new().read_to_string(path)?;
        let mut manifest: Self = parse_document(&text, DocumentFormat::Json, "batch manifest", path)?;
        manifest.validate(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.resolve_paths(base);
        Ok(manifest)
    }

    /// Jobs with the shared template filled in
    pub fn batch_jobs(&self) -> Vec<BatchJob> {
        self.jobs
            .iter()
            .map(|job| BatchJob {
                id: job.id.clone(),
                data: job.data.clone(),
                template: job.template.clone().unwrap_or_else(|| self.template.clone()),
                output: job.output.clone(),
            })
            .collect()
    }

    fn validate(&self, path: &Path) -> CasillaResult<()> {
        let mut seen = std::collections::HashSet::new();
        for job in &self.jobs {
            if job.id.trim().is_empty() {
                return Err(CasillaError::Document {
                    kind: "batch manifest",
                    file: path.to_path_buf(),
                    message: "job id must not be empty".to_string(),
                });
            }
            if !seen.insert(job.id.as_str()) {
                return Err(CasillaError::Document {
                    kind: "batch manifest",
                    file: path.to_path_buf(),
                    message: format!("duplicate job id '{}'", job.id),
                });
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        anchor(base, &mut self.mapping);
        anchor(base, &mut self.structure);
        anchor(base, &mut self.template);
        if let Some(dir) = self.output_dir.as_mut() {
            anchor(base, dir);
        }
        for job in &mut self.jobs {
            anchor(base, &mut job.data);
            if let Some(template) = job.template.as_mut() {
                anchor(base, template);
            }
            if let Some(output) = job.output.as_mut() {
                anchor(base, output);
            }
        }
    }
}
