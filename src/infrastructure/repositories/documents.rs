//! Model Document Repository
//!
//! Loads mapping models and data structures (JSON or YAML, chosen by file
//! extension) and input data trees (JSON).

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::entities::{DataStructure, MappingModel};
use crate::error::{CasillaError, CasillaResult};
use crate::infrastructure::fs::LocalFs;

/// On-disk syntax of a model document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` are YAML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Parse `text` as `T`, reporting failures against `file`.
pub fn parse_document<T: DeserializeOwned>(
    text: &str,
    format: DocumentFormat,
    kind: &'static str,
    file: &Path,
) -> CasillaResult<T> {
    let parsed = match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml_ng::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| CasillaError::Document {
        kind,
        file: file.to_path_buf(),
        message,
    })
}

/// Loads the documents a run needs from the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentRepository {
    fs: LocalFs,
}

impl FsDocumentRepository {
    pub fn new() -> Self {
        Self { fs: LocalFs::new() }
    }

    pub fn load_mapping(&self, path: &Path) -> CasillaResult<MappingModel> {
        let text = self.fs.read_to_string(path)?;
        let mapping: MappingModel = parse_document(&text, DocumentFormat::from_path(path), "mapping model", path)?;
        log::debug!("loaded {} field mapping(s) from {}", mapping.len(), path.display());
        Ok(mapping)
    }

    pub fn load_structure(&self, path: &Path) -> CasillaResult<DataStructure> {
        let text = self.fs.read_to_string(path)?;
        let structure: DataStructure =
            parse_document(&text, DocumentFormat::from_path(path), "data structure", path)?;
        log::debug!(
            "loaded {} section(s) from {}",
            structure.sections().len(),
            path.display()
        );
        Ok(structure)
    }

    /// Load an input data tree; the top level must be an object.
    pub fn load_data(&self, path: &Path) -> CasillaResult<Value> {
        let text = self.fs.read_to_string(path)?;
        let tree: Value = parse_document(&text, DocumentFormat::Json, "data tree", path)?;
        if !tree.is_object() {
            return Err(CasillaError::Document {
                kind: "data tree",
                file: path.to_path_buf(),
                message: "top level must be an object".to_string(),
            });
        }
        Ok(tree)
    }
}
