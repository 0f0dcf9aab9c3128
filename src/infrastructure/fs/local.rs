//! Local File System
//!
//! Reads inputs and writes outputs atomically: content goes to a temp file
//! in the destination directory, is synced, then renamed into place.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::domain::value_objects::ContentHash;
use crate::error::CasillaResult;

/// Local file system operations
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new LocalFs instance
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> CasillaResult<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    pub fn read_to_string(&self, path: &Path) -> CasillaResult<String> {
        Ok(fs::read_to_string(path)?)
    }

    /// Write `content` to `path` atomically, creating parent directories.
    pub fn write_atomic(&self, path: &Path, content: &[u8]) -> CasillaResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(content)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// SHA-256 of a file on disk
    pub fn hash(&self, path: &Path) -> CasillaResult<ContentHash> {
        Ok(ContentHash::from_bytes(&self.read(path)?))
    }
}
