//! Local filesystem backend
//!
//! Artifacts are plain files in a single directory. Writes go to a temporary
//! file in the same directory and are renamed into place, so a crash never
//! leaves a half-written artifact under its final name.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::error::{DumpError, DumpResult};

use super::{BackendKind, Location, StorageBackend};

/// Name prefix of in-flight atomic writes
const TEMP_PREFIX: &str = ".dumpkeeper-tmp";

/// Stores artifacts in a local directory
#[derive(Debug, Clone)]
pub struct LocalBackend {
    dir: PathBuf,
}

impl LocalBackend {
    /// Open the backup directory, creating it if absent
    pub fn new(dir: impl Into<PathBuf>) -> DumpResult<Self> {
        let dir = dir.into();

        fs::create_dir_all(&dir).map_err(|e| {
            DumpError::Io(format!(
                "Failed to create backup directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let dir = dir.canonicalize().map_err(|e| {
            DumpError::Io(format!("Failed to resolve {}: {}", dir.display(), e))
        })?;

        Ok(Self { dir })
    }

    /// The absolute backup directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map an artifact name to a path inside the backup directory
    fn path_for(&self, name: &str) -> DumpResult<PathBuf> {
        if name.is_empty()
            || name == "."
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(DumpError::Storage(format!(
                "Invalid backup file name: {:?}",
                name
            )));
        }
        Ok(self.dir.join(name))
    }
}

impl StorageBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn list(&mut self) -> DumpResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            DumpError::Io(format!("Failed to read backup directory: {}", e))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                DumpError::Io(format!("Failed to read directory entry: {}", e))
            })?;

            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with(TEMP_PREFIX) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn store(&mut self, name: &str, bytes: &[u8]) -> DumpResult<Location> {
        let path = self.path_for(name)?;

        let mut temp = Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.dir)
            .map_err(|e| DumpError::Io(format!("Failed to create temp file: {}", e)))?;

        temp.write_all(bytes)
            .map_err(|e| DumpError::Io(format!("Failed to write backup file: {}", e)))?;

        temp.as_file()
            .sync_all()
            .map_err(|e| DumpError::Io(format!("Failed to sync backup file: {}", e)))?;

        // The temp file is removed if persisting fails
        temp.persist(&path)
            .map_err(|e| DumpError::Io(format!("Failed to move backup into place: {}", e.error)))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "stored backup file");
        Ok(Location::Path(path))
    }

    fn retrieve(&mut self, name: &str) -> DumpResult<Vec<u8>> {
        let path = self.path_for(name)?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DumpError::artifact_not_found(name),
            _ => DumpError::Io(format!("Failed to read {}: {}", path.display(), e)),
        })
    }

    fn delete(&mut self, name: &str) -> DumpResult<()> {
        let path = self.path_for(name)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DumpError::artifact_not_found(name),
            _ => DumpError::Io(format!("Failed to delete {}: {}", path.display(), e)),
        })?;

        tracing::debug!(path = %path.display(), "deleted backup file");
        Ok(())
    }
}
