//! Path management for dumpkeeper
//!
//! ## Path Resolution Order
//!
//! 1. `DUMPKEEPER_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/dumpkeeper` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::DumpError;

/// Environment variable overriding the base directory
pub const DIR_ENV_VAR: &str = "DUMPKEEPER_DIR";

/// Manages all paths used by dumpkeeper
#[derive(Debug, Clone)]
pub struct DumpPaths {
    /// Base directory for configuration and local backups
    base_dir: PathBuf,
}

impl DumpPaths {
    /// Create a new DumpPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, DumpError> {
        let base_dir = match std::env::var(DIR_ENV_VAR) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create DumpPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the local backup directory (`<base>/backups`)
    pub fn backup_dir(&self) -> PathBuf {
        backup_dir_under(&self.base_dir)
    }

    /// Get the path to the configuration file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }
}

/// The backup directory below a local base directory
pub fn backup_dir_under(base: &std::path::Path) -> PathBuf {
    base.join("backups")
}

fn resolve_default_path() -> Result<PathBuf, DumpError> {
    ProjectDirs::from("", "", "dumpkeeper")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| DumpError::Config("Could not determine a home directory".into()))
}
