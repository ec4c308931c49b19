//! Storage backends for backup artifacts
//!
//! Artifacts live either in a local directory or on an FTP server. The
//! backend is chosen once, when the manager is constructed:
//!
//! - complete FTP settings and a successful login → [`FtpBackend`]
//! - incomplete FTP settings → [`LocalBackend`]
//! - FTP login or directory change rejected → [`LocalBackend`], with a
//!   warning event; the connection error is not returned

pub mod ftp;
pub mod local;
pub mod scratch;

use std::fmt;
use std::path::PathBuf;

use crate::config::settings::BackupConfig;
use crate::error::DumpResult;

pub use ftp::FtpBackend;
pub use local::LocalBackend;
pub use scratch::ScratchDir;

/// Where a stored artifact ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Absolute path on the local filesystem
    Path(PathBuf),
    /// `ftp://server/path/name`
    Url(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Url(url) => f.write_str(url),
        }
    }
}

/// The kind of backend in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Ftp,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => f.write_str("local"),
            BackendKind::Ftp => f.write_str("ftp"),
        }
    }
}

/// Capabilities every storage backend provides
pub trait StorageBackend {
    /// Which variant this is
    fn kind(&self) -> BackendKind;

    /// Human readable root of the backend (directory or URL)
    fn location(&self) -> String;

    /// Names of the entries currently stored, unfiltered
    fn list(&mut self) -> DumpResult<Vec<String>>;

    /// Store bytes under a name, overwriting any existing artifact
    fn store(&mut self, name: &str, bytes: &[u8]) -> DumpResult<Location>;

    /// Retrieve the bytes stored under a name
    fn retrieve(&mut self, name: &str) -> DumpResult<Vec<u8>>;

    /// Delete the artifact stored under a name
    fn delete(&mut self, name: &str) -> DumpResult<()>;

    /// Release any network session; safe to call more than once
    fn close(&mut self) -> DumpResult<()> {
        Ok(())
    }
}

/// Pick the backend described by the configuration, applying the FTP
/// fallback rule
pub fn select_backend(config: &BackupConfig) -> DumpResult<Box<dyn StorageBackend>> {
    if let Some(target) = config.ftp.target() {
        match FtpBackend::connect(&config.ftp) {
            Ok(ftp) => {
                tracing::debug!(location = %ftp.location(), "using ftp backend");
                return Ok(Box::new(ftp));
            }
            Err(e) => {
                tracing::warn!(
                    address = %format!("ftp://{}", target.masked_address()),
                    error = %e,
                    "couldn't connect to ftp server, falling back to local backups"
                );
            }
        }
    } else {
        tracing::debug!("ftp not configured, using local backups");
    }

    let local = LocalBackend::new(config.backup_dir()?)?;
    Ok(Box::new(local))
}
