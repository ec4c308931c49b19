//! Configuration module for dumpkeeper
//!
//! - Path resolution for the configuration file and local backups
//! - The explicit [`BackupConfig`] value handed to the backup manager

pub mod paths;
pub mod settings;

pub use paths::DumpPaths;
pub use settings::{BackupConfig, EncryptionSettings, FtpSettings};
