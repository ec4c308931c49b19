//! CLI command handlers
//!
//! Bridges clap argument parsing with the backup manager.

pub mod backup;

pub use backup::{handle_backup_command, run_backup_command, BackupCommands};

use crate::error::{DumpError, DumpResult};

/// Prompt for a passphrase (hidden input)
pub fn prompt_passphrase(prompt: &str) -> DumpResult<String> {
    rpassword::prompt_password(prompt)
        .map_err(|e| DumpError::Config(format!("Failed to read passphrase: {}", e)))
}
