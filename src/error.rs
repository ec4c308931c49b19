//! Custom error types for dumpkeeper
//!
//! This module defines the error hierarchy for the backup manager using
//! thiserror. Every per-operation failure surfaces as its own variant so
//! callers can tell a missing artifact from a bad passphrase or a corrupt
//! archive.

use thiserror::Error;

/// The main error type for dumpkeeper operations
#[derive(Error, Debug)]
pub enum DumpError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Remote endpoint could not be reached, authenticated or entered
    #[error("Connection error: {0}")]
    Connection(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encryption errors (no usable recipient key, tool failure)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Decryption reported failure (wrong passphrase, corrupt ciphertext,
    /// missing private key)
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// An encrypted artifact was read but no passphrase is configured
    #[error("A passphrase is required to decrypt backups")]
    MissingPassphrase,

    /// An encrypted artifact was read by a manager without encryption
    #[error("Backup {0} is encrypted but encryption is not configured")]
    EncryptionNotConfigured(String),

    /// Decompression of malformed bytes
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// Malformed backup id
    #[error("Invalid backup id '{0}': expected a YYYYMMDDHHMMSS timestamp")]
    InvalidId(String),
}

impl DumpError {
    /// Create a "not found" error for backup artifacts
    pub fn artifact_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup file",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a decryption failure
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption(_))
    }
}

impl From<std::io::Error> for DumpError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DumpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for dumpkeeper operations
pub type DumpResult<T> = Result<T, DumpError>;
