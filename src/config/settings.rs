//! Backup configuration
//!
//! Everything the backup manager needs is passed in explicitly through a
//! [`BackupConfig`] value; nothing is read from process-wide state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::paths::{backup_dir_under, DumpPaths};
use crate::backup::naming::DEFAULT_PREFIX;
use crate::crypto::gpg::DEFAULT_GPG_BINARY;
use crate::error::DumpError;

/// FTP endpoint settings
///
/// The remote backend is only attempted when server, user, password and path
/// are all present.
#[derive(Clone, Serialize, Deserialize)]
pub struct FtpSettings {
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Remote directory holding the backups
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_ftp_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_secs: u64,
}

fn default_ftp_port() -> u16 {
    21
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_transfer_timeout() -> u64 {
    60
}

impl Default for FtpSettings {
    fn default() -> Self {
        Self {
            server: None,
            user: None,
            password: None,
            path: None,
            port: default_ftp_port(),
            connect_timeout_secs: default_connect_timeout(),
            transfer_timeout_secs: default_transfer_timeout(),
        }
    }
}

impl FtpSettings {
    /// Settings for a server, user, password and remote path
    pub fn new(
        server: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            server: Some(server.into()),
            user: Some(user.into()),
            password: Some(password.into()),
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// The complete connection target, if every field is set
    pub fn target(&self) -> Option<FtpTarget<'_>> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }

        Some(FtpTarget {
            server: present(&self.server)?,
            user: present(&self.user)?,
            password: present(&self.password)?,
            path: present(&self.path)?,
            port: self.port,
        })
    }

    /// Whether every required field is set
    pub fn is_complete(&self) -> bool {
        self.target().is_some()
    }
}

// Keep the password out of logs
impl std::fmt::Debug for FtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FtpSettings")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("path", &self.path)
            .field("port", &self.port)
            .finish()
    }
}

/// A fully specified FTP endpoint
#[derive(Clone, Copy)]
pub struct FtpTarget<'a> {
    pub server: &'a str,
    pub user: &'a str,
    pub password: &'a str,
    pub path: &'a str,
    pub port: u16,
}

impl FtpTarget<'_> {
    /// `user:****@server/path/` for diagnostics
    pub fn masked_address(&self) -> String {
        format!(
            "{}:{}@{}{}",
            self.user,
            "*".repeat(self.password.len()),
            self.server,
            with_slashes(self.path)
        )
    }
}

/// Add, if needed, a slash to the beginning and end of a path
pub fn with_slashes(path: &str) -> String {
    let mut s = path.to_string();
    if s.len() > 1 {
        if !s.starts_with('/') {
            s.insert(0, '/');
        }
        if !s.ends_with('/') {
            s.push('/');
        }
    }
    s
}

/// Encryption settings
#[derive(Clone, Serialize, Deserialize)]
pub struct EncryptionSettings {
    /// Whether new backups are encrypted
    #[serde(default)]
    pub enabled: bool,

    /// Key ids, fingerprints or emails of the recipients
    #[serde(default)]
    pub recipient_keys: Vec<String>,

    /// Passphrase of the private key, needed to read encrypted backups
    #[serde(default, skip_serializing)]
    pub passphrase: Option<String>,

    #[serde(default = "default_gpg_binary")]
    pub gpg_binary: String,

    /// Alternative keyring directory (`--homedir`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpg_home: Option<PathBuf>,
}

fn default_gpg_binary() -> String {
    DEFAULT_GPG_BINARY.to_string()
}

impl Default for EncryptionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            recipient_keys: Vec::new(),
            passphrase: None,
            gpg_binary: default_gpg_binary(),
            gpg_home: None,
        }
    }
}

impl std::fmt::Debug for EncryptionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionSettings")
            .field("enabled", &self.enabled)
            .field("recipient_keys", &self.recipient_keys)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "***"))
            .field("gpg_binary", &self.gpg_binary)
            .field("gpg_home", &self.gpg_home)
            .finish()
    }
}

/// Configuration consumed by the backup manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Remote backend settings
    #[serde(default)]
    pub ftp: FtpSettings,

    /// Root of the local backend; backups go to `<root>/backups`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_base_dir: Option<PathBuf>,

    /// Prefix of every artifact name
    #[serde(default = "default_prefix")]
    pub file_prefix: String,

    #[serde(default)]
    pub encryption: EncryptionSettings,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            ftp: FtpSettings::default(),
            local_base_dir: None,
            file_prefix: default_prefix(),
            encryption: EncryptionSettings::default(),
        }
    }
}

impl BackupConfig {
    /// A local-only configuration rooted at `base`
    pub fn local(base: impl Into<PathBuf>) -> Self {
        Self {
            local_base_dir: Some(base.into()),
            ..Default::default()
        }
    }

    /// Directory used by the local backend
    pub fn backup_dir(&self) -> Result<PathBuf, DumpError> {
        match &self.local_base_dir {
            Some(base) => Ok(backup_dir_under(base)),
            None => Ok(DumpPaths::new()?.backup_dir()),
        }
    }

    /// Load configuration from a JSON file
    pub fn load_from(path: &Path) -> Result<Self, DumpError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DumpError::Io(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            DumpError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Load configuration from the default location, or use defaults
    ///
    /// When no `local_base_dir` is configured the base directory of `paths`
    /// is used.
    pub fn load_or_default(paths: &DumpPaths) -> Result<Self, DumpError> {
        let settings_path = paths.settings_file();

        let mut config = if settings_path.exists() {
            Self::load_from(&settings_path)?
        } else {
            Self::default()
        };

        if config.local_base_dir.is_none() {
            config.local_base_dir = Some(paths.base_dir().clone());
        }

        Ok(config)
    }

    /// Save configuration to disk (the passphrase is never written)
    pub fn save(&self, path: &Path) -> Result<(), DumpError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DumpError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            DumpError::Config(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, contents)
            .map_err(|e| DumpError::Io(format!("Failed to write config file: {}", e)))
    }
}
