//! Backup manager for dumpkeeper
//!
//! Orchestrates naming, compression, optional encryption and the storage
//! backend. The backend and encryption provider are fixed at construction;
//! the artifact listing is read once and then kept in step with the
//! manager's own writes and deletes.

use chrono::{DateTime, Utc};

use crate::config::settings::BackupConfig;
use crate::crypto::provider::{provider_from_settings, EncryptionProvider};
use crate::error::{DumpError, DumpResult};
use crate::storage::{select_backend, BackendKind, Location, StorageBackend};

use super::compress::{compress, decompress};
use super::id::{create_id, extract_id, is_well_formed, parse_id};
use super::naming::{build_name, is_encrypted_name};

/// All artifacts sharing one run id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The run id
    pub id: String,
    /// When the run was taken, `None` if the id is not a valid date
    pub created_at: Option<DateTime<Utc>>,
    /// Artifact names in the run
    pub files: Vec<String>,
}

/// Outcome of checking a run id against the known backups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdCheck {
    /// At least one artifact carries this id
    Known,
    /// No artifact carries this id; holds a message for the user
    Unknown(String),
}

impl IdCheck {
    /// Whether the id is known
    pub fn is_valid(&self) -> bool {
        matches!(self, IdCheck::Known)
    }

    /// Diagnostic message for an unknown id
    pub fn message(&self) -> Option<&str> {
        match self {
            IdCheck::Known => None,
            IdCheck::Unknown(msg) => Some(msg),
        }
    }
}

/// Manages backup artifacts on a local or FTP backend
pub struct BackupManager {
    backend: Box<dyn StorageBackend>,
    encryption: Box<dyn EncryptionProvider>,
    file_prefix: String,
    /// Id used for artifacts created by this manager
    run_id: String,
    /// Cached backend listing
    files: Vec<String>,
}

impl BackupManager {
    /// Create a manager from configuration
    ///
    /// Encryption settings are validated first. Then the FTP backend is tried
    /// if fully configured, falling back to the local directory when the
    /// server rejects the connection.
    pub fn new(config: &BackupConfig) -> DumpResult<Self> {
        let encryption = provider_from_settings(&config.encryption)?;
        let backend = select_backend(config)?;
        Self::from_parts(backend, encryption, &config.file_prefix)
    }

    /// Create a manager over an explicit backend
    pub fn with_backend(
        backend: Box<dyn StorageBackend>,
        config: &BackupConfig,
    ) -> DumpResult<Self> {
        let encryption = provider_from_settings(&config.encryption)?;
        Self::from_parts(backend, encryption, &config.file_prefix)
    }

    /// Create a manager from a backend, an encryption provider and a prefix
    pub fn from_parts(
        mut backend: Box<dyn StorageBackend>,
        encryption: Box<dyn EncryptionProvider>,
        file_prefix: &str,
    ) -> DumpResult<Self> {
        if file_prefix.is_empty() || extract_id(&format!("{}-", file_prefix)).is_some() {
            return Err(DumpError::Config(format!(
                "Invalid file prefix: {:?}",
                file_prefix
            )));
        }

        let files = backend.list()?;
        tracing::debug!(
            backend = %backend.kind(),
            location = %backend.location(),
            files = files.len(),
            "backup manager ready"
        );

        Ok(Self {
            backend,
            encryption,
            file_prefix: file_prefix.to_string(),
            run_id: create_id(None),
            files,
        })
    }

    // core operations

    /// Compress, optionally encrypt, and store a payload for the current run
    ///
    /// Returns where the artifact was stored.
    pub fn create_file(&mut self, logical_name: &str, payload: &[u8]) -> DumpResult<Location> {
        let name = self.build_artifact_name(&self.run_id, logical_name);
        if logical_name.is_empty() || extract_id(&name).as_deref() != Some(self.run_id.as_str()) {
            return Err(DumpError::Storage(format!(
                "Invalid logical name: {:?}",
                logical_name
            )));
        }

        let compressed = compress(payload)?;
        let stored = if self.encryption.is_active() {
            self.encryption.encrypt(&compressed)?
        } else {
            compressed
        };

        let location = self.backend.store(&name, &stored)?;
        if !self.files.contains(&name) {
            self.files.push(name);
        }

        tracing::info!(location = %location, "backup file created");
        Ok(location)
    }

    /// Retrieve, decrypt if needed, and decompress an artifact
    pub fn read_file(&mut self, name: &str) -> DumpResult<Vec<u8>> {
        if is_encrypted_name(name) {
            self.encryption.ensure_can_decrypt(name)?;
            let raw = self.backend.retrieve(name)?;
            let plain = self.encryption.decrypt(name, &raw)?;
            decompress(&plain)
        } else {
            let raw = self.backend.retrieve(name)?;
            decompress(&raw)
        }
    }

    /// Delete an artifact
    pub fn delete_file(&mut self, name: &str) -> DumpResult<()> {
        self.backend.delete(name)?;
        self.files.retain(|f| f != name);
        tracing::info!(name, "backup file deleted");
        Ok(())
    }

    /// Close the FTP session, if any
    pub fn close_connection(&mut self) -> DumpResult<()> {
        self.backend.close()
    }

    // queries over the cached listing

    /// Names of all artifacts whose embedded id equals `id`
    pub fn filter_files(&self, id: &str) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| extract_id(f).as_deref() == Some(id))
            .cloned()
            .collect()
    }

    /// Distinct run ids in first-seen order
    pub fn get_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in self.files.iter().filter_map(|f| extract_id(f)) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Check an id against the known runs
    pub fn check_id(&self, id: &str) -> IdCheck {
        if !id.is_empty() && self.get_ids().iter().any(|known| known == id) {
            return IdCheck::Known;
        }

        tracing::info!(id, "no backup with this id");
        IdCheck::Unknown(format!(
            "Invalid id '{}'. Use \"history\" to list existing backups",
            id
        ))
    }

    /// Whether any artifact carries `id`
    pub fn is_valid_id(&self, id: &str) -> bool {
        self.check_id(id).is_valid()
    }

    /// Canonical artifact name for this manager's prefix and encryption mode
    pub fn build_artifact_name(&self, id: &str, logical_name: &str) -> String {
        build_name(&self.file_prefix, id, logical_name, self.encryption.is_active())
    }

    /// Runs grouped by id, newest first
    ///
    /// Runs whose id is not a valid date come last, in id order.
    pub fn runs(&self) -> Vec<RunSummary> {
        let mut runs: Vec<RunSummary> = self
            .get_ids()
            .into_iter()
            .map(|id| RunSummary {
                created_at: parse_id(&id).ok(),
                files: self.filter_files(&id),
                id,
            })
            .collect();
        runs.sort_by(|a, b| match (a.created_at, b.created_at) {
            (Some(_), Some(_)) => b.id.cmp(&a.id),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        runs
    }

    /// Runs `prune_runs(keep)` would delete
    ///
    /// Only dated runs take part in retention; the others are never pruned.
    pub fn prune_candidates(&self, keep: usize) -> Vec<RunSummary> {
        self.runs()
            .into_iter()
            .filter(|run| run.created_at.is_some())
            .skip(keep)
            .collect()
    }

    // maintenance

    /// Re-read the backend listing
    pub fn refresh(&mut self) -> DumpResult<()> {
        self.files = self.backend.list()?;
        Ok(())
    }

    /// Delete every artifact of a run, returning the deleted names
    pub fn delete_run(&mut self, id: &str) -> DumpResult<Vec<String>> {
        let names = self.filter_files(id);
        for name in &names {
            self.delete_file(name)?;
        }
        Ok(names)
    }

    /// Keep the `keep` newest runs and delete all older ones
    ///
    /// Returns the deleted artifact names.
    pub fn prune_runs(&mut self, keep: usize) -> DumpResult<Vec<String>> {
        let mut deleted = Vec::new();
        for run in self.prune_candidates(keep) {
            deleted.extend(self.delete_run(&run.id)?);
        }
        Ok(deleted)
    }

    // accessors

    /// Id given to artifacts created by this manager
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Use a caller-supplied run id for subsequent `create_file` calls
    pub fn set_run_id(&mut self, id: &str) -> DumpResult<()> {
        if !is_well_formed(id) {
            return Err(DumpError::InvalidId(id.to_string()));
        }
        self.run_id = id.to_string();
        Ok(())
    }

    /// Cached artifact listing
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Prefix of artifact names
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Whether new artifacts are encrypted
    pub fn is_encrypted(&self) -> bool {
        self.encryption.is_active()
    }

    /// Which backend was selected
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Root of the selected backend
    pub fn location(&self) -> String {
        self.backend.location()
    }
}
