//! Backup artifact management
//!
//! # Architecture
//!
//! - `id`: run ids (`YYYYMMDDHHMMSS`), extraction and humanized dates
//! - `naming`: canonical artifact names
//! - `compress`: gzip wrapping of payloads
//! - `manager`: the [`BackupManager`] tying naming, compression, encryption
//!   and storage together
//!
//! # Artifact Names
//!
//! `{prefix}-{id}-{logical_name}.gz`, plus `.gpg` when encrypted, e.g.
//! `db-bkp-20240101120000-users.gz`.
//!
//! # Example
//!
//! ```rust,ignore
//! use dumpkeeper::backup::BackupManager;
//! use dumpkeeper::config::BackupConfig;
//!
//! let mut manager = BackupManager::new(&BackupConfig::local("/var/lib/app"))?;
//! manager.create_file("users", b"...")?;
//!
//! for id in manager.get_ids() {
//!     println!("{}", dumpkeeper::backup::humanize(&id)?);
//! }
//! manager.close_connection()?;
//! ```

pub mod compress;
pub mod id;
mod manager;
pub mod naming;

pub use id::{create_id, extract_id, humanize};
pub use manager::{BackupManager, IdCheck, RunSummary};
pub use naming::build_name;
