//! dumpkeeper - timestamped backup artifacts on local disk or FTP
//!
//! Callers hand opaque byte payloads to a [`BackupManager`]; it names them
//! after the backup run they belong to, gzips them, optionally encrypts them
//! to OpenPGP recipient keys, and stores them in a local directory or on an
//! FTP server.
//!
//! # Architecture
//!
//! - `config`: path resolution and the explicit [`BackupConfig`]
//! - `error`: custom error types
//! - `backup`: run ids, artifact names, compression and the manager
//! - `crypto`: optional encryption providers
//! - `storage`: local and FTP backends
//! - `cli`, `display`: the command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use dumpkeeper::{BackupConfig, BackupManager};
//!
//! let mut manager = BackupManager::new(&BackupConfig::local("/var/lib/app"))?;
//! manager.set_run_id("20240101120000")?;
//! manager.create_file("users", b"data")?;
//! assert_eq!(manager.read_file("db-bkp-20240101120000-users.gz")?, b"data");
//! manager.close_connection()?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod storage;

pub use backup::BackupManager;
pub use config::BackupConfig;
pub use error::{DumpError, DumpResult};
