//! Backup CLI commands
//!
//! Implements CLI commands for backup management on top of
//! [`BackupManager`].

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::backup::{humanize, BackupManager, IdCheck};
use crate::display::{format_history, format_run_detail};
use crate::error::{DumpError, DumpResult};

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// List existing backups
    History {
        /// Show the files of every backup
        #[arg(short = 'f', long = "files")]
        files: bool,
    },

    /// Store a payload as a backup file
    Create {
        /// Logical name of the payload (e.g. a table name)
        name: String,

        /// Read the payload from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Backup id to use (YYYYMMDDHHMMSS, defaults to now)
        #[arg(long)]
        id: Option<String>,
    },

    /// Write the contents of a backup file to stdout or a file
    Read {
        /// Backup file name
        name: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the files of one backup
    Info {
        /// Backup id
        id: String,
    },

    /// Delete every file of a backup
    Remove {
        /// Backup id
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Delete all but the newest backups
    Prune {
        /// Number of backups to keep
        #[arg(short, long)]
        keep: usize,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command, then close the backend connection
///
/// The command's own error wins over a failure to close.
pub fn run_backup_command(manager: &mut BackupManager, cmd: BackupCommands) -> DumpResult<()> {
    let result = handle_backup_command(manager, cmd);
    match manager.close_connection() {
        Ok(()) => result,
        Err(e) if result.is_ok() => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "failed to close the backend connection");
            result
        }
    }
}

/// Handle a backup command
pub fn handle_backup_command(manager: &mut BackupManager, cmd: BackupCommands) -> DumpResult<()> {
    match cmd {
        BackupCommands::History { files } => {
            let runs = manager.runs();
            if files {
                for run in &runs {
                    println!("{}", format_run_detail(run));
                }
            }
            println!("{}", format_history(&runs));
        }

        BackupCommands::Create { name, file, id } => {
            if let Some(id) = id {
                manager.set_run_id(&id)?;
            }

            let payload = match file {
                Some(path) => fs::read(&path).map_err(|e| {
                    DumpError::Io(format!("Failed to read {}: {}", path.display(), e))
                })?,
                None => {
                    let mut buf = Vec::new();
                    io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };

            let location = manager.create_file(&name, &payload)?;
            println!("==> Backup {} created: {}", manager.run_id(), location);
        }

        BackupCommands::Read { name, output } => {
            let payload = manager.read_file(&name)?;
            match output {
                Some(path) => {
                    fs::write(&path, &payload).map_err(|e| {
                        DumpError::Io(format!("Failed to write {}: {}", path.display(), e))
                    })?;
                    eprintln!("==> {} written to {}", name, path.display());
                }
                None => {
                    let mut stdout = io::stdout().lock();
                    stdout.write_all(&payload)?;
                    stdout.flush()?;
                }
            }
        }

        BackupCommands::Info { id } => {
            if let IdCheck::Unknown(msg) = manager.check_id(&id) {
                eprintln!("==> {}", msg);
                return Ok(());
            }
            if let Some(run) = manager.runs().into_iter().find(|r| r.id == id) {
                print!("{}", format_run_detail(&run));
            }
        }

        BackupCommands::Remove { id, force } => {
            if let IdCheck::Unknown(msg) = manager.check_id(&id) {
                eprintln!("==> {}", msg);
                return Ok(());
            }

            let files = manager.filter_files(&id);
            if !force {
                println!("==> Backup {} from {}:", id, humanize(&id)?);
                for file in &files {
                    println!("  {}", file);
                }
                println!("To delete these {} file(s), run again with --force", files.len());
                return Ok(());
            }

            for name in manager.delete_run(&id)? {
                println!("==> {} deleted.", name);
            }
        }

        BackupCommands::Prune { keep, force } => {
            let candidates = manager.prune_candidates(keep);
            if candidates.is_empty() {
                println!("No backups to prune ({} kept).", keep);
                return Ok(());
            }

            if !force {
                println!("The following backups would be deleted:");
                for run in &candidates {
                    println!("  {} ({} file(s))", run.id, run.files.len());
                }
                println!("To delete them, run again with --force");
                return Ok(());
            }

            let deleted = manager.prune_runs(keep)?;
            println!("Deleted {} file(s).", deleted.len());
        }
    }

    Ok(())
}
