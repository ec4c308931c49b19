use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dumpkeeper::cli::{prompt_passphrase, run_backup_command, BackupCommands};
use dumpkeeper::config::{paths::DumpPaths, settings::BackupConfig};
use dumpkeeper::BackupManager;

#[derive(Parser)]
#[command(
    name = "dumpkeeper",
    author = "Kaylee Beyene",
    version,
    about = "Timestamped, compressed and optionally encrypted backups on local disk or FTP"
)]
struct Cli {
    /// Configuration file (defaults to config.json in the data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Passphrase for encrypted backups
    #[arg(long, env = "DUMPKEEPER_PASSPHRASE", hide_env_values = true, global = true)]
    passphrase: Option<String>,

    /// Prompt for the passphrase of encrypted backups
    #[arg(long, global = true)]
    ask_passphrase: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Backup(BackupCommands),

    /// Show the effective configuration
    Config,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = DumpPaths::new()?;
    let mut config = match &cli.config {
        Some(path) => BackupConfig::load_from(path)?,
        None => BackupConfig::load_or_default(&paths)?,
    };
    if config.local_base_dir.is_none() {
        config.local_base_dir = Some(paths.base_dir().clone());
    }

    if let Some(passphrase) = cli.passphrase {
        config.encryption.passphrase = Some(passphrase);
    } else if cli.ask_passphrase {
        config.encryption.passphrase = Some(prompt_passphrase("Passphrase: ")?);
    }

    match cli.command {
        Some(Commands::Backup(cmd)) => {
            let mut manager = BackupManager::new(&config)?;
            run_backup_command(&mut manager, cmd)?;
        }
        Some(Commands::Config) => {
            println!("dumpkeeper Configuration");
            println!("========================");
            let config_file = cli.config.unwrap_or_else(|| paths.settings_file());
            println!("Config file:      {}", config_file.display());
            println!("Backup directory: {}", config.backup_dir()?.display());
            println!("File prefix:      {}", config.file_prefix);
            println!(
                "FTP:              {}",
                config
                    .ftp
                    .target()
                    .map(|t| format!("ftp://{}", t.masked_address()))
                    .unwrap_or_else(|| "not configured".to_string())
            );
            println!("Encryption:       {}", config.encryption.enabled);
            if config.encryption.enabled {
                println!(
                    "Recipients:       {}",
                    config.encryption.recipient_keys.join(", ")
                );
            }
        }
        None => {
            println!("dumpkeeper - backups on local disk or FTP");
            println!();
            println!("Run 'dumpkeeper --help' for usage information.");
            println!("Run 'dumpkeeper history' to list existing backups.");
        }
    }

    Ok(())
}
