//! OpenPGP encryption through the `gpg` binary
//!
//! Payloads are encrypted to one or more recipient keys already present in
//! the keyring and decrypted with the passphrase of the matching private key.
//! Both directions go through files in a [`ScratchDir`], which is wiped on
//! every exit path.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use crate::error::{DumpError, DumpResult};
use crate::storage::scratch::ScratchDir;

use super::secure_memory::{SecureBytes, SecureString};

/// Default name of the OpenPGP binary
pub const DEFAULT_GPG_BINARY: &str = "gpg";

const PLAIN_FILE: &str = "payload";
const CIPHER_FILE: &str = "payload.gpg";

/// Runs encryption and decryption through an external `gpg`
#[derive(Debug, Clone)]
pub struct GpgEngine {
    binary: String,
    home: Option<PathBuf>,
}

impl Default for GpgEngine {
    fn default() -> Self {
        Self::new(DEFAULT_GPG_BINARY, None)
    }
}

impl GpgEngine {
    /// Create an engine using the given binary and optional `--homedir`
    pub fn new(binary: impl Into<String>, home: Option<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            home,
        }
    }

    /// The binary this engine invokes
    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["--batch", "--yes", "--no-tty", "--quiet"]);
        if let Some(home) = &self.home {
            cmd.arg("--homedir").arg(home);
        }
        cmd
    }

    /// Encrypt `plain` to every recipient key (binary, non-armored output)
    pub fn encrypt(&self, plain: &[u8], recipients: &[String]) -> DumpResult<Vec<u8>> {
        if recipients.is_empty() {
            return Err(DumpError::Encryption(
                "No recipient keys configured".to_string(),
            ));
        }

        let scratch = ScratchDir::new()?;
        let input = scratch.write(PLAIN_FILE, plain)?;
        let output = scratch.file(CIPHER_FILE);

        let mut cmd = self.command();
        cmd.args(["--trust-model", "always", "--output"])
            .arg(&output)
            .arg("--encrypt");
        for recipient in recipients {
            cmd.arg("--recipient").arg(recipient);
        }
        cmd.arg(&input);

        let result = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                DumpError::Encryption(format!("Failed to run {}: {}", self.binary, e))
            })?;

        if !result.status.success() {
            return Err(DumpError::Encryption(format!(
                "Unable to encrypt for {}: {}",
                recipients.join(", "),
                stderr_summary(&result)
            )));
        }

        scratch.read(CIPHER_FILE)
    }

    /// Decrypt `cipher` using the passphrase of the recipient's private key
    ///
    /// Any failure reported by gpg (wrong passphrase, missing private key,
    /// corrupt input) is a [`DumpError::Decryption`]; no partial output is
    /// ever returned.
    pub fn decrypt(&self, cipher: &[u8], passphrase: &SecureString) -> DumpResult<SecureBytes> {
        let scratch = ScratchDir::new()?;
        let input = scratch.write(CIPHER_FILE, cipher)?;
        let output = scratch.file(PLAIN_FILE);

        let mut child = self
            .command()
            .args(["--pinentry-mode", "loopback", "--passphrase-fd", "0", "--output"])
            .arg(&output)
            .arg("--decrypt")
            .arg(&input)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DumpError::Decryption(format!("Failed to run {}: {}", self.binary, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // gpg may exit before reading; the exit status tells us what happened
            let _ = stdin.write_all(passphrase.as_bytes());
            let _ = stdin.write_all(b"\n");
        }

        let result = child.wait_with_output().map_err(|e| {
            DumpError::Decryption(format!("Failed to wait for {}: {}", self.binary, e))
        })?;

        if !result.status.success() {
            return Err(DumpError::Decryption(format!(
                "Unable to decrypt file: {}",
                stderr_summary(&result)
            )));
        }

        let plain = scratch
            .read(PLAIN_FILE)
            .map_err(|e| DumpError::Decryption(format!("No decrypted output: {}", e)))?;
        Ok(SecureBytes::new(plain))
    }
}

fn stderr_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let summary = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    if summary.is_empty() {
        format!("gpg exited with {}", output.status)
    } else {
        summary
    }
}
