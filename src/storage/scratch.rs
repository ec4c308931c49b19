//! Scoped scratch space for intermediate files
//!
//! Encryption and FTP downloads pass through temporary files. A
//! [`ScratchDir`] owns a private temporary directory; on drop every regular
//! file inside it is overwritten with zeros before the directory is removed,
//! so no plaintext or ciphertext is left behind on any exit path.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{DumpError, DumpResult};

const WIPE_CHUNK: usize = 8192;

/// A private temporary directory that is wiped and removed on drop
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Allocate a new scratch directory under the system temp dir
    pub fn new() -> DumpResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("dumpkeeper-")
            .tempdir()
            .map_err(|e| DumpError::Io(format!("Failed to create scratch directory: {}", e)))?;
        Ok(Self { dir })
    }

    /// Root of the scratch directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the scratch directory
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write bytes to a scratch file and return its path
    pub fn write(&self, name: &str, bytes: &[u8]) -> DumpResult<PathBuf> {
        let path = self.file(name);
        fs::write(&path, bytes)
            .map_err(|e| DumpError::Io(format!("Failed to write scratch file: {}", e)))?;
        Ok(path)
    }

    /// Read a scratch file back
    pub fn read(&self, name: &str) -> DumpResult<Vec<u8>> {
        fs::read(self.file(name))
            .map_err(|e| DumpError::Io(format!("Failed to read scratch file: {}", e)))
    }

    fn wipe(&self) -> io::Result<()> {
        for entry in fs::read_dir(self.dir.path())? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                wipe_file(&entry.path())?;
            }
        }
        Ok(())
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = self.wipe() {
            tracing::debug!(error = %e, "failed to wipe scratch files");
        }
        // TempDir removes the directory when it drops after this
    }
}

fn wipe_file(path: &Path) -> io::Result<()> {
    let len = fs::metadata(path)?.len();
    let mut file = OpenOptions::new().write(true).open(path)?;
    let zeros = [0u8; WIPE_CHUNK];
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(WIPE_CHUNK as u64) as usize;
        file.write_all(&zeros[..n])?;
        remaining -= n as u64;
    }
    file.sync_all()
}
