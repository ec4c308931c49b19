//! Gzip wrapping of artifact payloads
//!
//! Each artifact holds exactly one gzip member.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{DumpError, DumpResult};

/// Compress a payload into a single gzip stream
pub fn compress(bytes: &[u8]) -> DumpResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| DumpError::Io(format!("Failed to compress payload: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| DumpError::Io(format!("Failed to finish gzip stream: {}", e)))
}

/// Decompress a gzip stream produced by [`compress`]
pub fn decompress(bytes: &[u8]) -> DumpResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| DumpError::CorruptData(format!("Failed to decompress backup: {}", e)))?;
    Ok(out)
}
