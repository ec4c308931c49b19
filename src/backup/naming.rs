//! Canonical artifact file names
//!
//! `{prefix}-{id}-{logical_name}.gz`, with `.gpg` appended for encrypted
//! artifacts.

/// Suffix of every compressed artifact
pub const COMPRESSED_SUFFIX: &str = ".gz";

/// Suffix appended to encrypted artifacts
pub const ENCRYPTED_SUFFIX: &str = ".gpg";

/// Default prefix for artifact names
pub const DEFAULT_PREFIX: &str = "db-bkp";

/// Build the canonical artifact name for a run id and logical name
pub fn build_name(prefix: &str, id: &str, logical_name: &str, encrypted: bool) -> String {
    let mut name = format!("{}-{}-{}{}", prefix, id, logical_name, COMPRESSED_SUFFIX);
    if encrypted {
        name.push_str(ENCRYPTED_SUFFIX);
    }
    name
}

/// Check if an artifact name carries the encryption marker
pub fn is_encrypted_name(name: &str) -> bool {
    name.ends_with(ENCRYPTED_SUFFIX)
}
