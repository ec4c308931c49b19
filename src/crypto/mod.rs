//! Optional at-rest encryption of backup artifacts
//!
//! Artifacts are encrypted to recipient public keys held in an existing
//! OpenPGP keyring and decrypted with the private key's passphrase. Key
//! generation and distribution happen outside this crate.

pub mod gpg;
pub mod provider;
pub mod secure_memory;

pub use gpg::GpgEngine;
pub use provider::{provider_from_settings, EncryptionProvider, KeyBasedEncryption, NoEncryption};
pub use secure_memory::{SecureBytes, SecureString};
