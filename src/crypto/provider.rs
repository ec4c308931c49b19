//! Encryption providers
//!
//! A [`BackupManager`](crate::backup::BackupManager) holds exactly one
//! provider, chosen when it is constructed: [`NoEncryption`] or
//! [`KeyBasedEncryption`].

use crate::config::settings::EncryptionSettings;
use crate::error::{DumpError, DumpResult};

use super::gpg::GpgEngine;
use super::secure_memory::{SecureBytes, SecureString};

/// Encrypts artifacts before storage and decrypts them after retrieval
pub trait EncryptionProvider {
    /// Whether new artifacts are encrypted (and carry the `.gpg` suffix)
    fn is_active(&self) -> bool;

    /// Encrypt compressed bytes
    fn encrypt(&self, plain: &[u8]) -> DumpResult<Vec<u8>>;

    /// Fail early if the named encrypted artifact could not be decrypted
    fn ensure_can_decrypt(&self, name: &str) -> DumpResult<()>;

    /// Decrypt the bytes of the named artifact
    fn decrypt(&self, name: &str, cipher: &[u8]) -> DumpResult<SecureBytes>;
}

/// Provider used when encryption is not configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEncryption;

impl EncryptionProvider for NoEncryption {
    fn is_active(&self) -> bool {
        false
    }

    fn encrypt(&self, plain: &[u8]) -> DumpResult<Vec<u8>> {
        Ok(plain.to_vec())
    }

    fn ensure_can_decrypt(&self, name: &str) -> DumpResult<()> {
        Err(DumpError::EncryptionNotConfigured(name.to_string()))
    }

    fn decrypt(&self, name: &str, _cipher: &[u8]) -> DumpResult<SecureBytes> {
        Err(DumpError::EncryptionNotConfigured(name.to_string()))
    }
}

/// Public-key encryption to a fixed set of recipient keys
#[derive(Debug)]
pub struct KeyBasedEncryption {
    engine: GpgEngine,
    recipients: Vec<String>,
    passphrase: Option<SecureString>,
}

impl KeyBasedEncryption {
    /// Create a provider; fails if no recipient key is given
    pub fn new(
        engine: GpgEngine,
        recipients: Vec<String>,
        passphrase: Option<SecureString>,
    ) -> DumpResult<Self> {
        let recipients: Vec<String> = recipients
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        if recipients.is_empty() {
            return Err(DumpError::Encryption(
                "Encryption is enabled but no recipient keys are configured".to_string(),
            ));
        }

        Ok(Self {
            engine,
            recipients,
            passphrase: passphrase.filter(|p| !p.is_empty()),
        })
    }

    /// Recipient key identifiers
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Whether a passphrase is available for decryption
    pub fn has_passphrase(&self) -> bool {
        self.passphrase.is_some()
    }
}

impl EncryptionProvider for KeyBasedEncryption {
    fn is_active(&self) -> bool {
        true
    }

    fn encrypt(&self, plain: &[u8]) -> DumpResult<Vec<u8>> {
        self.engine.encrypt(plain, &self.recipients)
    }

    fn ensure_can_decrypt(&self, _name: &str) -> DumpResult<()> {
        match self.passphrase {
            Some(_) => Ok(()),
            None => Err(DumpError::MissingPassphrase),
        }
    }

    fn decrypt(&self, _name: &str, cipher: &[u8]) -> DumpResult<SecureBytes> {
        let passphrase = self.passphrase.as_ref().ok_or(DumpError::MissingPassphrase)?;
        self.engine.decrypt(cipher, passphrase)
    }
}

/// Build the provider described by the encryption settings
pub fn provider_from_settings(
    settings: &EncryptionSettings,
) -> DumpResult<Box<dyn EncryptionProvider>> {
    if !settings.enabled {
        return Ok(Box::new(NoEncryption));
    }

    let engine = GpgEngine::new(settings.gpg_binary.clone(), settings.gpg_home.clone());
    let provider = KeyBasedEncryption::new(
        engine,
        settings.recipient_keys.clone(),
        settings.passphrase.as_deref().map(SecureString::from),
    )?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_encryption_passthrough() {
        let provider = NoEncryption;
        assert!(!provider.is_active());
        assert_eq!(provider.encrypt(b"abc").unwrap(), b"abc");
    }

    #[test]
    fn test_no_encryption_refuses_encrypted_artifacts() {
        let err = NoEncryption.decrypt("a.gz.gpg", b"xyz").unwrap_err();
        assert!(matches!(err, DumpError::EncryptionNotConfigured(_)));
        assert!(!err.is_decryption());
    }

    #[test]
    fn test_key_based_requires_recipients() {
        let err = KeyBasedEncryption::new(GpgEngine::default(), vec![" ".into()], None)
            .unwrap_err();
        assert!(matches!(err, DumpError::Encryption(_)));
    }

    #[test]
    fn test_missing_passphrase_before_any_io() {
        // the binary does not exist, so reaching it would yield a Decryption error
        let engine = GpgEngine::new("/nonexistent/gpg-binary", None);
        let provider =
            KeyBasedEncryption::new(engine, vec!["ops@example.com".into()], None).unwrap();
        assert!(!provider.has_passphrase());

        let err = provider.decrypt("a.gz.gpg", b"cipher").unwrap_err();
        assert!(matches!(err, DumpError::MissingPassphrase));
    }

    #[test]
    fn test_empty_passphrase_counts_as_missing() {
        let provider = KeyBasedEncryption::new(
            GpgEngine::default(),
            vec!["ops@example.com".into()],
            Some(SecureString::new("")),
        )
        .unwrap();
        assert!(!provider.has_passphrase());
    }

    #[test]
    fn test_provider_from_settings() {
        let disabled = EncryptionSettings::default();
        assert!(!provider_from_settings(&disabled).unwrap().is_active());

        let enabled = EncryptionSettings {
            enabled: true,
            recipient_keys: vec!["ops@example.com".into()],
            ..Default::default()
        };
        assert!(provider_from_settings(&enabled).unwrap().is_active());

        let no_keys = EncryptionSettings {
            enabled: true,
            ..Default::default()
        };
        assert!(provider_from_settings(&no_keys).is_err());
    }
}
