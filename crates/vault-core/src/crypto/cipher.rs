//! The credential cipher used for every stored password value

use super::{decrypt, derive_key, encrypt, EncryptedData, KeyDerivationParams, MasterKey};
use crate::error::{Result, VaultError};

/// Encrypts and decrypts password fields under one configured key.
///
/// The key is supplied at construction; there is no process-wide key.
#[derive(Clone, Debug)]
pub struct CredentialCipher {
    key: MasterKey,
}

impl CredentialCipher {
    pub fn new(key: MasterKey) -> Self {
        Self { key }
    }

    /// Stretch a configured passphrase with the vault salt
    pub fn from_passphrase(
        passphrase: &str,
        salt: &str,
        params: &KeyDerivationParams,
    ) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(VaultError::ConfigurationError(
                "vault key must not be empty".to_string(),
            ));
        }
        Ok(Self::new(derive_key(passphrase, salt, params)?))
    }

    /// Encrypt a plaintext into its stored text form
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        Ok(encrypt(plaintext.as_bytes(), &self.key)?.to_string())
    }

    /// Decrypt a stored value.
    ///
    /// Returns [`VaultError::DecryptionError`] when `ciphertext` is not in the
    /// stored format and [`VaultError::AuthenticationFailed`] when it is but was
    /// not produced under this key.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let encrypted: EncryptedData = ciphertext.parse()?;
        let plaintext = decrypt(&encrypted, &self.key)?;
        String::from_utf8(plaintext)
            .map_err(|e| VaultError::DecryptionError(format!("invalid UTF-8: {}", e)))
    }
}
