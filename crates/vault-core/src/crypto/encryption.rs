//! AES-256-GCM authenticated encryption
//!
//! Stored format: `{iv_hex}:{auth_tag_hex}:{ciphertext_hex}`. The plaintext
//! may be empty, in which case the last segment is empty too.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use super::MasterKey;
use crate::error::{Result, VaultError};

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// A single encrypted value split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    pub iv: [u8; IV_LEN],
    pub auth_tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Display for EncryptedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            hex::encode(self.iv),
            hex::encode(self.auth_tag),
            hex::encode(&self.ciphertext)
        )
    }
}

impl std::str::FromStr for EncryptedData {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let (Some(iv_hex), Some(tag_hex), Some(ct_hex), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(VaultError::DecryptionError(
                "expected iv:tag:ciphertext".to_string(),
            ));
        };

        let iv = decode_fixed::<IV_LEN>(iv_hex, "IV")?;
        let auth_tag = decode_fixed::<TAG_LEN>(tag_hex, "auth tag")?;
        let ciphertext = hex::decode(ct_hex)
            .map_err(|e| VaultError::DecryptionError(format!("invalid ciphertext hex: {}", e)))?;

        Ok(Self {
            iv,
            auth_tag,
            ciphertext,
        })
    }
}

fn decode_fixed<const N: usize>(segment: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(segment)
        .map_err(|e| VaultError::DecryptionError(format!("invalid {} hex: {}", what, e)))?;

    bytes.as_slice().try_into().map_err(|_| {
        VaultError::DecryptionError(format!(
            "invalid {} length: expected {}, got {}",
            what,
            N,
            bytes.len()
        ))
    })
}

/// Encrypt `plaintext` under `key` with a fresh random IV
pub fn encrypt(plaintext: &[u8], key: &MasterKey) -> Result<EncryptedData> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::EncryptionError(e.to_string()))?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    // aes-gcm appends the tag to the ciphertext
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| VaultError::EncryptionError(e.to_string()))?;

    if sealed.len() < TAG_LEN {
        return Err(VaultError::EncryptionError(
            "ciphertext shorter than auth tag".to_string(),
        ));
    }

    let tag = sealed.split_off(sealed.len() - TAG_LEN);
    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(&tag);

    Ok(EncryptedData {
        iv,
        auth_tag,
        ciphertext: sealed,
    })
}

/// Decrypt and authenticate `encrypted` under `key`
///
/// A tag mismatch is reported as [`VaultError::AuthenticationFailed`]; GCM
/// cannot tell a wrong key apart from a modified ciphertext.
pub fn decrypt(encrypted: &EncryptedData, key: &MasterKey) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::DecryptionError(e.to_string()))?;

    let mut sealed = Vec::with_capacity(encrypted.ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&encrypted.ciphertext);
    sealed.extend_from_slice(&encrypted.auth_tag);

    cipher
        .decrypt(Nonce::from_slice(&encrypted.iv), sealed.as_slice())
        .map_err(|_| VaultError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> MasterKey {
        MasterKey::new([byte; 32])
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = key(7);
        let encrypted = encrypt(b"hunter2", &key).unwrap();
        assert_eq!(decrypt(&encrypted, &key).unwrap(), b"hunter2");
    }

    #[test]
    fn test_empty_plaintext_serializes_with_empty_segment() {
        let key = key(7);
        let encrypted = encrypt(b"", &key).unwrap();
        assert!(encrypted.ciphertext.is_empty());

        let serialized = encrypted.to_string();
        assert!(serialized.ends_with(':'));

        let parsed: EncryptedData = serialized.parse().unwrap();
        assert_eq!(parsed, encrypted);
        assert!(decrypt(&parsed, &key).unwrap().is_empty());
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let key = key(7);
        let a = encrypt(b"same", &key).unwrap();
        let b = encrypt(b"same", &key).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_wrong_key_is_authentication_failure() {
        let encrypted = encrypt(b"secret", &key(1)).unwrap();
        let result = decrypt(&encrypted, &key(2));
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_tag_is_authentication_failure() {
        let key = key(3);
        let mut encrypted = encrypt(b"secret", &key).unwrap();
        encrypted.auth_tag[0] ^= 0xFF;
        assert!(matches!(
            decrypt(&encrypted, &key),
            Err(VaultError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_malformed_strings_are_decryption_errors() {
        for bad in [
            "",
            "invalid",
            "a:b",
            "a:b:c:d",
            "zz:zz:zz",
            "00:00000000000000000000000000000000:",
        ] {
            let result = bad.parse::<EncryptedData>();
            assert!(
                matches!(result, Err(VaultError::DecryptionError(_))),
                "{:?} should be malformed",
                bad
            );
        }
    }
}
