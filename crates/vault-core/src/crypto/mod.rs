//! Cryptographic primitives for stored password values
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption in a text-safe format
//! - Argon2id stretching of the configured vault passphrase
//! - `CredentialCipher`, the service object other modules encrypt through
//! - Zeroize-on-drop key and secret wrappers

mod cipher;
mod encryption;
mod key_derivation;
mod secure_memory;

pub use cipher::CredentialCipher;
pub use encryption::{decrypt, encrypt, EncryptedData};
pub use key_derivation::{derive_key, generate_salt, KeyDerivationParams};
pub use secure_memory::{MasterKey, SecretString};
