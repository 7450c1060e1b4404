//! Error types for vault-core

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Invalid vault key - the configured key does not match this vault")]
    InvalidKey,

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    /// The ciphertext could not be parsed or its plaintext is not valid UTF-8
    #[error("Decryption failed: {0}")]
    DecryptionError(String),

    /// The ciphertext was well formed but failed GCM authentication
    #[error("Authentication failed - wrong key or tampered ciphertext")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
