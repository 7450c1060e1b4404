//! # vault-core
//!
//! Core functionality for the ArkVault password manager:
//! - `CredentialCipher`: AES-256-GCM protection of stored password values
//! - Password strength scoring and random generation
//! - Owner-scoped credential CRUD, password history, share and activity logs
//! - JSON file and in-memory storage backends

pub mod activity;
pub mod credential;
pub mod crypto;
pub mod error;
pub mod history;
pub mod password;
pub mod settings;
pub mod share;
pub mod storage;
mod vault;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog};
pub use credential::{
    CredentialManager, CredentialRecord, CredentialUpdate, NewCredential, SearchFilter,
};
pub use crypto::{CredentialCipher, KeyDerivationParams, MasterKey, SecretString};
pub use error::{Result, VaultError};
pub use history::{HistoryEntry, PasswordHistory};
pub use password::{generate, score, GeneratorOptions, Preset, StrengthLabel};
pub use settings::{Settings, SettingsManager};
pub use share::{ShareLog, ShareRecord};
pub use storage::{JsonFileStorage, MemoryStorage, RecordStore};
pub use vault::{AuditReport, GeneratedPassword, StrengthCounts, Vault, VaultKey};
