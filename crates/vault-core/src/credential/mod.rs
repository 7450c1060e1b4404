//! Credential records and their owner-scoped CRUD

mod manager;
mod types;

pub use manager::CredentialManager;
pub use types::*;
