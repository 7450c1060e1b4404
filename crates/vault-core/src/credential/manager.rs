//! Credential manager for owner-scoped CRUD operations

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::types::{non_blank, CredentialRecord, CredentialUpdate, NewCredential, DEFAULT_CATEGORY};
use crate::crypto::{CredentialCipher, SecretString};
use crate::error::{Result, VaultError};
use crate::storage::RecordStore;

/// Storage key prefix for credentials
const CREDENTIAL_PREFIX: &str = "credential:";

/// Credential manager
pub struct CredentialManager {
    storage: Arc<dyn RecordStore>,
    cipher: Arc<CredentialCipher>,
}

fn owner_prefix(owner_id: Uuid) -> String {
    format!("{}{}:", CREDENTIAL_PREFIX, owner_id)
}

fn storage_key(owner_id: Uuid, id: Uuid) -> String {
    format!("{}{}:{}", CREDENTIAL_PREFIX, owner_id, id)
}

impl CredentialManager {
    pub fn new(storage: Arc<dyn RecordStore>, cipher: Arc<CredentialCipher>) -> Self {
        Self { storage, cipher }
    }

    /// Encrypt the password and save a new record owned by `owner_id`
    pub async fn add(&self, owner_id: Uuid, new: NewCredential) -> Result<CredentialRecord> {
        let now = Utc::now();
        let record = CredentialRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: new.title,
            username: new.username,
            encrypted_password: self.cipher.encrypt(new.password.expose())?,
            url: non_blank(new.url),
            category: non_blank(new.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            notes: non_blank(new.notes),
            created_at: now,
            updated_at: now,
        };

        self.save(&record).await?;

        info!("Added credential: {} ({})", record.title, record.id);
        Ok(record)
    }

    /// Get a record's metadata. Records of other owners are not visible.
    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<CredentialRecord>> {
        match self.storage.retrieve(&storage_key(owner_id, id)).await? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    async fn require(&self, owner_id: Uuid, id: Uuid) -> Result<CredentialRecord> {
        self.get(owner_id, id)
            .await?
            .ok_or_else(|| VaultError::CredentialNotFound(id.to_string()))
    }

    /// Decrypt a record's password
    pub async fn reveal(&self, owner_id: Uuid, id: Uuid) -> Result<SecretString> {
        let record = self.require(owner_id, id).await?;
        let plaintext = self.decrypt_record(&record)?;

        debug!("Revealed credential: {}", id);
        Ok(plaintext)
    }

    /// Decrypt the password of a record already loaded
    pub fn decrypt_record(&self, record: &CredentialRecord) -> Result<SecretString> {
        self.cipher
            .decrypt(&record.encrypted_password)
            .map(SecretString::new)
    }

    /// All of an owner's credentials, most recently updated first
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<CredentialRecord>> {
        let keys = self.storage.list_keys(&owner_prefix(owner_id)).await?;
        let mut records = Vec::with_capacity(keys.len());

        for key in keys {
            if let Some(data) = self.storage.retrieve(&key).await? {
                records.push(serde_json::from_slice::<CredentialRecord>(&data)?);
            }
        }

        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    /// Apply an edit. A new password is re-encrypted; `updated_at` is
    /// refreshed whenever anything changes.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: CredentialUpdate,
    ) -> Result<CredentialRecord> {
        let mut record = self.require(owner_id, id).await?;
        if update.is_empty() {
            return Ok(record);
        }

        if let Some(title) = update.title {
            record.title = title;
        }
        if let Some(username) = update.username {
            record.username = username;
        }
        if let Some(password) = update.password {
            record.encrypted_password = self.cipher.encrypt(password.expose())?;
        }
        if let Some(url) = update.url {
            record.url = non_blank(Some(url));
        }
        if let Some(category) = update.category {
            record.category =
                non_blank(Some(category)).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        }
        if let Some(notes) = update.notes {
            record.notes = non_blank(Some(notes));
        }
        record.updated_at = Utc::now();

        self.save(&record).await?;

        info!("Updated credential: {}", id);
        Ok(record)
    }

    /// Delete a record, returning what was removed
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<CredentialRecord> {
        let record = self.require(owner_id, id).await?;
        self.storage.delete(&storage_key(owner_id, id)).await?;

        info!("Deleted credential: {}", id);
        Ok(record)
    }

    async fn save(&self, record: &CredentialRecord) -> Result<()> {
        let data = serde_json::to_vec(record)?;
        self.storage
            .store(&storage_key(record.owner_id, record.id), &data)
            .await
    }
}
