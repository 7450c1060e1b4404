//! Log of generated passwords
//!
//! Entries are immutable once written. The password is stored as cipher
//! output, the same as a credential's.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::crypto::{CredentialCipher, SecretString};
use crate::error::Result;
use crate::password::{score, StrengthLabel};
use crate::storage::RecordStore;

const HISTORY_PREFIX: &str = "history:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub encrypted_password: String,
    pub strength: u8,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn label(&self) -> StrengthLabel {
        StrengthLabel::from_score(self.strength)
    }
}

pub struct PasswordHistory {
    storage: Arc<dyn RecordStore>,
    cipher: Arc<CredentialCipher>,
}

impl PasswordHistory {
    pub fn new(storage: Arc<dyn RecordStore>, cipher: Arc<CredentialCipher>) -> Self {
        Self { storage, cipher }
    }

    /// Score and record a generated password
    pub async fn record(&self, owner_id: Uuid, password: &str) -> Result<HistoryEntry> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            owner_id,
            encrypted_password: self.cipher.encrypt(password)?,
            strength: score(password),
            created_at: Utc::now(),
        };

        let key = format!("{}{}:{}", HISTORY_PREFIX, owner_id, entry.id);
        self.storage.store(&key, &serde_json::to_vec(&entry)?).await?;

        debug!("Recorded history entry {} (strength {})", entry.id, entry.strength);
        Ok(entry)
    }

    /// The owner's most recent entries, newest first
    pub async fn recent(&self, owner_id: Uuid, limit: usize) -> Result<Vec<HistoryEntry>> {
        let keys = self
            .storage
            .list_keys(&format!("{}{}:", HISTORY_PREFIX, owner_id))
            .await?;

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(data) = self.storage.retrieve(&key).await? {
                entries.push(serde_json::from_slice::<HistoryEntry>(&data)?);
            }
        }

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }

    pub fn reveal(&self, entry: &HistoryEntry) -> Result<SecretString> {
        self.cipher
            .decrypt(&entry.encrypted_password)
            .map(SecretString::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::MasterKey;
    use crate::storage::MemoryStorage;

    fn history() -> PasswordHistory {
        PasswordHistory::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(CredentialCipher::new(MasterKey::new([3u8; 32]))),
        )
    }

    #[tokio::test]
    async fn test_record_scores_and_encrypts() {
        let history = history();
        let owner = Uuid::new_v4();

        let entry = history.record(owner, "Abcdefgh12!@").await.unwrap();
        assert_eq!(entry.strength, 90);
        assert_eq!(entry.label(), StrengthLabel::Excellent);
        assert_ne!(entry.encrypted_password, "Abcdefgh12!@");
        assert_eq!(history.reveal(&entry).unwrap().expose(), "Abcdefgh12!@");
    }

    #[tokio::test]
    async fn test_recent_is_limited_newest_first_and_scoped() {
        let history = history();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        for i in 0..5 {
            history.record(owner, &format!("password-{}", i)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        history.record(other, "not-yours").await.unwrap();

        let recent = history.recent(owner, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent.iter().all(|e| e.owner_id == owner));
        assert_eq!(history.reveal(&recent[0]).unwrap().expose(), "password-4");
        assert!(recent[0].created_at >= recent[1].created_at);
    }
}
