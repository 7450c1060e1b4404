//! Append-only log of credentials shared by email
//!
//! Sending the email is the caller's job; this only records that it happened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::credential::CredentialRecord;
use crate::error::{Result, VaultError};
use crate::storage::RecordStore;

const SHARE_PREFIX: &str = "share:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub id: Uuid,
    pub password_id: Uuid,
    pub recipient_email: String,
    pub sender_id: Uuid,
    pub sender_email: Option<String>,
    pub subject: String,
    // Snapshot of the credential at send time
    pub title: String,
    pub username: String,
    pub url: Option<String>,
    pub category: String,
    pub sent_at: DateTime<Utc>,
}

/// Email subject for sharing `title`
pub fn share_subject(title: &str) -> String {
    format!("Sharing a password with you: {}", title)
}

pub struct ShareLog {
    storage: Arc<dyn RecordStore>,
}

impl ShareLog {
    pub fn new(storage: Arc<dyn RecordStore>) -> Self {
        Self { storage }
    }

    /// Record that `credential` was sent to `recipient_email`
    pub async fn record(
        &self,
        credential: &CredentialRecord,
        recipient_email: &str,
        sender_email: Option<&str>,
    ) -> Result<ShareRecord> {
        let recipient_email = recipient_email.trim();
        if recipient_email.is_empty() {
            return Err(VaultError::InvalidInput(
                "recipient email must not be empty".to_string(),
            ));
        }

        let record = ShareRecord {
            id: Uuid::new_v4(),
            password_id: credential.id,
            recipient_email: recipient_email.to_string(),
            sender_id: credential.owner_id,
            sender_email: sender_email.map(str::to_string),
            subject: share_subject(&credential.title),
            title: credential.title.clone(),
            username: credential.username.clone(),
            url: credential.url.clone(),
            category: credential.category.clone(),
            sent_at: Utc::now(),
        };

        let key = format!("{}{}:{}", SHARE_PREFIX, record.sender_id, record.id);
        self.storage.store(&key, &serde_json::to_vec(&record)?).await?;

        info!("Recorded share of {} to {}", record.password_id, record.recipient_email);
        Ok(record)
    }

    /// Everything `sender_id` has shared, newest first
    pub async fn sent_by(&self, sender_id: Uuid) -> Result<Vec<ShareRecord>> {
        let keys = self
            .storage
            .list_keys(&format!("{}{}:", SHARE_PREFIX, sender_id))
            .await?;

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(data) = self.storage.retrieve(&key).await? {
                records.push(serde_json::from_slice::<ShareRecord>(&data)?);
            }
        }

        records.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(records)
    }
}
