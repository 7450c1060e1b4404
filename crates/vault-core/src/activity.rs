//! Append-only feed of user actions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::storage::RecordStore;

const ACTIVITY_PREFIX: &str = "activity:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PasswordCreated,
    PasswordUpdated,
    PasswordDeleted,
    Generated,
    Shared,
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::PasswordCreated => "password_created",
            Self::PasswordUpdated => "password_updated",
            Self::PasswordDeleted => "password_deleted",
            Self::Generated => "generated",
            Self::Shared => "shared",
        };
        f.write_str(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: ActivityKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

pub struct ActivityLog {
    storage: Arc<dyn RecordStore>,
}

impl ActivityLog {
    pub fn new(storage: Arc<dyn RecordStore>) -> Self {
        Self { storage }
    }

    pub async fn append(
        &self,
        owner_id: Uuid,
        kind: ActivityKind,
        title: impl Into<String>,
    ) -> Result<ActivityEntry> {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            title: title.into(),
            created_at: Utc::now(),
        };

        let key = format!("{}{}:{}", ACTIVITY_PREFIX, owner_id, entry.id);
        self.storage.store(&key, &serde_json::to_vec(&entry)?).await?;
        Ok(entry)
    }

    /// Newest first
    pub async fn recent(&self, owner_id: Uuid, limit: usize) -> Result<Vec<ActivityEntry>> {
        let keys = self
            .storage
            .list_keys(&format!("{}{}:", ACTIVITY_PREFIX, owner_id))
            .await?;

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(data) = self.storage.retrieve(&key).await? {
                entries.push(serde_json::from_slice::<ActivityEntry>(&data)?);
            }
        }

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }
}
