//! Credential record definitions

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::SecretString;

/// Category used when none is given
pub const DEFAULT_CATEGORY: &str = "Personal";

/// Category filter value that matches every record
pub const ALL_CATEGORIES: &str = "All";

/// A stored credential. `encrypted_password` is always cipher output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub username: String,
    pub encrypted_password: String,
    pub url: Option<String>,
    pub category: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Whether the password has gone unchanged for more than `expiry_days`
    pub fn is_expired(&self, now: DateTime<Utc>, expiry_days: u32) -> bool {
        now - self.updated_at > Duration::days(i64::from(expiry_days))
    }

    fn matches(&self, filter: &SearchFilter) -> bool {
        let category_ok = match filter.category.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(category) => self.category == category,
        };

        let query_ok = match filter.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                self.title.to_lowercase().contains(&query)
                    || self.username.to_lowercase().contains(&query)
            }
        };

        category_ok && query_ok
    }
}

/// Input for a new credential
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub title: String,
    pub username: String,
    pub password: SecretString,
    pub url: Option<String>,
    /// Falls back to [`DEFAULT_CATEGORY`] when `None` or blank
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Partial edit of a credential; `None` leaves a field unchanged and an
/// empty string clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct CredentialUpdate {
    pub title: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl CredentialUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.url.is_none()
            && self.category.is_none()
            && self.notes.is_none()
    }
}

/// Dashboard-style filter over an owner's credentials
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Exact category, or `"All"`
    pub category: Option<String>,
    /// Case-insensitive substring of title or username
    pub query: Option<String>,
}

impl SearchFilter {
    pub fn apply(&self, records: Vec<CredentialRecord>) -> Vec<CredentialRecord> {
        records.into_iter().filter(|r| r.matches(self)).collect()
    }
}

/// Trim an optional text field, mapping blank to `None`
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
