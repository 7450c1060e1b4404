//! Storage trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Key/value backend holding serialised records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace the value under `key`
    async fn store(&self, key: &str, value: &[u8]) -> Result<()>;

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove `key`; returns whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`, in ascending order
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    fn backend_name(&self) -> &'static str;
}
