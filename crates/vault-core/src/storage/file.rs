//! JSON file storage backend
//!
//! Keeps every entry in memory and rewrites `vault.json` in the data
//! directory after each change.

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

use super::RecordStore;
use crate::error::{Result, VaultError};

const FILE_VERSION: u32 = 1;

/// File format for persistent storage
#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct StorageFileRef<'a> {
    version: u32,
    entries: &'a BTreeMap<String, String>,
}

pub struct JsonFileStorage {
    storage_dir: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStorage {
    /// Open the storage in `storage_dir`, creating it if needed and loading
    /// any existing entries
    pub async fn open(storage_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&storage_dir).await?;

        let storage = Self {
            storage_dir,
            entries: RwLock::new(BTreeMap::new()),
        };
        storage.load().await?;

        debug!("File storage opened at {:?}", storage.storage_dir);
        Ok(storage)
    }

    /// The default per-user data directory
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "arkvault", "arkvault")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                VaultError::StorageError("Could not determine data directory".to_string())
            })
    }

    fn storage_file_path(&self) -> PathBuf {
        self.storage_dir.join("vault.json")
    }

    async fn load(&self) -> Result<()> {
        let path = self.storage_file_path();
        if !path.exists() {
            debug!("No existing storage file found");
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&path).await?;
        let file: StorageFile = serde_json::from_str(&contents)?;
        if file.version != FILE_VERSION {
            return Err(VaultError::StorageError(format!(
                "Unsupported storage file version {}",
                file.version
            )));
        }

        let mut entries = self.entries.write().await;
        *entries = file.entries;
        debug!("Loaded {} entries from storage", entries.len());
        Ok(())
    }

    /// Write `entries` through a temp file and rename
    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let file = StorageFileRef {
            version: FILE_VERSION,
            entries,
        };
        let contents = serde_json::to_string_pretty(&file)?;

        let path = self.storage_file_path();
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!("Saved {} entries to storage", entries.len());
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStorage {
    async fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        let value = std::str::from_utf8(value).map_err(|e| {
            VaultError::StorageError(format!("Value for {} is not UTF-8: {}", key, e))
        })?;

        // Changes become visible only once they are on disk. The write lock
        // is held across the save so concurrent writers persist in order.
        let mut entries = self.entries.write().await;
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.persist(&updated).await?;
        *entries = updated;

        debug!("Stored key: {}", key);
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(|v| v.as_bytes().to_vec()))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) {
            return Ok(false);
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.persist(&updated).await?;
        *entries = updated;

        debug!("Deleted key: {}", key);
        Ok(true)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "JSON File Storage"
    }
}
