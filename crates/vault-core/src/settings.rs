//! Vault settings
//!
//! Non-sensitive configuration in `settings.json` next to the data. The
//! vault key is never stored here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::crypto::KeyDerivationParams;
use crate::error::Result;
use crate::password::GeneratorOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub version: u32,
    /// Number of history entries shown
    pub history_limit: usize,
    /// Number of activity entries shown
    pub activity_limit: usize,
    /// Days after the last update before a credential counts as expired
    pub expiry_days: u32,
    /// Argon2id cost for stretching the key of a newly created vault.
    /// Existing vaults keep the parameters they were created with.
    pub kdf: KeyDerivationParams,
    /// Generator options used when none are given
    pub generator: GeneratorOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            history_limit: 10,
            activity_limit: 20,
            expiry_days: 90,
            kdf: KeyDerivationParams::default(),
            generator: GeneratorOptions::default(),
        }
    }
}

pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `storage_dir`, falling back to defaults
    pub fn new(storage_dir: &Path) -> Self {
        let settings_file = storage_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file).unwrap_or_else(|e| {
            warn!("Ignoring unreadable settings file {:?}: {}", settings_file, e);
            Settings::default()
        });

        Self {
            settings_file,
            settings,
        }
    }

    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Restore defaults and remove the settings file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = Settings::default();
        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_settings_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path());

        let settings = manager.get();
        assert_eq!(settings.history_limit, 10);
        assert_eq!(settings.expiry_days, 90);
        assert_eq!(settings.generator.length, 16);
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut manager = SettingsManager::new(temp_dir.path());
            manager.get_mut().expiry_days = 30;
            manager.get_mut().generator.symbols = false;
            manager.save().await.unwrap();
        }

        let manager = SettingsManager::new(temp_dir.path());
        assert_eq!(manager.get().expiry_days, 30);
        assert!(!manager.get().generator.symbols);
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{"historyLimit": 3, "generator": {"length": 24}}"#,
        )
        .unwrap();

        let manager = SettingsManager::new(temp_dir.path());
        assert_eq!(manager.get().history_limit, 3);
        assert_eq!(manager.get().generator.length, 24);
        assert!(manager.get().generator.uppercase);
        assert_eq!(manager.get().kdf, KeyDerivationParams::default());
    }

    #[tokio::test]
    async fn test_reset() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp_dir.path());
        manager.get_mut().history_limit = 1;
        manager.save().await.unwrap();

        manager.reset().await.unwrap();
        assert_eq!(manager.get(), &Settings::default());
        assert!(!temp_dir.path().join("settings.json").exists());
    }
}
