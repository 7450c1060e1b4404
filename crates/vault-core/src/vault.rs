//! Main vault orchestration

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::activity::{ActivityEntry, ActivityKind, ActivityLog};
use crate::credential::{
    CredentialManager, CredentialRecord, CredentialUpdate, NewCredential, SearchFilter,
};
use crate::crypto::{
    generate_salt, CredentialCipher, KeyDerivationParams, MasterKey, SecretString,
};
use crate::error::{Result, VaultError};
use crate::history::{HistoryEntry, PasswordHistory};
use crate::password::{self, GeneratorOptions, StrengthLabel};
use crate::settings::{Settings, SettingsManager};
use crate::share::{ShareLog, ShareRecord};
use crate::storage::{JsonFileStorage, RecordStore};

const SALT_KEY: &str = "meta:salt";
const KDF_KEY: &str = "meta:kdf";
const VERIFICATION_KEY: &str = "meta:verification";
const VERIFICATION_PLAINTEXT: &str = "arkvault-verification";

/// The configured vault key
#[derive(Debug, Clone)]
pub enum VaultKey {
    /// Stretched with Argon2id and the vault salt
    Passphrase(SecretString),
    /// Used as-is
    Raw(MasterKey),
}

impl VaultKey {
    pub fn passphrase(value: impl Into<String>) -> Self {
        Self::Passphrase(SecretString::new(value.into()))
    }
}

/// A freshly generated password and its history entry
#[derive(Debug, Clone)]
pub struct GeneratedPassword {
    pub password: SecretString,
    pub strength: u8,
    pub label: StrengthLabel,
    pub entry: HistoryEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StrengthCounts {
    pub weak: usize,
    pub medium: usize,
    pub strong: usize,
    pub excellent: usize,
}

impl StrengthCounts {
    fn add(&mut self, label: StrengthLabel) {
        match label {
            StrengthLabel::Weak => self.weak += 1,
            StrengthLabel::Medium => self.medium += 1,
            StrengthLabel::Strong => self.strong += 1,
            StrengthLabel::Excellent => self.excellent += 1,
        }
    }
}

/// Security summary of an owner's credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub total: usize,
    pub strength: StrengthCounts,
    /// Credentials scoring below Medium
    pub weak: Vec<Uuid>,
    /// Credentials not updated within the expiry window
    pub expired: Vec<Uuid>,
}

pub struct Vault {
    storage: Arc<dyn RecordStore>,
    cipher: Arc<CredentialCipher>,
    pub credentials: CredentialManager,
    pub history: PasswordHistory,
    pub shares: ShareLog,
    pub activity: ActivityLog,
    settings: Settings,
}

impl Vault {
    /// Open the vault in `dir` with file storage and the settings found there
    pub async fn open_in_dir(dir: &Path, key: &VaultKey) -> Result<Self> {
        let storage = Arc::new(JsonFileStorage::open(dir.to_path_buf()).await?);
        let settings = SettingsManager::new(dir).get().clone();
        Self::open(storage, key, settings).await
    }

    /// Open a vault over `storage`.
    ///
    /// On first use this writes the salt and a verification token; afterwards
    /// a key that cannot decrypt the token is rejected with
    /// [`VaultError::InvalidKey`].
    pub async fn open(
        storage: Arc<dyn RecordStore>,
        key: &VaultKey,
        settings: Settings,
    ) -> Result<Self> {
        let cipher = Arc::new(Self::build_cipher(storage.as_ref(), key, &settings).await?);
        Self::verify_or_initialize(storage.as_ref(), &cipher).await?;

        info!("Vault opened ({})", storage.backend_name());

        Ok(Self {
            credentials: CredentialManager::new(storage.clone(), cipher.clone()),
            history: PasswordHistory::new(storage.clone(), cipher.clone()),
            shares: ShareLog::new(storage.clone()),
            activity: ActivityLog::new(storage.clone()),
            storage,
            cipher,
            settings,
        })
    }

    async fn build_cipher(
        storage: &dyn RecordStore,
        key: &VaultKey,
        settings: &Settings,
    ) -> Result<CredentialCipher> {
        match key {
            VaultKey::Raw(master_key) => Ok(CredentialCipher::new(master_key.clone())),
            VaultKey::Passphrase(passphrase) => {
                let (salt, params) = match storage.retrieve(SALT_KEY).await? {
                    Some(bytes) => {
                        let salt = String::from_utf8(bytes).map_err(|e| {
                            VaultError::StorageError(format!("Invalid salt: {}", e))
                        })?;
                        (salt, Self::stored_kdf_params(storage).await?)
                    }
                    None => {
                        // Parameters first: a salt without them is unreadable
                        let params = settings.kdf;
                        storage
                            .store(KDF_KEY, &serde_json::to_vec(&params)?)
                            .await?;
                        let salt = generate_salt();
                        storage.store(SALT_KEY, salt.as_bytes()).await?;
                        debug!("Generated new vault salt");
                        (salt, params)
                    }
                };
                CredentialCipher::from_passphrase(passphrase.expose(), &salt, &params)
            }
        }
    }

    /// Key derivation parameters recorded when the vault was created
    async fn stored_kdf_params(storage: &dyn RecordStore) -> Result<KeyDerivationParams> {
        let bytes = storage.retrieve(KDF_KEY).await?.ok_or_else(|| {
            VaultError::StorageError("Vault has no key derivation parameters".to_string())
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn verify_or_initialize(
        storage: &dyn RecordStore,
        cipher: &CredentialCipher,
    ) -> Result<()> {
        let Some(bytes) = storage.retrieve(VERIFICATION_KEY).await? else {
            let token = cipher.encrypt(VERIFICATION_PLAINTEXT)?;
            storage.store(VERIFICATION_KEY, token.as_bytes()).await?;
            info!("Initialized new vault");
            return Ok(());
        };

        let token = String::from_utf8(bytes)
            .map_err(|e| VaultError::StorageError(format!("Invalid verification token: {}", e)))?;

        match cipher.decrypt(&token) {
            Ok(plaintext) if plaintext == VERIFICATION_PLAINTEXT => {
                debug!("Vault key verified");
                Ok(())
            }
            Ok(_) | Err(VaultError::AuthenticationFailed) => Err(VaultError::InvalidKey),
            Err(e) => Err(e),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The cipher protecting this vault's secrets
    pub fn cipher(&self) -> &CredentialCipher {
        &self.cipher
    }

    pub fn backend_name(&self) -> &'static str {
        self.storage.backend_name()
    }

    /// Generate a password, then record it in history and the activity feed
    pub async fn generate(
        &self,
        owner_id: Uuid,
        options: Option<&GeneratorOptions>,
    ) -> Result<GeneratedPassword> {
        let options = options.unwrap_or(&self.settings.generator);
        let password = SecretString::new(password::generate(options)?);

        let entry = self.history.record(owner_id, password.expose()).await?;
        self.log_activity(
            owner_id,
            ActivityKind::Generated,
            "Generated a new password".to_string(),
        )
        .await;

        Ok(GeneratedPassword {
            strength: entry.strength,
            label: entry.label(),
            password,
            entry,
        })
    }

    pub async fn add_credential(
        &self,
        owner_id: Uuid,
        new: NewCredential,
    ) -> Result<CredentialRecord> {
        let record = self.credentials.add(owner_id, new).await?;
        self.log_activity(
            owner_id,
            ActivityKind::PasswordCreated,
            format!("Added password '{}'", record.title),
        )
        .await;
        Ok(record)
    }

    pub async fn update_credential(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: CredentialUpdate,
    ) -> Result<CredentialRecord> {
        let record = self.credentials.update(owner_id, id, update).await?;
        self.log_activity(
            owner_id,
            ActivityKind::PasswordUpdated,
            format!("Updated password '{}'", record.title),
        )
        .await;
        Ok(record)
    }

    pub async fn delete_credential(&self, owner_id: Uuid, id: Uuid) -> Result<CredentialRecord> {
        let record = self.credentials.delete(owner_id, id).await?;
        self.log_activity(
            owner_id,
            ActivityKind::PasswordDeleted,
            format!("Deleted password '{}'", record.title),
        )
        .await;
        Ok(record)
    }

    pub async fn search(
        &self,
        owner_id: Uuid,
        filter: &SearchFilter,
    ) -> Result<Vec<CredentialRecord>> {
        Ok(filter.apply(self.credentials.list(owner_id).await?))
    }

    /// Record that the owner shared a credential. The email itself is sent
    /// by the caller.
    pub async fn share(
        &self,
        owner_id: Uuid,
        id: Uuid,
        recipient_email: &str,
        sender_email: Option<&str>,
    ) -> Result<ShareRecord> {
        let credential = self
            .credentials
            .get(owner_id, id)
            .await?
            .ok_or_else(|| VaultError::CredentialNotFound(id.to_string()))?;

        let record = self
            .shares
            .record(&credential, recipient_email, sender_email)
            .await?;
        self.log_activity(
            owner_id,
            ActivityKind::Shared,
            format!(
                "Shared password '{}' with {}",
                record.title, record.recipient_email
            ),
        )
        .await;
        Ok(record)
    }

    /// Score every credential and flag weak and expired ones
    pub async fn audit(&self, owner_id: Uuid, now: DateTime<Utc>) -> Result<AuditReport> {
        let records = self.credentials.list(owner_id).await?;
        let mut report = AuditReport {
            total: records.len(),
            strength: StrengthCounts::default(),
            weak: Vec::new(),
            expired: Vec::new(),
        };

        for record in &records {
            let plaintext = self.credentials.decrypt_record(record)?;
            let label = StrengthLabel::of(plaintext.expose());
            report.strength.add(label);

            if label == StrengthLabel::Weak {
                report.weak.push(record.id);
            }
            if record.is_expired(now, self.settings.expiry_days) {
                report.expired.push(record.id);
            }
        }

        Ok(report)
    }

    /// The change has already been saved, so a failed append is only logged
    async fn log_activity(&self, owner_id: Uuid, kind: ActivityKind, title: String) {
        if let Err(e) = self.activity.append(owner_id, kind, title).await {
            warn!("Failed to record {} activity: {}", kind, e);
        }
    }

    pub async fn recent_history(&self, owner_id: Uuid) -> Result<Vec<HistoryEntry>> {
        self.history.recent(owner_id, self.settings.history_limit).await
    }

    pub async fn recent_activity(&self, owner_id: Uuid) -> Result<Vec<ActivityEntry>> {
        self.activity.recent(owner_id, self.settings.activity_limit).await
    }
}
