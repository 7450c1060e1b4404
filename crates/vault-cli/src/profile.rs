//! Local profile: the owner id used when `--owner` is not given

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

const PROFILE_FILE: &str = "owner_id";

/// Read the local owner id from `dir`, creating one on first use
pub async fn local_owner(dir: &Path) -> Result<Uuid> {
    let path = dir.join(PROFILE_FILE);

    if path.exists() {
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return contents
            .trim()
            .parse()
            .with_context(|| format!("Invalid owner id in {}", path.display()));
    }

    tokio::fs::create_dir_all(dir).await?;
    let owner = Uuid::new_v4();
    tokio::fs::write(&path, owner.to_string()).await?;
    info!("Created local profile {}", owner);
    Ok(owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_owner_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let first = local_owner(temp_dir.path()).await.unwrap();
        let second = local_owner(temp_dir.path()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_corrupt_profile_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(PROFILE_FILE), "not-a-uuid").unwrap();
        assert!(local_owner(temp_dir.path()).await.is_err());
    }
}
