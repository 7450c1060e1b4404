//! Argon2id stretching of the configured vault passphrase

use argon2::{Algorithm, Argon2, Params, Version};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::MasterKey;
use crate::error::{Result, VaultError};

const SALT_LEN: usize = 16;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDerivationParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Generate a random salt, hex encoded
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    hex::encode(salt)
}

/// Derive the 256-bit vault key from a passphrase and a hex salt
pub fn derive_key(
    passphrase: &str,
    salt_hex: &str,
    params: &KeyDerivationParams,
) -> Result<MasterKey> {
    let salt = hex::decode(salt_hex.trim())
        .map_err(|e| VaultError::KeyDerivationError(format!("Invalid salt: {}", e)))?;

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| VaultError::KeyDerivationError(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(passphrase.as_bytes(), &salt, &mut output)
        .map_err(|e| VaultError::KeyDerivationError(e.to_string()))?;

    let key = MasterKey::new(output);
    output.zeroize();
    Ok(key)
}
