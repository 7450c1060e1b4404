//! Key and secret wrappers that zero their memory on drop

use zeroize::{Zeroize, ZeroizeOnDrop};

/// 256-bit vault key
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; 32],
}

impl MasterKey {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// Parse a raw key from 64 hex characters
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut bytes = hex::decode(s.trim()).ok()?;
        let key = <[u8; 32]>::try_from(bytes.as_slice()).ok().map(Self::new);
        bytes.zeroize();
        key
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Revealed plaintext password
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Borrow the plaintext. Callers should not copy it into long-lived state.
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_key_from_hex() {
        let key = MasterKey::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(key.as_bytes(), &[0xab; 32]);

        assert!(MasterKey::from_hex("abcd").is_none());
        assert!(MasterKey::from_hex("zz").is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = format!("{:?}", MasterKey::new([9u8; 32]));
        assert!(key.contains("REDACTED"));
        assert!(!key.contains('9'));

        let secret = format!("{:?}", SecretString::new("p@ssw0rd".to_string()));
        assert!(!secret.contains("p@ssw0rd"));
    }

    #[test]
    fn test_secret_from_string() {
        let secret = SecretString::from("value".to_string());
        assert_eq!(secret.expose(), "value");
        assert_eq!(secret, SecretString::new("value".to_string()));
    }
}
