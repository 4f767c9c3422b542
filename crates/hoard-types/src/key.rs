use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Storage key of a block.
///
/// A `Key` is the BLAKE3 digest of a block's bytes. It carries no codec
/// information; two blocks with identical bytes share a key no matter how
/// they are interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key([u8; 32]);

impl Key {
    /// Hash a block's bytes into its key.
    pub fn for_data(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.short_hex())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Key {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for Key {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_data_is_deterministic() {
        assert_eq!(Key::for_data(b"block"), Key::for_data(b"block"));
        assert_ne!(Key::for_data(b"block-a"), Key::for_data(b"block-b"));
    }

    #[test]
    fn hex_roundtrip() {
        let key = Key::for_data(b"hex");
        let parsed: Key = key.to_hex().parse().unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = Key::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            Key::from_hex("not hex at all"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn short_hex_is_8_chars() {
        assert_eq!(Key::for_data(b"short").short_hex().len(), 8);
    }

    #[test]
    fn serde_roundtrip() {
        let key = Key::for_data(b"serde");
        let json = serde_json::to_string(&key).unwrap();
        let parsed: Key = serde_json::from_str(&json).unwrap();
        assert_eq!(key, parsed);
    }
}
