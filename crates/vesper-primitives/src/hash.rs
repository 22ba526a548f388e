//! 32-byte hash type, also used for storage keys and values

use primitive_types::U256;
use std::fmt;
use thiserror::Error;

/// Hash parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid hash length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        got: usize,
    },
}

/// 256-bit hash (32 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct H256([u8; 32]);

impl H256 {
    /// Size in bytes
    pub const LEN: usize = 32;

    /// Zero hash
    pub const ZERO: H256 = H256([0u8; 32]);

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }

    /// Create from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, HashError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| HashError::InvalidLength {
            expected: 32,
            got: slice.len(),
        })?;
        Ok(H256(bytes))
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Hash whose low 8 bytes hold `value`
    pub fn from_low_u64(value: u64) -> Self {
        Self::from_word(U256::from(value))
    }

    /// Big-endian encoding of a machine word
    pub fn from_word(word: U256) -> Self {
        let mut bytes = [0u8; 32];
        word.to_big_endian(&mut bytes);
        H256(bytes)
    }

    /// Interpret the bytes as a big-endian machine word
    pub fn to_word(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self.to_hex())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }
}

impl From<U256> for H256 {
    fn from(word: U256) -> Self {
        H256::from_word(word)
    }
}

impl From<H256> for U256 {
    fn from(hash: H256) -> Self {
        hash.to_word()
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "rlp")]
mod rlp_impl {
    use super::*;
    use rlp::{Encodable, RlpStream};

    impl Encodable for H256 {
        fn rlp_append(&self, s: &mut RlpStream) {
            s.encoder().encode_value(&self.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h256_from_hex() {
        let hash = H256::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert!(!hash.is_zero());
        assert_eq!(hash.as_bytes()[31], 1);
    }

    #[test]
    fn test_h256_from_hex_wrong_length() {
        assert_eq!(
            H256::from_hex("0x00ff"),
            Err(HashError::InvalidLength { expected: 32, got: 2 })
        );
        assert!(matches!(H256::from_hex("0xzz"), Err(HashError::InvalidHex(_))));
    }

    #[test]
    fn test_word_is_big_endian() {
        let hash = H256::from_low_u64(0x0102);
        assert_eq!(hash.as_bytes()[30], 0x01);
        assert_eq!(hash.as_bytes()[31], 0x02);
        assert_eq!(hash.to_word(), U256::from(0x0102u64));
    }

    #[test]
    fn test_word_roundtrip_max() {
        let hash: H256 = U256::MAX.into();
        assert_eq!(hash.as_bytes(), &[0xff; 32]);
        assert_eq!(U256::from(hash), U256::MAX);
    }

    #[test]
    fn test_zero() {
        assert!(H256::ZERO.is_zero());
        assert_eq!(H256::default(), H256::ZERO);
        assert!(H256::from_word(U256::zero()).is_zero());
    }

    #[test]
    fn test_display() {
        let hash = H256::from_low_u64(0xab);
        assert!(hash.to_string().ends_with("ab"));
        assert!(format!("{:?}", hash).starts_with("H256(0x"));
    }
}
