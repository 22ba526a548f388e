//! secp256k1 signatures and public key recovery

use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use vesper_primitives::{Address, H256, U256};

use crate::{keccak256, CryptoError};

/// Public key
pub type PublicKey = VerifyingKey;

/// Private key
pub type PrivateKey = SigningKey;

/// secp256k1 group order
fn curve_order() -> U256 {
    U256::from_big_endian(&[
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
        0x41, 0x41,
    ])
}

/// Recoverable ECDSA signature. `v` is 27 or 28.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component
    pub r: H256,
    /// s component
    pub s: H256,
    /// recovery byte
    pub v: u8,
}

impl Signature {
    /// Create signature from components
    pub fn new(r: H256, s: H256, v: u8) -> Self {
        Signature { r, s, v }
    }

    /// Recovery id in 0/1 form, if `v` is one of 0, 1, 27, 28
    pub fn recovery_id(&self) -> Result<u8, CryptoError> {
        match self.v {
            0 | 1 => Ok(self.v),
            27 | 28 => Ok(self.v - 27),
            other => Err(CryptoError::InvalidRecoveryId(other)),
        }
    }

    /// Whether `s` lies in the lower half of the curve order
    pub fn is_low_s(&self) -> bool {
        self.s.to_word() <= curve_order() >> 1usize
    }

    /// r and s are both in `[1, n)`
    pub fn has_valid_scalars(&self) -> bool {
        let n = curve_order();
        let (r, s) = (self.r.to_word(), self.s.to_word());
        !r.is_zero() && !s.is_zero() && r < n && s < n
    }
}

/// Sign a 32-byte digest, normalising to low-s
pub fn sign(digest: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, recovery_id) = private_key
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => {
            let flipped = RecoveryId::try_from(recovery_id.to_byte() ^ 1)
                .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
            (normalized, flipped)
        }
        None => (signature, recovery_id),
    };

    let r: [u8; 32] = signature.r().to_bytes().into();
    let s: [u8; 32] = signature.s().to_bytes().into();
    Ok(Signature::new(H256::from_bytes(r), H256::from_bytes(s), recovery_id.to_byte() + 27))
}

/// Recover the signer's public key from a digest and signature.
///
/// Any `s` in `[1, n)` is accepted. A high `s` is mirrored to `n - s` with
/// the recovery id flipped, which names the same key.
pub fn recover_public_key(digest: &H256, signature: &Signature) -> Result<PublicKey, CryptoError> {
    if !signature.has_valid_scalars() {
        return Err(CryptoError::InvalidSignature("r or s out of range".to_string()));
    }
    let mut id = signature.recovery_id()?;
    let mut s_word = signature.s.to_word();
    if !signature.is_low_s() {
        s_word = curve_order() - s_word;
        id ^= 1;
    }
    let recovery_id = RecoveryId::try_from(id).map_err(|_| CryptoError::InvalidRecoveryId(id))?;

    let r: k256::FieldBytes = (*signature.r.as_bytes()).into();
    let s: k256::FieldBytes = (*H256::from_word(s_word).as_bytes()).into();
    let k256_sig = K256Signature::from_scalars(r, s)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    VerifyingKey::recover_from_prehash(digest.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Address of a public key: last 20 bytes of keccak256 over the uncompressed point
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    // skip the 0x04 tag
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

/// Recover the signer's address
pub fn recover_address(digest: &H256, signature: &Signature) -> Result<Address, CryptoError> {
    recover_public_key(digest, signature).map(|key| public_key_to_address(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn key_one() -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        SigningKey::from_bytes(&bytes.into()).unwrap()
    }

    // ==================== Address derivation ====================

    #[test]
    fn test_address_of_private_key_one() {
        let key = key_one();
        assert_eq!(
            public_key_to_address(key.verifying_key()).to_hex(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    // ==================== Sign / recover ====================

    #[test]
    fn test_sign_then_recover_address() {
        let key = SigningKey::random(&mut OsRng);
        let expected = public_key_to_address(key.verifying_key());
        let digest = keccak256(b"vesper");

        let sig = sign(&digest, &key).unwrap();
        assert!(sig.v == 27 || sig.v == 28);
        assert!(sig.is_low_s());
        assert_eq!(recover_address(&digest, &sig).unwrap(), expected);
    }

    #[test]
    fn test_recover_accepts_high_s() {
        let key = SigningKey::from_bytes(&[7u8; 32].into()).unwrap();
        let expected = public_key_to_address(key.verifying_key());
        let digest = H256::from_bytes([0x42; 32]);

        let low = sign(&digest, &key).unwrap();
        let high = Signature::new(
            low.r,
            H256::from_word(curve_order() - low.s.to_word()),
            if low.v == 27 { 28 } else { 27 },
        );
        assert!(!high.is_low_s());
        assert!(high.has_valid_scalars());
        assert_eq!(recover_address(&digest, &high).unwrap(), expected);
    }

    #[test]
    fn test_recover_with_wrong_digest_gives_other_address() {
        let key = key_one();
        let sig = sign(&keccak256(b"one"), &key).unwrap();
        let recovered = recover_address(&keccak256(b"two"), &sig);
        // recovery either fails or yields an unrelated key
        if let Ok(addr) = recovered {
            assert_ne!(addr, public_key_to_address(key.verifying_key()));
        }
    }

    #[test]
    fn test_recover_rejects_bad_v() {
        let key = key_one();
        let digest = keccak256(b"v");
        let mut sig = sign(&digest, &key).unwrap();
        sig.v = 29;
        assert_eq!(
            recover_address(&digest, &sig),
            Err(CryptoError::InvalidRecoveryId(29))
        );
    }

    #[test]
    fn test_recover_rejects_zero_scalars() {
        let sig = Signature::new(H256::ZERO, H256::from_low_u64(1), 27);
        assert!(matches!(
            recover_public_key(&H256::ZERO, &sig),
            Err(CryptoError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_recover_rejects_s_above_order() {
        let sig = Signature::new(H256::from_low_u64(1), H256::from_bytes([0xff; 32]), 28);
        assert!(!sig.has_valid_scalars());
        assert!(recover_public_key(&H256::ZERO, &sig).is_err());
    }

    #[test]
    fn test_recovery_id_forms() {
        let mut sig = Signature::new(H256::ZERO, H256::ZERO, 28);
        assert_eq!(sig.recovery_id(), Ok(1));
        sig.v = 0;
        assert_eq!(sig.recovery_id(), Ok(0));
    }
}
