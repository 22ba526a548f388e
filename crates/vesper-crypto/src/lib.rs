//! # vesper-crypto
//!
//! Cryptographic primitives used by the EVM and its precompiles.
//!
//! - Keccak-256 hashing (`SHA3` opcode, address derivation)
//! - SHA-256 hashing (precompile 0x02)
//! - RIPEMD-160 hashing (precompile 0x03)
//! - secp256k1 public key recovery (precompile 0x01)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;
mod signature;
mod error;

pub use hash::{keccak256, ripemd160, sha256};
pub use signature::{
    sign, recover_public_key, recover_address, public_key_to_address,
    Signature, PublicKey, PrivateKey,
};
pub use error::CryptoError;
