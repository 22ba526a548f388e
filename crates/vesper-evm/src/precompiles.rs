//! Precompiled contracts at addresses 0x01-0x05

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigUint;
use vesper_crypto::{recover_address, ripemd160, sha256, Signature};
use vesper_primitives::{Address, H256, U256};

use crate::error::{EvmError, EvmResult};
use crate::gas::words;
use crate::memory::copy_padded;
use crate::params::Params;
use crate::word;

/// Native contract callable at a fixed address.
///
/// The VM charges [`Precompile::required_gas`] on the calling frame before
/// invoking [`Precompile::run`].
pub trait Precompile: Send + Sync {
    /// Gas for processing `input`
    fn required_gas(&self, input: &[u8]) -> u64;

    /// Execute on `input`
    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>>;
}

/// Signer recovery (0x01)
#[derive(Clone, Debug)]
pub struct Ecrecover {
    gas: u64,
}

impl Precompile for Ecrecover {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        self.gas
    }

    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>> {
        let input = copy_padded(input, 0, 128);
        let v = U256::from_big_endian(&input[32..64]);
        if v != U256::from(27u64) && v != U256::from(28u64) {
            return Ok(Vec::new());
        }

        let digest = word_at(&input, 0);
        let signature = Signature::new(word_at(&input, 64), word_at(&input, 96), v.low_u64() as u8);

        match recover_address(&digest, &signature) {
            Ok(address) => Ok(H256::from_word(address.to_word()).as_bytes().to_vec()),
            Err(err) => {
                tracing::trace!(%err, "ecrecover failed");
                Ok(Vec::new())
            }
        }
    }
}

fn word_at(input: &[u8], offset: usize) -> H256 {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&input[offset..offset + 32]);
    H256::from_bytes(bytes)
}

/// SHA-256 (0x02)
#[derive(Clone, Debug)]
pub struct Sha256Hash {
    base: u64,
    per_word: u64,
}

impl Precompile for Sha256Hash {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(self.base, self.per_word, input.len())
    }

    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>> {
        Ok(sha256(input).as_bytes().to_vec())
    }
}

/// RIPEMD-160 (0x03), left-padded to a word
#[derive(Clone, Debug)]
pub struct Ripemd160Hash {
    base: u64,
    per_word: u64,
}

impl Precompile for Ripemd160Hash {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(self.base, self.per_word, input.len())
    }

    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>> {
        let mut output = vec![0u8; 32];
        output[12..].copy_from_slice(&ripemd160(input));
        Ok(output)
    }
}

/// Data copy (0x04)
#[derive(Clone, Debug)]
pub struct Identity {
    base: u64,
    per_word: u64,
}

impl Precompile for Identity {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(self.base, self.per_word, input.len())
    }

    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>> {
        Ok(input.to_vec())
    }
}

/// Arbitrary-precision modular exponentiation (0x05, EIP-198)
#[derive(Clone, Debug)]
pub struct BigModExp {
    quad_coeff_div: u64,
}

/// Lengths from the 96-byte header
fn modexp_lengths(input: &[u8]) -> (U256, U256, U256) {
    let header = copy_padded(input, 0, 96);
    (
        U256::from_big_endian(&header[..32]),
        U256::from_big_endian(&header[32..64]),
        U256::from_big_endian(&header[64..96]),
    )
}

fn mult_complexity(x: u128) -> u128 {
    if x <= 64 {
        x * x
    } else if x <= 1024 {
        x * x / 4 + 96 * x - 3072
    } else {
        (x.saturating_mul(x) / 16).saturating_add(480 * x).saturating_sub(199_680)
    }
}

impl Precompile for BigModExp {
    fn required_gas(&self, input: &[u8]) -> u64 {
        let (base_len, exp_len, mod_len) = modexp_lengths(input);
        let body = input.get(96..).unwrap_or(&[]);

        let base_len_u = word::saturating_usize(base_len);
        let exp_head = if body.len() <= base_len_u {
            U256::zero()
        } else {
            let head_len = word::saturating_usize(exp_len.min(U256::from(32u64)));
            U256::from_big_endian(&copy_padded(body, base_len_u, head_len))
        };

        let msb = exp_head.bits().saturating_sub(1) as u128;
        let mut adj_exp_len = if exp_len > U256::from(32u64) {
            u128::from(word::saturating_u64(exp_len - U256::from(32u64))).saturating_mul(8)
        } else {
            0
        };
        adj_exp_len = adj_exp_len.saturating_add(msb);

        let x = u128::from(word::saturating_u64(base_len.max(mod_len)));
        let gas = mult_complexity(x).saturating_mul(adj_exp_len.max(1)) / u128::from(self.quad_coeff_div.max(1));
        u64::try_from(gas).unwrap_or(u64::MAX)
    }

    fn run(&self, input: &[u8]) -> EvmResult<Vec<u8>> {
        let (base_len, exp_len, mod_len) = modexp_lengths(input);
        let too_long = || EvmError::PrecompileFailed("modexp length overflow".to_string());
        let base_len = word::to_usize(base_len).ok_or_else(too_long)?;
        let exp_len = word::to_usize(exp_len).ok_or_else(too_long)?;
        let mod_len = word::to_usize(mod_len).ok_or_else(too_long)?;

        if base_len == 0 && mod_len == 0 {
            return Ok(Vec::new());
        }

        let body = input.get(96..).unwrap_or(&[]);
        let base = BigUint::from_bytes_be(&copy_padded(body, 0, base_len));
        let exponent = BigUint::from_bytes_be(&copy_padded(body, base_len, exp_len));
        let modulus = BigUint::from_bytes_be(&copy_padded(body, base_len.saturating_add(exp_len), mod_len));

        if modulus == BigUint::default() {
            return Ok(vec![0u8; mod_len]);
        }

        let result = base.modpow(&exponent, &modulus).to_bytes_be();
        let mut out = vec![0u8; mod_len];
        out[mod_len - result.len()..].copy_from_slice(&result);
        Ok(out)
    }
}

fn linear_cost(base: u64, per_word: u64, len: usize) -> u64 {
    base.saturating_add(per_word.saturating_mul(words(len as u64)))
}

/// Address-keyed precompile table
#[derive(Default)]
pub struct Precompiles {
    contracts: BTreeMap<Address, Box<dyn Precompile>>,
}

impl Precompiles {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The 0x01-0x05 set priced from `params`
    pub fn standard(params: &Params) -> Self {
        let mut precompiles = Self::new();
        precompiles.insert(Address::from_low_u64(1), Box::new(Ecrecover { gas: params.ecrecover_gas }));
        precompiles.insert(
            Address::from_low_u64(2),
            Box::new(Sha256Hash { base: params.sha256_base_gas, per_word: params.sha256_per_word_gas }),
        );
        precompiles.insert(
            Address::from_low_u64(3),
            Box::new(Ripemd160Hash { base: params.ripemd160_base_gas, per_word: params.ripemd160_per_word_gas }),
        );
        precompiles.insert(
            Address::from_low_u64(4),
            Box::new(Identity { base: params.identity_base_gas, per_word: params.identity_per_word_gas }),
        );
        precompiles.insert(
            Address::from_low_u64(5),
            Box::new(BigModExp { quad_coeff_div: params.mod_exp_quad_coeff_div }),
        );
        precompiles
    }

    /// Register (or replace) a precompile
    pub fn insert(&mut self, address: Address, precompile: Box<dyn Precompile>) {
        self.contracts.insert(address, precompile);
    }

    /// Look up a precompile
    pub fn get(&self, address: &Address) -> Option<&dyn Precompile> {
        self.contracts.get(address).map(|p| p.as_ref())
    }

    /// Whether `address` is a precompile
    pub fn contains(&self, address: &Address) -> bool {
        self.contracts.contains_key(address)
    }

    /// Registered addresses in ascending order
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.contracts.keys()
    }
}

impl fmt::Debug for Precompiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.contracts.keys()).finish()
    }
}
