//! Chain configuration: gas schedule, precompiles and address derivation

use rlp::RlpStream;
use vesper_crypto::keccak256;
use vesper_primitives::{Address, H256};

use crate::params::Params;
use crate::precompiles::Precompiles;

/// Everything the VM needs to know about the chain
#[derive(Debug)]
pub struct Config {
    /// Gas schedule and limits
    pub params: Params,
    /// Precompiled contracts
    pub precompiles: Precompiles,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl Config {
    /// Config with the standard precompiles priced from `params`
    pub fn new(params: Params) -> Self {
        let precompiles = Precompiles::standard(&params);
        Self { params, precompiles }
    }

    /// Build from a JSON parameter override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(Params::from_json(json)?))
    }

    /// Whether `address` hosts a precompile
    pub fn is_precompile(&self, address: &Address) -> bool {
        self.precompiles.contains(address)
    }

    /// Address of a contract created by `sender` at `nonce`:
    /// `keccak256(rlp([sender, nonce]))[12..]`
    pub fn create_address(&self, sender: &Address, nonce: u64) -> Address {
        let mut stream = RlpStream::new_list(2);
        stream.append(sender);
        stream.append(&nonce);
        tail_address(keccak256(&stream.out()))
    }

    /// CREATE2 address: `keccak256(0xff ++ sender ++ salt ++ keccak256(init_code))[12..]`
    pub fn create2_address(&self, sender: &Address, salt: &H256, init_code: &[u8]) -> Address {
        let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
        preimage.push(0xff);
        preimage.extend_from_slice(sender.as_bytes());
        preimage.extend_from_slice(salt.as_bytes());
        preimage.extend_from_slice(keccak256(init_code).as_bytes());
        tail_address(keccak256(&preimage))
    }
}

fn tail_address(hash: H256) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}
