//! Block and transaction context seen by executing code

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vesper_primitives::{Address, H256, U256};
use vesper_state::Storage;

/// Read access to the block and transaction the code runs in,
/// plus the value-transfer rules.
pub trait Context {
    /// Block beneficiary
    fn coinbase(&self) -> Address;

    /// Block difficulty
    fn difficulty(&self) -> U256;

    /// Block gas limit
    fn gas_limit(&self) -> u64;

    /// Block number
    fn number(&self) -> u64;

    /// Block timestamp
    fn timestamp(&self) -> u64;

    /// Hash of block `number`, zero if unknown
    fn block_hash(&self, number: u64) -> H256;

    /// Transaction sender
    fn origin(&self) -> Address;

    /// Transaction gas price
    fn gas_price(&self) -> U256;

    /// Whether `from` holds at least `amount`
    fn can_transfer(&self, storage: &dyn Storage, from: &Address, amount: U256) -> bool {
        storage.get_balance(from) >= amount
    }

    /// Move `amount` from `from` to `to`
    fn transfer(&self, storage: &mut dyn Storage, from: &Address, to: &Address, amount: U256) {
        storage.sub_balance(from, amount);
        storage.add_balance(to, amount);
    }
}

/// Block environment information
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockContext {
    /// Block number
    pub number: u64,
    /// Block timestamp
    pub timestamp: u64,
    /// Block gas limit
    pub gas_limit: u64,
    /// Block coinbase
    pub coinbase: Address,
    /// Block difficulty
    pub difficulty: U256,
    /// Known ancestor hashes by block number
    pub block_hashes: HashMap<u64, H256>,
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            number: 0,
            timestamp: 0,
            gas_limit: 30_000_000,
            coinbase: Address::ZERO,
            difficulty: U256::zero(),
            block_hashes: HashMap::new(),
        }
    }
}

/// Transaction environment information
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TxContext {
    /// Transaction origin (original sender)
    pub origin: Address,
    /// Gas price
    pub gas_price: U256,
}

/// Complete execution environment
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Env {
    /// Block context
    pub block: BlockContext,
    /// Transaction context
    pub tx: TxContext,
}

impl Env {
    /// Create new environment
    pub fn new(block: BlockContext, tx: TxContext) -> Self {
        Self { block, tx }
    }
}

impl Context for Env {
    fn coinbase(&self) -> Address {
        self.block.coinbase
    }

    fn difficulty(&self) -> U256 {
        self.block.difficulty
    }

    fn gas_limit(&self) -> u64 {
        self.block.gas_limit
    }

    fn number(&self) -> u64 {
        self.block.number
    }

    fn timestamp(&self) -> u64 {
        self.block.timestamp
    }

    fn block_hash(&self, number: u64) -> H256 {
        self.block.block_hashes.get(&number).copied().unwrap_or(H256::ZERO)
    }

    fn origin(&self) -> Address {
        self.tx.origin
    }

    fn gas_price(&self) -> U256 {
        self.tx.gas_price
    }
}
