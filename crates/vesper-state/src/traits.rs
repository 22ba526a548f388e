//! State access trait and the value types it exchanges

use bytes::Bytes;
use vesper_primitives::{Address, H256, U256};

/// Empty code hash (keccak256 of empty bytes)
pub const EMPTY_CODE_HASH: H256 = H256::from_bytes([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c,
    0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b,
    0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Account header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Account nonce
    pub nonce: u64,
    /// Account balance in wei
    pub balance: U256,
    /// keccak256 of the code, EMPTY_CODE_HASH if none
    pub code_hash: H256,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::zero(),
            code_hash: EMPTY_CODE_HASH,
        }
    }
}

impl Account {
    /// Create a new empty account
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if account is empty (EIP-161)
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code_hash == EMPTY_CODE_HASH
    }

    /// Check if account has code
    pub fn has_code(&self) -> bool {
        self.code_hash != EMPTY_CODE_HASH
    }
}

/// Event emitted by `LOG0`..`LOG4`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics (0-4)
    pub topics: Vec<H256>,
    /// Log data
    pub data: Vec<u8>,
}

/// Opaque handle to a point in the state history
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Snapshot(pub(crate) usize);

/// State backend read and written by the interpreter.
///
/// Mutations on an address that does not exist create it first. Every
/// mutation made after [`Storage::snapshot`] is undone by
/// [`Storage::revert_to_snapshot`], including refunds, logs and
/// self-destruct marks.
pub trait Storage {
    /// Create (or reset) an account, keeping any balance it already holds
    fn create_account(&mut self, address: Address);

    /// Whether the address has an account
    fn exists(&self, address: &Address) -> bool;

    /// Whether the account is absent or empty (EIP-161)
    fn is_empty(&self, address: &Address) -> bool;

    /// Get account balance
    fn get_balance(&self, address: &Address) -> U256;

    /// Add to balance
    fn add_balance(&mut self, address: &Address, amount: U256);

    /// Subtract from balance. Callers check funds first; the balance saturates at zero.
    fn sub_balance(&mut self, address: &Address, amount: U256);

    /// Get account nonce
    fn get_nonce(&self, address: &Address) -> u64;

    /// Set account nonce
    fn set_nonce(&mut self, address: &Address, nonce: u64);

    /// Get contract code (empty if none)
    fn get_code(&self, address: &Address) -> Bytes;

    /// Replace contract code
    fn set_code(&mut self, address: &Address, code: Bytes);

    /// Get code length
    fn get_code_size(&self, address: &Address) -> usize {
        self.get_code(address).len()
    }

    /// Code hash; zero for a missing account
    fn get_code_hash(&self, address: &Address) -> H256;

    /// Read a storage slot (zero if unset)
    fn get_storage(&self, address: &Address, key: &H256) -> H256;

    /// Write a storage slot
    fn set_storage(&mut self, address: &Address, key: H256, value: H256);

    /// Mark the account destroyed and clear its balance.
    /// Returns false if it was already marked.
    fn self_destruct(&mut self, address: &Address) -> bool;

    /// Whether the account was destroyed in the current transaction
    fn has_self_destructed(&self, address: &Address) -> bool;

    /// Take a snapshot
    fn snapshot(&mut self) -> Snapshot;

    /// Undo every change made since `snapshot`
    fn revert_to_snapshot(&mut self, snapshot: Snapshot);

    /// Add to the refund counter
    fn add_refund(&mut self, gas: u64);

    /// Subtract from the refund counter (saturating)
    fn sub_refund(&mut self, gas: u64);

    /// Current refund counter
    fn get_refund(&self) -> u64;

    /// Record a log
    fn add_log(&mut self, log: Log);

    /// Logs recorded so far
    fn logs(&self) -> &[Log];

    /// End the transaction: drop destroyed accounts, reset the refund
    /// counter and forget history. Returns the transaction's logs.
    fn finalize(&mut self) -> Vec<Log>;
}
