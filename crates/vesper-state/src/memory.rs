//! Journaled in-memory state backend

use std::collections::{HashMap, HashSet};

use bytes::Bytes;
use vesper_crypto::keccak256;
use vesper_primitives::{Address, H256, U256};

use crate::traits::{Account, Log, Snapshot, Storage, EMPTY_CODE_HASH};

#[derive(Clone, Debug, Default)]
struct StateObject {
    account: Account,
    code: Bytes,
    storage: HashMap<H256, H256>,
}

/// One undoable change
#[derive(Debug)]
enum JournalEntry {
    /// Account created or reset; `prev` is what it replaced
    Created { address: Address, prev: Option<StateObject> },
    Balance { address: Address, prev: U256 },
    Nonce { address: Address, prev: u64 },
    Code { address: Address, prev_code: Bytes, prev_hash: H256 },
    Storage { address: Address, key: H256, prev: Option<H256> },
    SelfDestruct { address: Address, prev_balance: U256 },
    Refund { prev: u64 },
    Log,
}

/// In-memory [`Storage`] with a change journal.
///
/// A snapshot is the journal length; reverting pops and undoes entries
/// back to it, so the cost is proportional to the changes undone.
#[derive(Debug, Default)]
pub struct MemoryState {
    accounts: HashMap<Address, StateObject>,
    destructed: HashSet<Address>,
    refund: u64,
    logs: Vec<Log>,
    journal: Vec<JournalEntry>,
}

impl MemoryState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for genesis-style setup: an account with balance and code
    pub fn with_account(mut self, address: Address, balance: U256, code: &[u8]) -> Self {
        let code = Bytes::copy_from_slice(code);
        let object = StateObject {
            account: Account {
                nonce: 0,
                balance,
                code_hash: code_hash(&code),
            },
            code,
            storage: HashMap::new(),
        };
        self.accounts.insert(address, object);
        self
    }

    /// Account header, if the account exists
    pub fn account(&self, address: &Address) -> Option<Account> {
        self.accounts.get(address).map(|o| o.account.clone())
    }

    /// Number of non-zero storage slots held by an account
    pub fn storage_len(&self, address: &Address) -> usize {
        self.accounts.get(address).map(|o| o.storage.len()).unwrap_or(0)
    }

    /// Number of changes recorded since the last finalize
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    fn object_mut(&mut self, address: &Address) -> &mut StateObject {
        if !self.accounts.contains_key(address) {
            self.journal.push(JournalEntry::Created { address: *address, prev: None });
        }
        self.accounts.entry(*address).or_default()
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::Created { address, prev } => match prev {
                Some(object) => {
                    self.accounts.insert(address, object);
                }
                None => {
                    self.accounts.remove(&address);
                }
            },
            JournalEntry::Balance { address, prev } => {
                if let Some(object) = self.accounts.get_mut(&address) {
                    object.account.balance = prev;
                }
            }
            JournalEntry::Nonce { address, prev } => {
                if let Some(object) = self.accounts.get_mut(&address) {
                    object.account.nonce = prev;
                }
            }
            JournalEntry::Code { address, prev_code, prev_hash } => {
                if let Some(object) = self.accounts.get_mut(&address) {
                    object.code = prev_code;
                    object.account.code_hash = prev_hash;
                }
            }
            JournalEntry::Storage { address, key, prev } => {
                if let Some(object) = self.accounts.get_mut(&address) {
                    match prev {
                        Some(value) => object.storage.insert(key, value),
                        None => object.storage.remove(&key),
                    };
                }
            }
            JournalEntry::SelfDestruct { address, prev_balance } => {
                self.destructed.remove(&address);
                if let Some(object) = self.accounts.get_mut(&address) {
                    object.account.balance = prev_balance;
                }
            }
            JournalEntry::Refund { prev } => self.refund = prev,
            JournalEntry::Log => {
                self.logs.pop();
            }
        }
    }
}

fn code_hash(code: &[u8]) -> H256 {
    if code.is_empty() {
        EMPTY_CODE_HASH
    } else {
        keccak256(code)
    }
}

impl Storage for MemoryState {
    fn create_account(&mut self, address: Address) {
        let prev = self.accounts.remove(&address);
        let balance = prev.as_ref().map(|o| o.account.balance).unwrap_or_default();
        self.journal.push(JournalEntry::Created { address, prev });

        let mut object = StateObject::default();
        object.account.balance = balance;
        self.accounts.insert(address, object);
    }

    fn exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    fn is_empty(&self, address: &Address) -> bool {
        self.accounts.get(address).map(|o| o.account.is_empty()).unwrap_or(true)
    }

    fn get_balance(&self, address: &Address) -> U256 {
        self.accounts.get(address).map(|o| o.account.balance).unwrap_or_default()
    }

    fn add_balance(&mut self, address: &Address, amount: U256) {
        let object = self.object_mut(address);
        let prev = object.account.balance;
        object.account.balance = prev.saturating_add(amount);
        self.journal.push(JournalEntry::Balance { address: *address, prev });
    }

    fn sub_balance(&mut self, address: &Address, amount: U256) {
        let object = self.object_mut(address);
        let prev = object.account.balance;
        object.account.balance = prev.saturating_sub(amount);
        self.journal.push(JournalEntry::Balance { address: *address, prev });
    }

    fn get_nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map(|o| o.account.nonce).unwrap_or(0)
    }

    fn set_nonce(&mut self, address: &Address, nonce: u64) {
        let object = self.object_mut(address);
        let prev = std::mem::replace(&mut object.account.nonce, nonce);
        self.journal.push(JournalEntry::Nonce { address: *address, prev });
    }

    fn get_code(&self, address: &Address) -> Bytes {
        self.accounts.get(address).map(|o| o.code.clone()).unwrap_or_default()
    }

    fn set_code(&mut self, address: &Address, code: Bytes) {
        let hash = code_hash(&code);
        let object = self.object_mut(address);
        let prev_code = std::mem::replace(&mut object.code, code);
        let prev_hash = std::mem::replace(&mut object.account.code_hash, hash);
        self.journal.push(JournalEntry::Code { address: *address, prev_code, prev_hash });
    }

    fn get_code_size(&self, address: &Address) -> usize {
        self.accounts.get(address).map(|o| o.code.len()).unwrap_or(0)
    }

    fn get_code_hash(&self, address: &Address) -> H256 {
        self.accounts.get(address).map(|o| o.account.code_hash).unwrap_or(H256::ZERO)
    }

    fn get_storage(&self, address: &Address, key: &H256) -> H256 {
        self.accounts
            .get(address)
            .and_then(|o| o.storage.get(key).copied())
            .unwrap_or(H256::ZERO)
    }

    fn set_storage(&mut self, address: &Address, key: H256, value: H256) {
        let object = self.object_mut(address);
        let prev = if value.is_zero() {
            object.storage.remove(&key)
        } else {
            object.storage.insert(key, value)
        };
        self.journal.push(JournalEntry::Storage { address: *address, key, prev });
    }

    fn self_destruct(&mut self, address: &Address) -> bool {
        if self.destructed.contains(address) {
            return false;
        }
        let object = self.object_mut(address);
        let prev_balance = std::mem::take(&mut object.account.balance);
        self.destructed.insert(*address);
        self.journal.push(JournalEntry::SelfDestruct { address: *address, prev_balance });
        true
    }

    fn has_self_destructed(&self, address: &Address) -> bool {
        self.destructed.contains(address)
    }

    fn snapshot(&mut self) -> Snapshot {
        Snapshot(self.journal.len())
    }

    fn revert_to_snapshot(&mut self, snapshot: Snapshot) {
        let target = snapshot.0;
        let undone = self.journal.len().saturating_sub(target);
        while self.journal.len() > target {
            if let Some(entry) = self.journal.pop() {
                self.undo(entry);
            }
        }
        tracing::trace!(snapshot = target, undone, "Reverted state");
    }

    fn add_refund(&mut self, gas: u64) {
        self.journal.push(JournalEntry::Refund { prev: self.refund });
        self.refund = self.refund.saturating_add(gas);
    }

    fn sub_refund(&mut self, gas: u64) {
        self.journal.push(JournalEntry::Refund { prev: self.refund });
        self.refund = self.refund.saturating_sub(gas);
    }

    fn get_refund(&self) -> u64 {
        self.refund
    }

    fn add_log(&mut self, log: Log) {
        self.logs.push(log);
        self.journal.push(JournalEntry::Log);
    }

    fn logs(&self) -> &[Log] {
        &self.logs
    }

    fn finalize(&mut self) -> Vec<Log> {
        for address in self.destructed.drain() {
            self.accounts.remove(&address);
        }
        self.refund = 0;
        self.journal.clear();
        std::mem::take(&mut self.logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    // ==================== Basic access ====================

    #[test]
    fn test_missing_account_defaults() {
        let state = MemoryState::new();
        assert!(!state.exists(&addr(1)));
        assert!(state.is_empty(&addr(1)));
        assert_eq!(state.get_balance(&addr(1)), U256::zero());
        assert_eq!(state.get_code_hash(&addr(1)), H256::ZERO);
        assert_eq!(state.get_storage(&addr(1), &H256::ZERO), H256::ZERO);
    }

    #[test]
    fn test_mutation_creates_account() {
        let mut state = MemoryState::new();
        state.add_balance(&addr(1), U256::from(5u64));
        assert!(state.exists(&addr(1)));
        assert_eq!(state.get_code_hash(&addr(1)), EMPTY_CODE_HASH);
    }

    #[test]
    fn test_set_code_updates_hash() {
        let mut state = MemoryState::new();
        state.set_code(&addr(1), Bytes::from_static(&[0x60, 0x00]));
        assert_eq!(state.get_code_size(&addr(1)), 2);
        assert_eq!(state.get_code_hash(&addr(1)), keccak256(&[0x60, 0x00]));
        assert!(!state.is_empty(&addr(1)));
    }

    #[test]
    fn test_zero_storage_value_removes_slot() {
        let mut state = MemoryState::new();
        let key = H256::from_low_u64(1);
        state.set_storage(&addr(1), key, H256::from_low_u64(9));
        assert_eq!(state.storage_len(&addr(1)), 1);
        state.set_storage(&addr(1), key, H256::ZERO);
        assert_eq!(state.storage_len(&addr(1)), 0);
    }

    #[test]
    fn test_create_account_keeps_balance() {
        let mut state = MemoryState::new().with_account(addr(1), U256::from(7u64), &[0x00]);
        state.set_storage(&addr(1), H256::from_low_u64(1), H256::from_low_u64(1));
        state.create_account(addr(1));
        assert_eq!(state.get_balance(&addr(1)), U256::from(7u64));
        assert_eq!(state.get_code_size(&addr(1)), 0);
        assert_eq!(state.storage_len(&addr(1)), 0);
    }

    // ==================== Snapshot / revert ====================

    #[test]
    fn test_revert_restores_everything() {
        let mut state = MemoryState::new().with_account(addr(1), U256::from(100u64), &[]);
        let snap = state.snapshot();

        state.sub_balance(&addr(1), U256::from(40u64));
        state.add_balance(&addr(2), U256::from(40u64));
        state.set_nonce(&addr(1), 3);
        state.set_code(&addr(3), Bytes::from_static(&[0xfe]));
        state.set_storage(&addr(1), H256::from_low_u64(1), H256::from_low_u64(2));
        state.add_refund(15000);
        state.add_log(Log { address: addr(1), topics: vec![], data: vec![1] });
        state.self_destruct(&addr(1));

        state.revert_to_snapshot(snap);

        assert_eq!(state.get_balance(&addr(1)), U256::from(100u64));
        assert!(!state.exists(&addr(2)));
        assert!(!state.exists(&addr(3)));
        assert_eq!(state.get_nonce(&addr(1)), 0);
        assert_eq!(state.get_storage(&addr(1), &H256::from_low_u64(1)), H256::ZERO);
        assert_eq!(state.get_refund(), 0);
        assert!(state.logs().is_empty());
        assert!(!state.has_self_destructed(&addr(1)));
        assert_eq!(state.journal_len(), 0);
    }

    #[test]
    fn test_nested_snapshots() {
        let mut state = MemoryState::new();
        let key = H256::from_low_u64(1);

        state.set_storage(&addr(1), key, H256::from_low_u64(1));
        let outer = state.snapshot();
        state.set_storage(&addr(1), key, H256::from_low_u64(2));
        let inner = state.snapshot();
        state.set_storage(&addr(1), key, H256::from_low_u64(3));

        state.revert_to_snapshot(inner);
        assert_eq!(state.get_storage(&addr(1), &key), H256::from_low_u64(2));
        state.revert_to_snapshot(outer);
        assert_eq!(state.get_storage(&addr(1), &key), H256::from_low_u64(1));
    }

    #[test]
    fn test_revert_create_account_restores_previous() {
        let mut state = MemoryState::new().with_account(addr(1), U256::one(), &[0x01, 0x02]);
        let snap = state.snapshot();
        state.create_account(addr(1));
        state.revert_to_snapshot(snap);
        assert_eq!(state.get_code_size(&addr(1)), 2);
    }

    // ==================== Self-destruct ====================

    #[test]
    fn test_self_destruct_once() {
        let mut state = MemoryState::new().with_account(addr(1), U256::from(9u64), &[]);
        assert!(state.self_destruct(&addr(1)));
        assert!(!state.self_destruct(&addr(1)));
        assert_eq!(state.get_balance(&addr(1)), U256::zero());
        assert!(state.has_self_destructed(&addr(1)));
    }

    #[test]
    fn test_finalize_removes_destroyed_and_returns_logs() {
        let mut state = MemoryState::new().with_account(addr(1), U256::one(), &[]);
        state.add_log(Log { address: addr(1), topics: vec![H256::ZERO], data: vec![] });
        state.add_refund(10);
        state.self_destruct(&addr(1));

        let logs = state.finalize();
        assert_eq!(logs.len(), 1);
        assert!(!state.exists(&addr(1)));
        assert_eq!(state.get_refund(), 0);
        assert!(state.logs().is_empty());
        assert_eq!(state.journal_len(), 0);
    }

    #[test]
    fn test_sub_refund_saturates() {
        let mut state = MemoryState::new();
        state.add_refund(5);
        state.sub_refund(10);
        assert_eq!(state.get_refund(), 0);
    }
}
