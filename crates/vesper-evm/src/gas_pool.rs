//! Block-level gas budget

use crate::error::TransitionError;

/// Gas still available to transactions in the current block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasPool(u64);

impl GasPool {
    /// Pool holding `gas`
    pub fn new(gas: u64) -> Self {
        Self(gas)
    }

    /// Return gas to the pool
    pub fn add_gas(&mut self, amount: u64) {
        self.0 = self.0.saturating_add(amount);
    }

    /// Take gas from the pool, failing without change if not enough is left
    pub fn sub_gas(&mut self, amount: u64) -> Result<(), TransitionError> {
        self.0 = self.0.checked_sub(amount).ok_or(TransitionError::GasLimitReached)?;
        Ok(())
    }

    /// Gas left
    pub fn gas(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_and_add() {
        let mut pool = GasPool::new(100_000);
        pool.sub_gas(60_000).unwrap();
        assert_eq!(pool.gas(), 40_000);
        pool.add_gas(10_000);
        assert_eq!(pool.gas(), 50_000);
    }

    #[test]
    fn test_sub_beyond_limit_fails_unchanged() {
        let mut pool = GasPool::new(10);
        assert_eq!(pool.sub_gas(11), Err(TransitionError::GasLimitReached));
        assert_eq!(pool.gas(), 10);
    }
}
