//! EVM operand stack

use crate::error::{EvmError, EvmResult};
use vesper_primitives::U256;

/// Default maximum depth
pub const STACK_LIMIT: usize = 1024;

/// EVM stack of 256-bit words, bounded by a depth limit
#[derive(Clone, Debug)]
pub struct Stack {
    data: Vec<U256>,
    limit: usize,
}

impl Stack {
    /// Create a new empty stack with the default limit
    pub fn new() -> Self {
        Self::with_limit(STACK_LIMIT)
    }

    /// Create a new empty stack holding at most `limit` items
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::with_capacity(limit.min(STACK_LIMIT)),
            limit,
        }
    }

    /// Maximum depth
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: U256) -> EvmResult<()> {
        if self.data.len() >= self.limit {
            return Err(EvmError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> EvmResult<U256> {
        self.data.pop().ok_or(EvmError::StackUnderflow)
    }

    /// Pop `N` values, top first. Nothing is removed if fewer than `N` are present.
    pub fn pop_n<const N: usize>(&mut self) -> EvmResult<[U256; N]> {
        let items = self.peek_n::<N>()?;
        self.data.truncate(self.data.len() - N);
        Ok(items)
    }

    /// Read the top `N` values, top first
    pub fn peek_n<const N: usize>(&self) -> EvmResult<[U256; N]> {
        if self.data.len() < N {
            return Err(EvmError::StackUnderflow);
        }
        let mut items = [U256::zero(); N];
        for (i, item) in items.iter_mut().enumerate() {
            *item = self.data[self.data.len() - 1 - i];
        }
        Ok(items)
    }

    /// Peek at a specific depth (0 = top)
    pub fn peek_at(&self, depth: usize) -> EvmResult<U256> {
        if depth >= self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        Ok(self.data[self.data.len() - 1 - depth])
    }

    /// Swap the top with the item `depth` below it (1 = second item)
    pub fn swap(&mut self, depth: usize) -> EvmResult<()> {
        if depth == 0 || depth >= self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        let len = self.data.len();
        self.data.swap(len - 1, len - 1 - depth);
        Ok(())
    }

    /// Push a copy of the item at `depth` (1 = top)
    pub fn dup(&mut self, depth: usize) -> EvmResult<()> {
        if depth == 0 || depth > self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        let value = self.data[self.data.len() - depth];
        self.push(value)
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Items bottom first
    pub fn data(&self) -> &[U256] {
        &self.data
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
