//! Call frame: the per-invocation execution context

use bytes::Bytes;
use vesper_primitives::{Address, U256};

use crate::error::{EvmError, EvmResult};

/// State of one message call or contract creation
#[derive(Clone, Debug)]
pub struct Frame {
    /// Account that initiated the call
    pub caller: Address,
    /// Account whose storage and balance the code acts on
    pub address: Address,
    /// Account the code was loaded from
    pub code_address: Address,
    /// Code being executed
    pub code: Bytes,
    /// Call data
    pub input: Bytes,
    /// Gas remaining
    pub gas: u64,
    /// Call value in wei
    pub value: U256,
    /// Whether state modifications are forbidden
    pub is_static: bool,
}

impl Frame {
    /// Create a frame executing at `address` with no code or input yet
    pub fn new(caller: Address, address: Address, value: U256, gas: u64) -> Self {
        Self {
            caller,
            address,
            code_address: address,
            code: Bytes::new(),
            input: Bytes::new(),
            gas,
            value,
            is_static: false,
        }
    }

    /// Set the code and the account it came from
    pub fn with_code(mut self, code_address: Address, code: Bytes) -> Self {
        self.code_address = code_address;
        self.code = code;
        self
    }

    /// Set the call data
    pub fn with_input(mut self, input: Bytes) -> Self {
        self.input = input;
        self
    }

    /// Set the read-only flag
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Deduct gas. On failure the frame's gas drops to zero.
    pub fn use_gas(&mut self, amount: u64) -> EvmResult<()> {
        match self.gas.checked_sub(amount) {
            Some(left) => {
                self.gas = left;
                Ok(())
            }
            None => {
                self.gas = 0;
                Err(EvmError::OutOfGas)
            }
        }
    }

    /// Return unused gas from a sub-call
    pub fn refund_gas(&mut self, amount: u64) {
        self.gas = self.gas.saturating_add(amount);
    }
}
