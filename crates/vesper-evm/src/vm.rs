//! Message calls and contract creation
//!
//! [`Vm`] owns the cross-frame state of a transaction: the storage backend,
//! the block/transaction context, the chain config, the call depth and the
//! read-only flag. Every entry point takes a snapshot before touching state
//! and reverts to it if the child frame fails, so a failed call leaves no
//! trace besides the gas it burned. None of them return `Err`; failures are
//! reported in the result.

use bytes::Bytes;
use vesper_primitives::{Address, H256, U256};
use vesper_state::{Snapshot, Storage};

use crate::config::Config;
use crate::context::Context;
use crate::error::{EvmError, EvmResult};
use crate::frame::Frame;
use crate::interpreter::Interpreter;

/// Outcome of a message call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallResult {
    /// Returned bytes, or the revert data
    pub output: Vec<u8>,
    /// Gas handed back to the caller
    pub gas_left: u64,
    /// Why the call failed, if it did
    pub error: Option<EvmError>,
}

impl CallResult {
    fn failed(error: EvmError, gas_left: u64) -> Self {
        Self {
            output: Vec::new(),
            gas_left,
            error: Some(error),
        }
    }

    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a contract creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateResult {
    /// Address of the new contract, set only on success
    pub address: Option<Address>,
    /// Revert data when the init code reverted, empty otherwise
    pub output: Vec<u8>,
    /// Gas handed back to the creator
    pub gas_left: u64,
    /// Why the creation failed, if it did
    pub error: Option<EvmError>,
}

impl CreateResult {
    fn failed(error: EvmError, gas_left: u64) -> Self {
        Self {
            address: None,
            output: Vec::new(),
            gas_left,
            error: Some(error),
        }
    }

    /// Whether the contract was deployed
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// What running a frame produced
struct FrameOutcome {
    result: EvmResult<()>,
    output: Vec<u8>,
    gas_left: u64,
}

/// Virtual machine shared by all frames of a transaction
pub struct Vm<'a> {
    /// Account state
    pub storage: &'a mut dyn Storage,
    /// Block and transaction context
    pub context: &'a dyn Context,
    /// Chain configuration
    pub config: &'a Config,
    /// Number of frames currently executing
    pub depth: usize,
    /// Whether a STATICCALL is in progress
    pub read_only: bool,
}

impl<'a> Vm<'a> {
    /// Create a VM at depth zero
    pub fn new(storage: &'a mut dyn Storage, context: &'a dyn Context, config: &'a Config) -> Self {
        Self {
            storage,
            context,
            config,
            depth: 0,
            read_only: false,
        }
    }

    fn depth_exceeded(&self) -> bool {
        self.depth > self.config.params.call_create_depth
    }

    fn can_transfer(&self, from: &Address, value: U256) -> bool {
        self.context.can_transfer(&*self.storage, from, value)
    }

    /// Call `to` with `value`, running its code at its own address
    pub fn call(
        &mut self,
        caller: Address,
        to: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallResult {
        if self.depth_exceeded() {
            return CallResult::failed(EvmError::DepthExceeded, gas);
        }
        if !self.can_transfer(&caller, value) {
            return CallResult::failed(EvmError::InsufficientBalance, gas);
        }

        let snapshot = self.storage.snapshot();
        if !self.storage.exists(&to) {
            if !self.config.is_precompile(&to) && value.is_zero() {
                return CallResult {
                    output: Vec::new(),
                    gas_left: gas,
                    error: None,
                };
            }
            self.storage.create_account(to);
        }
        self.context.transfer(&mut *self.storage, &caller, &to, value);

        let code = self.storage.get_code(&to);
        let frame = Frame::new(caller, to, value, gas)
            .with_code(to, code)
            .with_input(input)
            .with_static(self.read_only);
        self.finish_call(frame, snapshot)
    }

    /// Run the code of `to` at the caller's own address
    pub fn call_code(
        &mut self,
        caller: Address,
        to: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallResult {
        if self.depth_exceeded() {
            return CallResult::failed(EvmError::DepthExceeded, gas);
        }
        if !self.can_transfer(&caller, value) {
            return CallResult::failed(EvmError::InsufficientBalance, gas);
        }

        let snapshot = self.storage.snapshot();
        let code = self.storage.get_code(&to);
        let frame = Frame::new(caller, caller, value, gas)
            .with_code(to, code)
            .with_input(input)
            .with_static(self.read_only);
        self.finish_call(frame, snapshot)
    }

    /// Run the code of `to` in the context of `parent`: same address,
    /// caller and value, nothing transferred
    pub fn delegate_call(&mut self, parent: &Frame, to: Address, input: Bytes, gas: u64) -> CallResult {
        if self.depth_exceeded() {
            return CallResult::failed(EvmError::DepthExceeded, gas);
        }

        let snapshot = self.storage.snapshot();
        let code = self.storage.get_code(&to);
        let frame = Frame::new(parent.caller, parent.address, parent.value, gas)
            .with_code(to, code)
            .with_input(input)
            .with_static(self.read_only);
        self.finish_call(frame, snapshot)
    }

    /// Call `to` without value in read-only mode
    pub fn static_call(&mut self, caller: Address, to: Address, input: Bytes, gas: u64) -> CallResult {
        let was_read_only = std::mem::replace(&mut self.read_only, true);
        let result = self.call(caller, to, input, gas, U256::zero());
        self.read_only = was_read_only;
        result
    }

    fn finish_call(&mut self, frame: Frame, snapshot: Snapshot) -> CallResult {
        let address = frame.address;
        let outcome = self.execute(frame);
        match outcome.result {
            Ok(()) => CallResult {
                output: outcome.output,
                gas_left: outcome.gas_left,
                error: None,
            },
            Err(error) => {
                self.storage.revert_to_snapshot(snapshot);
                tracing::debug!(depth = self.depth, %address, %error, "call failed");
                if error.is_revert() {
                    CallResult {
                        output: outcome.output,
                        gas_left: outcome.gas_left,
                        error: Some(error),
                    }
                } else {
                    CallResult::failed(error, 0)
                }
            }
        }
    }

    /// Deploy `code`'s output at the address derived from the caller's nonce
    pub fn create(&mut self, caller: Address, code: Bytes, gas: u64, value: U256) -> CreateResult {
        let nonce = self.storage.get_nonce(&caller);
        let address = self.config.create_address(&caller, nonce);
        self.create_contract(caller, address, code, gas, value)
    }

    /// Deploy at the address derived from `salt` and the init code hash
    pub fn create2(
        &mut self,
        caller: Address,
        code: Bytes,
        gas: u64,
        value: U256,
        salt: H256,
    ) -> CreateResult {
        let address = self.config.create2_address(&caller, &salt, &code);
        self.create_contract(caller, address, code, gas, value)
    }

    fn create_contract(
        &mut self,
        caller: Address,
        address: Address,
        code: Bytes,
        gas: u64,
        value: U256,
    ) -> CreateResult {
        if self.depth_exceeded() {
            return CreateResult::failed(EvmError::DepthExceeded, gas);
        }
        if !self.can_transfer(&caller, value) {
            return CreateResult::failed(EvmError::InsufficientBalance, gas);
        }

        let nonce = self.storage.get_nonce(&caller);
        self.storage.set_nonce(&caller, nonce.saturating_add(1));

        if self.storage.get_nonce(&address) != 0 || self.storage.get_code_size(&address) != 0 {
            tracing::debug!(%address, "contract address collision");
            return CreateResult::failed(EvmError::ContractAddressCollision, 0);
        }

        let snapshot = self.storage.snapshot();
        self.storage.create_account(address);
        self.storage.set_nonce(&address, 1);
        self.context.transfer(&mut *self.storage, &caller, &address, value);

        let frame = Frame::new(caller, address, value, gas)
            .with_code(address, code)
            .with_static(self.read_only);
        let outcome = self.execute(frame);
        let deployed = outcome
            .result
            .and_then(|()| self.deposit_code(&address, &outcome.output, outcome.gas_left));

        match deployed {
            Ok(gas_left) => CreateResult {
                address: Some(address),
                output: Vec::new(),
                gas_left,
                error: None,
            },
            Err(error) => {
                self.storage.revert_to_snapshot(snapshot);
                tracing::debug!(depth = self.depth, %address, %error, "create failed");
                if error.is_revert() {
                    CreateResult {
                        address: None,
                        output: outcome.output,
                        gas_left: outcome.gas_left,
                        error: Some(error),
                    }
                } else {
                    CreateResult::failed(error, 0)
                }
            }
        }
    }

    /// Store the init code's output as the contract code, charging per byte
    fn deposit_code(&mut self, address: &Address, code: &[u8], gas_left: u64) -> EvmResult<u64> {
        let params = &self.config.params;
        if code.len() > params.max_code_size {
            return Err(EvmError::MaxCodeSizeExceeded);
        }
        let cost = params.create_data_gas.saturating_mul(code.len() as u64);
        let gas_left = gas_left.checked_sub(cost).ok_or(EvmError::OutOfGas)?;
        self.storage.set_code(address, Bytes::copy_from_slice(code));
        Ok(gas_left)
    }

    /// Run a frame: a precompile, nothing for code-less accounts, or the interpreter
    fn execute(&mut self, mut frame: Frame) -> FrameOutcome {
        let config = self.config;

        if let Some(precompile) = config.precompiles.get(&frame.code_address) {
            let result = frame
                .use_gas(precompile.required_gas(&frame.input))
                .and_then(|()| precompile.run(&frame.input));
            return match result {
                Ok(output) => FrameOutcome {
                    result: Ok(()),
                    output,
                    gas_left: frame.gas,
                },
                Err(error) => FrameOutcome {
                    result: Err(error),
                    output: Vec::new(),
                    gas_left: frame.gas,
                },
            };
        }

        if frame.code.is_empty() {
            return FrameOutcome {
                result: Ok(()),
                output: Vec::new(),
                gas_left: frame.gas,
            };
        }

        let mut interpreter = Interpreter::new(frame, &config.params);
        self.depth += 1;
        let result = interpreter.run(self);
        self.depth -= 1;

        let (frame, output) = interpreter.into_parts();
        FrameOutcome {
            result,
            output,
            gas_left: frame.gas,
        }
    }
}
