//! Transaction execution: gas purchase, intrinsic gas, execution and settlement

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use vesper_primitives::{Address, U256};
use vesper_state::{Log, Storage};

use crate::config::Config;
use crate::context::Context;
use crate::error::{EvmError, TransitionError};
use crate::gas;
use crate::gas_pool::GasPool;
use crate::vm::Vm;

/// A transaction as seen by the state transition
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender
    pub from: Address,
    /// Recipient, `None` for contract creation
    pub to: Option<Address>,
    /// Value in wei
    pub value: U256,
    /// Gas limit
    pub gas_limit: u64,
    /// Price per unit of gas
    pub gas_price: U256,
    /// Call data or init code
    pub data: Bytes,
}

impl Message {
    /// Whether this message deploys a contract
    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }
}

/// Outcome of an applied transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Return data or revert data
    pub output: Vec<u8>,
    /// Gas charged after refunds
    pub gas_used: u64,
    /// Why execution failed, if it did
    pub error: Option<EvmError>,
    /// Address of the deployed contract
    pub contract_address: Option<Address>,
    /// Logs emitted by a successful execution
    pub logs: Vec<Log>,
}

impl ExecutionResult {
    /// Whether execution succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Whether execution ended in REVERT
    pub fn is_revert(&self) -> bool {
        matches!(self.error, Some(EvmError::Revert))
    }
}

/// Applies messages to a state
pub struct StateTransition<'a> {
    storage: &'a mut dyn Storage,
    context: &'a dyn Context,
    config: &'a Config,
}

impl<'a> StateTransition<'a> {
    /// Create a state transition over `storage`
    pub fn new(storage: &'a mut dyn Storage, context: &'a dyn Context, config: &'a Config) -> Self {
        Self {
            storage,
            context,
            config,
        }
    }

    /// Validate, execute and settle one message.
    ///
    /// Returns `Err` only when the message is rejected outright, in which case
    /// neither the state nor `gas_pool` has changed. Failed executions are
    /// reported through [`ExecutionResult::error`], still pay for their gas and
    /// still consume the sender's nonce.
    ///
    /// Gas is bought and settled with `message.from` and `message.gas_price`,
    /// while `ORIGIN` and `GASPRICE` read the context; the caller builds the
    /// context from the same message.
    pub fn apply_message(
        &mut self,
        message: &Message,
        gas_pool: &mut GasPool,
    ) -> Result<ExecutionResult, TransitionError> {
        debug_assert_eq!(self.context.origin(), message.from, "context origin differs from sender");
        debug_assert_eq!(self.context.gas_price(), message.gas_price, "context gas price differs from message");

        let intrinsic = self.check(message, gas_pool).map_err(|error| {
            tracing::warn!(from = %message.from, gas_limit = message.gas_limit, %error, "transaction rejected");
            error
        })?;

        let upfront = U256::from(message.gas_limit).saturating_mul(message.gas_price);
        self.storage.sub_balance(&message.from, upfront);
        let nonce = self.storage.get_nonce(&message.from);
        if !message.is_create() {
            self.storage.set_nonce(&message.from, nonce.saturating_add(1));
        }

        let gas = message.gas_limit - intrinsic;
        let mut vm = Vm::new(&mut *self.storage, self.context, self.config);
        let (output, gas_left, error, contract_address) = match message.to {
            None => {
                let result = vm.create(message.from, message.data.clone(), gas, message.value);
                (result.output, result.gas_left, result.error, result.address)
            }
            Some(to) => {
                let result = vm.call(message.from, to, message.data.clone(), gas, message.value);
                (result.output, result.gas_left, result.error, None)
            }
        };

        // A create refused for depth or balance returns before consuming the nonce
        if self.storage.get_nonce(&message.from) == nonce {
            self.storage.set_nonce(&message.from, nonce.saturating_add(1));
        }

        let gas_used = self.settle(message, gas_pool, gas_left);
        let logs = self.storage.finalize();

        tracing::debug!(
            from = %message.from,
            gas_used,
            success = error.is_none(),
            logs = logs.len(),
            "transaction settled"
        );

        Ok(ExecutionResult {
            output,
            gas_used,
            error,
            contract_address,
            logs,
        })
    }

    /// Check the message can be paid for and reserve its gas in the pool.
    /// Returns the intrinsic gas.
    fn check(&self, message: &Message, gas_pool: &mut GasPool) -> Result<u64, TransitionError> {
        let upfront = U256::from(message.gas_limit).saturating_mul(message.gas_price);
        if self.storage.get_balance(&message.from) < upfront {
            return Err(TransitionError::InsufficientBalanceForGas);
        }

        gas_pool.sub_gas(message.gas_limit)?;

        let intrinsic = gas::intrinsic_gas(&self.config.params, &message.data, message.is_create());
        if message.gas_limit < intrinsic {
            gas_pool.add_gas(message.gas_limit);
            return Err(TransitionError::IntrinsicGas {
                have: message.gas_limit,
                want: intrinsic,
            });
        }
        Ok(intrinsic)
    }

    /// Apply the refund, repay the sender and the pool, pay the coinbase.
    /// Returns the gas charged.
    fn settle(&mut self, message: &Message, gas_pool: &mut GasPool, gas_left: u64) -> u64 {
        let used = message.gas_limit - gas_left;
        let refund = (used / 2).min(self.storage.get_refund());
        let gas_left = gas_left + refund;
        let gas_used = message.gas_limit - gas_left;

        self.storage.add_balance(
            &message.from,
            U256::from(gas_left).saturating_mul(message.gas_price),
        );
        gas_pool.add_gas(gas_left);
        self.storage.add_balance(
            &self.context.coinbase(),
            U256::from(gas_used).saturating_mul(message.gas_price),
        );
        gas_used
    }
}
