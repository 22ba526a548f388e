//! # vesper-evm
//!
//! EVM bytecode interpreter.
//!
//! This crate provides:
//! - Word arithmetic, the operand stack and linear memory
//! - The opcode table with per-instruction gas, memory and stack rules
//! - The fetch/decode/execute loop with jump validation
//! - Nested message calls and contract creation with snapshot/revert
//! - Precompiled contracts
//! - Transaction-level gas purchase, intrinsic gas and refund settlement

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod gas;
pub mod gas_pool;
pub mod instructions;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod params;
pub mod precompiles;
pub mod stack;
pub mod state_transition;
pub mod vm;
pub mod word;

pub use config::Config;
pub use context::{BlockContext, Context, Env, TxContext};
pub use error::{EvmError, EvmResult, TransitionError};
pub use frame::Frame;
pub use gas_pool::GasPool;
pub use instructions::Instruction;
pub use interpreter::Interpreter;
pub use memory::Memory;
pub use opcode::Opcode;
pub use params::Params;
pub use precompiles::{Precompile, Precompiles};
pub use stack::Stack;
pub use state_transition::{ExecutionResult, Message, StateTransition};
pub use vm::{CallResult, CreateResult, Vm};
