//! Instruction table
//!
//! Each [`Opcode`] maps to an [`Instruction`]: its stack requirements, a gas
//! function, an optional memory-size function, the function that executes
//! it and the flags the interpreter loop acts on. The mapping is a single
//! exhaustive `match`, so adding an opcode without an entry does not compile.

mod arithmetic;
mod control;
mod environment;
mod host;
pub mod sizes;
mod system;

use std::fmt;

use vesper_primitives::U256;

use crate::error::{EvmError, EvmResult};
use crate::gas;
use crate::interpreter::Interpreter;
use crate::opcode::Opcode;
use crate::stack::Stack;
use crate::vm::Vm;

/// Prices an instruction, excluding memory expansion
pub type GasFn = fn(&Interpreter, &mut Vm<'_>) -> EvmResult<u64>;

/// Byte size memory must cover for the instruction, `None` if it touches no memory
pub type MemoryFn = fn(&Stack) -> EvmResult<Option<u64>>;

/// Runs an instruction. The returned bytes are the frame output for halting
/// instructions and the new return data buffer for calls and creates.
pub type ExecFn = fn(&mut Interpreter, &mut Vm<'_>) -> EvmResult<Vec<u8>>;

/// Stack depths an instruction can start from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackRange {
    /// Items popped; also the minimum depth
    pub min: usize,
    /// Maximum depth before the pushes would overflow
    pub max: usize,
}

impl StackRange {
    /// Range for an instruction popping `pops` and pushing `pushes` items
    pub fn new(pops: usize, pushes: usize, limit: usize) -> Self {
        Self {
            min: pops,
            max: (limit + pops).saturating_sub(pushes),
        }
    }

    /// Validate a stack depth against the range
    pub fn check(&self, depth: usize) -> EvmResult<()> {
        if depth < self.min {
            return Err(EvmError::StackUnderflow);
        }
        if depth > self.max {
            return Err(EvmError::StackOverflow);
        }
        Ok(())
    }
}

/// Everything the interpreter needs to run one opcode
#[derive(Clone, Copy)]
pub struct Instruction {
    /// Opcode this entry describes
    pub opcode: Opcode,
    /// Valid stack depths
    pub stack: StackRange,
    /// Gas function
    pub gas: GasFn,
    /// Memory-size function
    pub memory: Option<MemoryFn>,
    /// Execution function
    pub execute: ExecFn,
    /// Ends the frame successfully
    pub halts: bool,
    /// Sets the program counter itself
    pub jumps: bool,
    /// Modifies state; rejected in read-only frames
    pub writes: bool,
    /// Replaces the return data buffer
    pub returns: bool,
    /// Ends the frame with a revert
    pub reverts: bool,
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("opcode", &self.opcode)
            .field("stack", &self.stack)
            .field("memory", &self.memory.is_some())
            .field("halts", &self.halts)
            .field("jumps", &self.jumps)
            .field("writes", &self.writes)
            .field("returns", &self.returns)
            .field("reverts", &self.reverts)
            .finish()
    }
}

impl Instruction {
    fn new(opcode: Opcode, stack: StackRange, gas: GasFn, execute: ExecFn) -> Self {
        Self {
            opcode,
            stack,
            gas,
            memory: None,
            execute,
            halts: false,
            jumps: false,
            writes: false,
            returns: false,
            reverts: false,
        }
    }

    fn with_memory(mut self, memory: MemoryFn) -> Self {
        self.memory = Some(memory);
        self
    }

    fn halting(mut self) -> Self {
        self.halts = true;
        self
    }

    fn jumping(mut self) -> Self {
        self.jumps = true;
        self
    }

    fn writing(mut self) -> Self {
        self.writes = true;
        self
    }

    fn returning(mut self) -> Self {
        self.returns = true;
        self
    }

    fn reverting(mut self) -> Self {
        self.reverts = true;
        self
    }

    /// Table entry for `opcode` on a stack holding at most `stack_limit` items
    pub fn for_opcode(opcode: Opcode, stack_limit: usize) -> Self {
        use Opcode::*;

        let op = |pops: usize, pushes: usize, gas: GasFn, execute: ExecFn| {
            Self::new(opcode, StackRange::new(pops, pushes, stack_limit), gas, execute)
        };

        match opcode {
            STOP => op(0, 0, gas::zero, system::stop).halting(),

            // Arithmetic
            ADD => op(2, 1, gas::very_low, arithmetic::add),
            MUL => op(2, 1, gas::low, arithmetic::mul),
            SUB => op(2, 1, gas::very_low, arithmetic::sub),
            DIV => op(2, 1, gas::low, arithmetic::div),
            SDIV => op(2, 1, gas::low, arithmetic::sdiv),
            MOD => op(2, 1, gas::low, arithmetic::rem),
            SMOD => op(2, 1, gas::low, arithmetic::smod),
            ADDMOD => op(3, 1, gas::mid, arithmetic::addmod),
            MULMOD => op(3, 1, gas::mid, arithmetic::mulmod),
            EXP => op(2, 1, gas::exp, arithmetic::exp),
            SIGNEXTEND => op(2, 1, gas::low, arithmetic::signextend),

            // Comparison and bitwise
            LT => op(2, 1, gas::very_low, arithmetic::lt),
            GT => op(2, 1, gas::very_low, arithmetic::gt),
            SLT => op(2, 1, gas::very_low, arithmetic::slt),
            SGT => op(2, 1, gas::very_low, arithmetic::sgt),
            EQ => op(2, 1, gas::very_low, arithmetic::eq),
            ISZERO => op(1, 1, gas::very_low, arithmetic::iszero),
            AND => op(2, 1, gas::very_low, arithmetic::and),
            OR => op(2, 1, gas::very_low, arithmetic::or),
            XOR => op(2, 1, gas::very_low, arithmetic::xor),
            NOT => op(1, 1, gas::very_low, arithmetic::not),
            BYTE => op(2, 1, gas::very_low, arithmetic::byte),
            SHL => op(2, 1, gas::very_low, arithmetic::shl),
            SHR => op(2, 1, gas::very_low, arithmetic::shr),
            SAR => op(2, 1, gas::very_low, arithmetic::sar),

            SHA3 => op(2, 1, gas::sha3, environment::sha3).with_memory(sizes::sha3),

            // Environment
            ADDRESS => op(0, 1, gas::base, environment::address),
            BALANCE => op(1, 1, gas::balance, environment::balance),
            ORIGIN => op(0, 1, gas::base, environment::origin),
            CALLER => op(0, 1, gas::base, environment::caller),
            CALLVALUE => op(0, 1, gas::base, environment::callvalue),
            CALLDATALOAD => op(1, 1, gas::very_low, environment::calldataload),
            CALLDATASIZE => op(0, 1, gas::base, environment::calldatasize),
            CALLDATACOPY => op(3, 0, gas::copy, environment::calldatacopy).with_memory(sizes::copy),
            CODESIZE => op(0, 1, gas::base, environment::codesize),
            CODECOPY => op(3, 0, gas::copy, environment::codecopy).with_memory(sizes::copy),
            GASPRICE => op(0, 1, gas::base, environment::gasprice),
            EXTCODESIZE => op(1, 1, gas::extcode_size, environment::extcodesize),
            EXTCODECOPY => op(4, 0, gas::extcode_copy, environment::extcodecopy)
                .with_memory(sizes::extcode_copy),
            RETURNDATASIZE => op(0, 1, gas::base, environment::returndatasize),
            RETURNDATACOPY => op(3, 0, gas::copy, environment::returndatacopy)
                .with_memory(sizes::copy),
            EXTCODEHASH => op(1, 1, gas::extcode_hash, environment::extcodehash),

            // Block
            BLOCKHASH => op(1, 1, gas::ext, environment::blockhash),
            COINBASE => op(0, 1, gas::base, environment::coinbase),
            TIMESTAMP => op(0, 1, gas::base, environment::timestamp),
            NUMBER => op(0, 1, gas::base, environment::number),
            DIFFICULTY => op(0, 1, gas::base, environment::difficulty),
            GASLIMIT => op(0, 1, gas::base, environment::gaslimit),

            // Stack, memory, storage and flow
            POP => op(1, 0, gas::base, control::pop),
            MLOAD => op(1, 1, gas::very_low, control::mload).with_memory(sizes::mload),
            MSTORE => op(2, 0, gas::very_low, control::mstore).with_memory(sizes::mstore),
            MSTORE8 => op(2, 0, gas::very_low, control::mstore8).with_memory(sizes::mstore8),
            SLOAD => op(1, 1, gas::sload, host::sload),
            SSTORE => op(2, 0, gas::sstore, host::sstore).writing(),
            JUMP => op(1, 0, gas::mid, control::jump).jumping(),
            JUMPI => op(2, 0, gas::high, control::jumpi).jumping(),
            PC => op(0, 1, gas::base, control::pc),
            MSIZE => op(0, 1, gas::base, control::msize),
            GAS => op(0, 1, gas::base, control::gas),
            JUMPDEST => op(0, 0, gas::jumpdest, control::jumpdest),

            PUSH1 | PUSH2 | PUSH3 | PUSH4 | PUSH5 | PUSH6 | PUSH7 | PUSH8 | PUSH9 | PUSH10
            | PUSH11 | PUSH12 | PUSH13 | PUSH14 | PUSH15 | PUSH16 | PUSH17 | PUSH18 | PUSH19
            | PUSH20 | PUSH21 | PUSH22 | PUSH23 | PUSH24 | PUSH25 | PUSH26 | PUSH27 | PUSH28
            | PUSH29 | PUSH30 | PUSH31 | PUSH32 => op(0, 1, gas::very_low, control::push),

            DUP1 | DUP2 | DUP3 | DUP4 | DUP5 | DUP6 | DUP7 | DUP8 | DUP9 | DUP10 | DUP11
            | DUP12 | DUP13 | DUP14 | DUP15 | DUP16 => {
                let depth = opcode.dup_depth();
                op(depth, depth + 1, gas::very_low, control::dup)
            }

            SWAP1 | SWAP2 | SWAP3 | SWAP4 | SWAP5 | SWAP6 | SWAP7 | SWAP8 | SWAP9 | SWAP10
            | SWAP11 | SWAP12 | SWAP13 | SWAP14 | SWAP15 | SWAP16 => {
                let depth = opcode.swap_depth() + 1;
                op(depth, depth, gas::very_low, control::swap)
            }

            LOG0 | LOG1 | LOG2 | LOG3 | LOG4 => {
                op(2 + opcode.log_topics(), 0, gas::log, host::log)
                    .with_memory(sizes::log)
                    .writing()
            }

            // System
            CREATE => op(3, 1, gas::create, system::create)
                .with_memory(sizes::create)
                .writing()
                .returning(),
            CALL => op(7, 1, gas::call, system::call)
                .with_memory(sizes::call)
                .returning(),
            CALLCODE => op(7, 1, gas::call, system::callcode)
                .with_memory(sizes::call)
                .returning(),
            RETURN => op(2, 0, gas::zero, system::ret)
                .with_memory(sizes::ret)
                .halting(),
            DELEGATECALL => op(6, 1, gas::call_without_value, system::delegatecall)
                .with_memory(sizes::call_without_value)
                .returning(),
            CREATE2 => op(4, 1, gas::create2, system::create2)
                .with_memory(sizes::create)
                .writing()
                .returning(),
            STATICCALL => op(6, 1, gas::call_without_value, system::staticcall)
                .with_memory(sizes::call_without_value)
                .returning(),
            REVERT => op(2, 0, gas::zero, system::revert)
                .with_memory(sizes::ret)
                .reverting(),
            INVALID => op(0, 0, gas::zero, system::invalid),
            SELFDESTRUCT => op(1, 0, gas::selfdestruct, system::selfdestruct)
                .writing()
                .halting(),
        }
    }
}

// ==================== Shared helpers ====================

fn push(interpreter: &mut Interpreter, value: U256) -> EvmResult<Vec<u8>> {
    interpreter.stack.push(value)?;
    Ok(Vec::new())
}

fn unary(interpreter: &mut Interpreter, f: fn(U256) -> U256) -> EvmResult<Vec<u8>> {
    let a = interpreter.stack.pop()?;
    push(interpreter, f(a))
}

fn binary(interpreter: &mut Interpreter, f: fn(U256, U256) -> U256) -> EvmResult<Vec<u8>> {
    let [a, b] = interpreter.stack.pop_n::<2>()?;
    push(interpreter, f(a, b))
}

fn ternary(
    interpreter: &mut Interpreter,
    f: fn(U256, U256, U256) -> U256,
) -> EvmResult<Vec<u8>> {
    let [a, b, c] = interpreter.stack.pop_n::<3>()?;
    push(interpreter, f(a, b, c))
}
