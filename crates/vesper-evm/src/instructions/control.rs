//! Stack, memory and control flow instructions

use vesper_primitives::U256;

use super::push as push_word;
use crate::error::EvmResult;
use crate::interpreter::Interpreter;
use crate::memory::copy_padded;
use crate::vm::Vm;
use crate::word;

pub fn pop(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    interpreter.stack.pop()?;
    Ok(Vec::new())
}

pub fn mload(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let offset = word::saturating_usize(interpreter.stack.pop()?);
    let value = interpreter.memory.load_word(offset);
    push_word(interpreter, value)
}

pub fn mstore(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [offset, value] = interpreter.stack.pop_n::<2>()?;
    interpreter
        .memory
        .store_word(word::saturating_usize(offset), value)?;
    Ok(Vec::new())
}

pub fn mstore8(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [offset, value] = interpreter.stack.pop_n::<2>()?;
    interpreter
        .memory
        .store_byte(word::saturating_usize(offset), value.byte(0))?;
    Ok(Vec::new())
}

// ==================== Flow ====================

pub fn jump(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let dest = interpreter.stack.pop()?;
    interpreter.jump_to(dest)?;
    Ok(Vec::new())
}

pub fn jumpi(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [dest, condition] = interpreter.stack.pop_n::<2>()?;
    if condition.is_zero() {
        interpreter.pc += 1;
    } else {
        interpreter.jump_to(dest)?;
    }
    Ok(Vec::new())
}

pub fn pc(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    // pc has already moved past this instruction
    let pc = interpreter.pc - 1;
    push_word(interpreter, U256::from(pc))
}

pub fn msize(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let size = interpreter.memory.size();
    push_word(interpreter, U256::from(size))
}

pub fn gas(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let gas = interpreter.frame.gas;
    push_word(interpreter, U256::from(gas))
}

pub fn jumpdest(_: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    Ok(Vec::new())
}

// ==================== Push, dup, swap ====================

/// PUSHn: operand bytes past the end of the code read as zero
pub fn push(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let size = interpreter.opcode.push_size();
    let operand = copy_padded(&interpreter.frame.code, interpreter.pc, size);
    interpreter.pc += size;
    push_word(interpreter, U256::from_big_endian(&operand))
}

pub fn dup(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let depth = interpreter.opcode.dup_depth();
    interpreter.stack.dup(depth)?;
    Ok(Vec::new())
}

pub fn swap(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let depth = interpreter.opcode.swap_depth();
    interpreter.stack.swap(depth)?;
    Ok(Vec::new())
}
