//! Arithmetic, comparison and bitwise instructions

use vesper_primitives::U256;

use super::{binary, ternary, unary};
use crate::error::EvmResult;
use crate::interpreter::Interpreter;
use crate::vm::Vm;
use crate::word;

pub fn add(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::add)
}

pub fn mul(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::mul)
}

pub fn sub(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::sub)
}

pub fn div(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::div)
}

pub fn sdiv(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::sdiv)
}

pub fn rem(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::rem)
}

pub fn smod(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::smod)
}

pub fn addmod(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    ternary(interpreter, word::addmod)
}

pub fn mulmod(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    ternary(interpreter, word::mulmod)
}

pub fn exp(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::exp)
}

pub fn signextend(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::signextend)
}

// ==================== Comparison ====================

pub fn lt(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, |a, b| word::from_bool(a < b))
}

pub fn gt(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, |a, b| word::from_bool(a > b))
}

pub fn slt(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, |a, b| word::from_bool(word::slt(a, b)))
}

pub fn sgt(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, |a, b| word::from_bool(word::sgt(a, b)))
}

pub fn eq(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, |a, b| word::from_bool(a == b))
}

pub fn iszero(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    unary(interpreter, |a| word::from_bool(a.is_zero()))
}

// ==================== Bitwise ====================

pub fn and(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, |a, b| a & b)
}

pub fn or(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, |a, b| a | b)
}

pub fn xor(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, |a, b| a ^ b)
}

pub fn not(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    unary(interpreter, |a: U256| !a)
}

pub fn byte(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::byte)
}

pub fn shl(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::shl)
}

pub fn shr(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::shr)
}

pub fn sar(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    binary(interpreter, word::sar)
}
