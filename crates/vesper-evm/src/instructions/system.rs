//! Halting, call and create instructions

use bytes::Bytes;
use vesper_primitives::{Address, H256, U256};

use crate::error::{EvmError, EvmResult};
use crate::gas;
use crate::interpreter::Interpreter;
use crate::opcode::Opcode;
use crate::vm::{CallResult, CreateResult, Vm};
use crate::word;

pub fn stop(_: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    Ok(Vec::new())
}

/// RETURN: the memory region becomes the frame output
pub fn ret(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [offset, len] = interpreter.stack.pop_n::<2>()?;
    Ok(interpreter
        .memory
        .get(word::saturating_usize(offset), word::saturating_usize(len)))
}

/// REVERT: same as RETURN; the interpreter turns it into a revert
pub fn revert(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    ret(interpreter, vm)
}

pub fn invalid(_: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    Err(EvmError::InvalidOpcode(Opcode::INVALID.byte()))
}

pub fn selfdestruct(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let beneficiary = Address::from_word(interpreter.stack.pop()?);
    let address = interpreter.frame.address;
    let balance = vm.storage.get_balance(&address);
    vm.storage.add_balance(&beneficiary, balance);
    vm.storage.self_destruct(&address);
    Ok(Vec::new())
}

// ==================== Create ====================

fn input_region(interpreter: &Interpreter, offset: U256, len: U256) -> Bytes {
    Bytes::from(
        interpreter
            .memory
            .get(word::saturating_usize(offset), word::saturating_usize(len)),
    )
}

/// Reserve all but a 64th of the remaining gas for a child create
fn reserve_create_gas(interpreter: &mut Interpreter) -> EvmResult<u64> {
    let gas = gas::max_call_gas(interpreter.frame.gas);
    interpreter.frame.use_gas(gas)?;
    Ok(gas)
}

fn finish_create(interpreter: &mut Interpreter, result: CreateResult) -> EvmResult<Vec<u8>> {
    interpreter.frame.refund_gas(result.gas_left);
    let pushed = result.address.map_or_else(U256::zero, |address| address.to_word());
    interpreter.stack.push(pushed)?;
    Ok(result.output)
}

pub fn create(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [value, offset, len] = interpreter.stack.pop_n::<3>()?;
    let code = input_region(interpreter, offset, len);
    let gas = reserve_create_gas(interpreter)?;
    let result = vm.create(interpreter.frame.address, code, gas, value);
    finish_create(interpreter, result)
}

pub fn create2(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [value, offset, len, salt] = interpreter.stack.pop_n::<4>()?;
    let code = input_region(interpreter, offset, len);
    let gas = reserve_create_gas(interpreter)?;
    let result = vm.create2(
        interpreter.frame.address,
        code,
        gas,
        value,
        H256::from_word(salt),
    );
    finish_create(interpreter, result)
}

// ==================== Call ====================

/// Gas handed to a child call: the request capped by the 63/64 rule
fn reserve_call_gas(interpreter: &mut Interpreter, requested: U256) -> EvmResult<u64> {
    let available = gas::max_call_gas(interpreter.frame.gas);
    let gas = word::saturating_u64(requested).min(available);
    interpreter.frame.use_gas(gas)?;
    Ok(gas)
}

/// Refund unused gas, copy output into memory and push the success flag
fn finish_call(
    interpreter: &mut Interpreter,
    result: CallResult,
    out_offset: U256,
    out_len: U256,
) -> EvmResult<Vec<u8>> {
    interpreter.frame.refund_gas(result.gas_left);

    let copied = word::saturating_usize(out_len).min(result.output.len());
    if copied > 0 {
        interpreter.memory.set(
            word::saturating_usize(out_offset),
            copied,
            &result.output[..copied],
        )?;
    }

    interpreter
        .stack
        .push(word::from_bool(result.error.is_none()))?;
    Ok(result.output)
}

pub fn call(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [gas, to, value, in_offset, in_len, out_offset, out_len] =
        interpreter.stack.pop_n::<7>()?;
    let input = input_region(interpreter, in_offset, in_len);
    let mut gas = reserve_call_gas(interpreter, gas)?;
    if !value.is_zero() {
        gas = gas.saturating_add(vm.config.params.call_stipend);
    }

    let result = vm.call(
        interpreter.frame.address,
        Address::from_word(to),
        input,
        gas,
        value,
    );
    finish_call(interpreter, result, out_offset, out_len)
}

pub fn callcode(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [gas, to, value, in_offset, in_len, out_offset, out_len] =
        interpreter.stack.pop_n::<7>()?;
    let input = input_region(interpreter, in_offset, in_len);
    let mut gas = reserve_call_gas(interpreter, gas)?;
    if !value.is_zero() {
        gas = gas.saturating_add(vm.config.params.call_stipend);
    }

    let result = vm.call_code(
        interpreter.frame.address,
        Address::from_word(to),
        input,
        gas,
        value,
    );
    finish_call(interpreter, result, out_offset, out_len)
}

pub fn delegatecall(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [gas, to, in_offset, in_len, out_offset, out_len] = interpreter.stack.pop_n::<6>()?;
    let input = input_region(interpreter, in_offset, in_len);
    let gas = reserve_call_gas(interpreter, gas)?;

    let result = vm.delegate_call(&interpreter.frame, Address::from_word(to), input, gas);
    finish_call(interpreter, result, out_offset, out_len)
}

pub fn staticcall(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [gas, to, in_offset, in_len, out_offset, out_len] = interpreter.stack.pop_n::<6>()?;
    let input = input_region(interpreter, in_offset, in_len);
    let gas = reserve_call_gas(interpreter, gas)?;

    let result = vm.static_call(interpreter.frame.address, Address::from_word(to), input, gas);
    finish_call(interpreter, result, out_offset, out_len)
}
