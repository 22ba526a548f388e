//! Hashing, execution environment and block information

use vesper_crypto::keccak256;
use vesper_primitives::{Address, U256};

use super::push;
use crate::error::{EvmError, EvmResult};
use crate::interpreter::Interpreter;
use crate::memory::{copy_padded, Memory};
use crate::vm::Vm;
use crate::word;

/// Most recent blocks whose hashes BLOCKHASH can see
const BLOCKHASH_WINDOW: u64 = 256;

fn copy_to_memory(
    memory: &mut Memory,
    source: &[u8],
    memory_offset: U256,
    data_offset: U256,
    len: U256,
) -> EvmResult<()> {
    if len.is_zero() {
        return Ok(());
    }
    let len = word::saturating_usize(len);
    let data = copy_padded(source, word::saturating_usize(data_offset), len);
    memory.set(word::saturating_usize(memory_offset), len, &data)
}

pub fn sha3(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [offset, len] = interpreter.stack.pop_n::<2>()?;
    let data = interpreter
        .memory
        .get(word::saturating_usize(offset), word::saturating_usize(len));
    push(interpreter, keccak256(&data).to_word())
}

// ==================== Environment ====================

pub fn address(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let address = interpreter.frame.address.to_word();
    push(interpreter, address)
}

pub fn balance(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let address = Address::from_word(interpreter.stack.pop()?);
    push(interpreter, vm.storage.get_balance(&address))
}

pub fn origin(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    push(interpreter, vm.context.origin().to_word())
}

pub fn caller(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let caller = interpreter.frame.caller.to_word();
    push(interpreter, caller)
}

pub fn callvalue(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let value = interpreter.frame.value;
    push(interpreter, value)
}

pub fn calldataload(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let offset = word::saturating_usize(interpreter.stack.pop()?);
    let data = copy_padded(&interpreter.frame.input, offset, 32);
    push(interpreter, U256::from_big_endian(&data))
}

pub fn calldatasize(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let size = interpreter.frame.input.len();
    push(interpreter, U256::from(size))
}

pub fn calldatacopy(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [memory_offset, data_offset, len] = interpreter.stack.pop_n::<3>()?;
    copy_to_memory(
        &mut interpreter.memory,
        &interpreter.frame.input,
        memory_offset,
        data_offset,
        len,
    )?;
    Ok(Vec::new())
}

pub fn codesize(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let size = interpreter.frame.code.len();
    push(interpreter, U256::from(size))
}

pub fn codecopy(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [memory_offset, code_offset, len] = interpreter.stack.pop_n::<3>()?;
    copy_to_memory(
        &mut interpreter.memory,
        &interpreter.frame.code,
        memory_offset,
        code_offset,
        len,
    )?;
    Ok(Vec::new())
}

pub fn gasprice(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    push(interpreter, vm.context.gas_price())
}

pub fn extcodesize(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let address = Address::from_word(interpreter.stack.pop()?);
    push(interpreter, U256::from(vm.storage.get_code_size(&address)))
}

pub fn extcodecopy(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [address, memory_offset, code_offset, len] = interpreter.stack.pop_n::<4>()?;
    let code = vm.storage.get_code(&Address::from_word(address));
    copy_to_memory(&mut interpreter.memory, &code, memory_offset, code_offset, len)?;
    Ok(Vec::new())
}

pub fn returndatasize(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let size = interpreter.return_data.len();
    push(interpreter, U256::from(size))
}

pub fn returndatacopy(interpreter: &mut Interpreter, _: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [memory_offset, data_offset, len] = interpreter.stack.pop_n::<3>()?;
    data_offset
        .checked_add(len)
        .and_then(word::to_usize)
        .filter(|&end| end <= interpreter.return_data.len())
        .ok_or(EvmError::ReturnDataOutOfBounds)?;
    copy_to_memory(
        &mut interpreter.memory,
        &interpreter.return_data,
        memory_offset,
        data_offset,
        len,
    )?;
    Ok(Vec::new())
}

pub fn extcodehash(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let address = Address::from_word(interpreter.stack.pop()?);
    push(interpreter, vm.storage.get_code_hash(&address).to_word())
}

// ==================== Block ====================

pub fn blockhash(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let requested = interpreter.stack.pop()?;
    let current = vm.context.number();
    let requested = (requested.bits() <= 64).then(|| requested.low_u64());
    let hash = match requested {
        Some(n) if n < current && current - n <= BLOCKHASH_WINDOW => {
            vm.context.block_hash(n).to_word()
        }
        _ => U256::zero(),
    };
    push(interpreter, hash)
}

pub fn coinbase(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    push(interpreter, vm.context.coinbase().to_word())
}

pub fn timestamp(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    push(interpreter, U256::from(vm.context.timestamp()))
}

pub fn number(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    push(interpreter, U256::from(vm.context.number()))
}

pub fn difficulty(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    push(interpreter, vm.context.difficulty())
}

pub fn gaslimit(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    push(interpreter, U256::from(vm.context.gas_limit()))
}
