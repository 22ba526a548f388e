//! Storage and log instructions

use vesper_primitives::H256;
use vesper_state::Log;

use super::push;
use crate::error::EvmResult;
use crate::interpreter::Interpreter;
use crate::vm::Vm;
use crate::word;

pub fn sload(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let key = H256::from_word(interpreter.stack.pop()?);
    let value = vm.storage.get_storage(&interpreter.frame.address, &key);
    push(interpreter, value.to_word())
}

pub fn sstore(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [key, value] = interpreter.stack.pop_n::<2>()?;
    vm.storage.set_storage(
        &interpreter.frame.address,
        H256::from_word(key),
        H256::from_word(value),
    );
    Ok(Vec::new())
}

/// LOG0-LOG4
pub fn log(interpreter: &mut Interpreter, vm: &mut Vm<'_>) -> EvmResult<Vec<u8>> {
    let [offset, len] = interpreter.stack.pop_n::<2>()?;
    let topics = (0..interpreter.opcode.log_topics())
        .map(|_| interpreter.stack.pop().map(H256::from_word))
        .collect::<EvmResult<Vec<_>>>()?;
    let data = interpreter
        .memory
        .get(word::saturating_usize(offset), word::saturating_usize(len));

    vm.storage.add_log(Log {
        address: interpreter.frame.address,
        topics,
        data,
    });
    Ok(Vec::new())
}
