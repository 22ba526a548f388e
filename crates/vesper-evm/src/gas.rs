//! Gas cost calculations
//!
//! Every instruction carries a [`GasFn`](crate::instructions::GasFn) that
//! prices it from the schedule in [`Params`] and, for the dynamic ones,
//! from its stack operands and the account state. Memory expansion is
//! charged separately by the interpreter through [`memory_cost`].

use vesper_primitives::{Address, H256};

use crate::error::EvmResult;
use crate::interpreter::Interpreter;
use crate::opcode::Opcode;
use crate::params::Params;
use crate::vm::Vm;
use crate::word;

/// Number of 32-byte words covering `len` bytes
pub fn words(len: u64) -> u64 {
    len / 32 + u64::from(len % 32 != 0)
}

/// Total cost of a memory of `words` words
pub fn memory_cost(params: &Params, words: u64) -> u64 {
    let linear = words.saturating_mul(params.memory_gas);
    let quadratic = words.saturating_mul(words) / params.quad_coeff_div.max(1);
    linear.saturating_add(quadratic)
}

/// Largest amount of gas a call may forward: all but one 64th of `available`
pub fn max_call_gas(available: u64) -> u64 {
    available - available / 64
}

/// Gas charged before a transaction executes
pub fn intrinsic_gas(params: &Params, data: &[u8], is_create: bool) -> u64 {
    let base = if is_create {
        params.tx_gas_contract_creation
    } else {
        params.tx_gas
    };
    let zeros = data.iter().filter(|&&b| b == 0).count() as u64;
    let non_zeros = data.len() as u64 - zeros;
    base.saturating_add(zeros.saturating_mul(params.tx_data_zero_gas))
        .saturating_add(non_zeros.saturating_mul(params.tx_data_non_zero_gas))
}

fn copy_cost(params: &Params, len: u64) -> u64 {
    words(len).saturating_mul(params.copy_gas)
}

// ==================== Tiers ====================

/// Zero tier
pub fn zero(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.zero_gas)
}

/// Base tier
pub fn base(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.base_gas)
}

/// Very-low tier
pub fn very_low(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.very_low_gas)
}

/// Low tier
pub fn low(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.low_gas)
}

/// Mid tier
pub fn mid(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.mid_gas)
}

/// High tier
pub fn high(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.high_gas)
}

/// Ext tier (BLOCKHASH)
pub fn ext(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.ext_gas)
}

// ==================== Fixed schedule entries ====================

/// JUMPDEST
pub fn jumpdest(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.jumpdest_gas)
}

/// SLOAD
pub fn sload(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.sload_gas)
}

/// BALANCE
pub fn balance(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.balance_gas)
}

/// EXTCODESIZE
pub fn extcode_size(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.extcode_size_gas)
}

/// EXTCODEHASH
pub fn extcode_hash(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.extcode_hash_gas)
}

/// CREATE; the forwarded gas is taken during execution
pub fn create(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.create_gas)
}

/// DELEGATECALL and STATICCALL carry no value
pub fn call_without_value(_: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    Ok(vm.config.params.call_gas)
}

// ==================== Operand-dependent ====================

/// EXP: priced by the byte length of the exponent
pub fn exp(interpreter: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    let params = &vm.config.params;
    let exponent = interpreter.stack().peek_at(1)?;
    Ok(params
        .exp_gas
        .saturating_add(word::byte_len(exponent).saturating_mul(params.exp_byte_gas)))
}

/// SHA3: base plus a per-word charge on the hashed length
pub fn sha3(interpreter: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    let params = &vm.config.params;
    let len = word::saturating_u64(interpreter.stack().peek_at(1)?);
    Ok(params
        .sha3_gas
        .saturating_add(words(len).saturating_mul(params.sha3_word_gas)))
}

/// CALLDATACOPY, CODECOPY and RETURNDATACOPY
pub fn copy(interpreter: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    let params = &vm.config.params;
    let len = word::saturating_u64(interpreter.stack().peek_at(2)?);
    Ok(params.very_low_gas.saturating_add(copy_cost(params, len)))
}

/// EXTCODECOPY
pub fn extcode_copy(interpreter: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    let params = &vm.config.params;
    let len = word::saturating_u64(interpreter.stack().peek_at(3)?);
    Ok(params.extcode_copy_base.saturating_add(copy_cost(params, len)))
}

/// LOG0-LOG4: base, per topic, per data byte
pub fn log(interpreter: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    let params = &vm.config.params;
    let topics = interpreter.opcode().log_topics() as u64;
    let len = word::saturating_u64(interpreter.stack().peek_at(1)?);
    Ok(params
        .log_gas
        .saturating_add(topics.saturating_mul(params.log_topic_gas))
        .saturating_add(len.saturating_mul(params.log_data_gas)))
}

/// CREATE2: CREATE cost plus hashing the init code
pub fn create2(interpreter: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    let params = &vm.config.params;
    let len = word::saturating_u64(interpreter.stack().peek_at(2)?);
    Ok(params
        .create2_gas
        .saturating_add(words(len).saturating_mul(params.sha3_word_gas)))
}

// ==================== State-dependent ====================

/// SSTORE: set, clear (with refund) or reset
pub fn sstore(interpreter: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    let params = &vm.config.params;
    let [key, value] = interpreter.stack().peek_n::<2>()?;
    let current = vm
        .storage
        .get_storage(&interpreter.frame().address, &H256::from_word(key));

    let cost = if current.is_zero() && !value.is_zero() {
        params.sstore_set_gas
    } else if !current.is_zero() && value.is_zero() {
        vm.storage.add_refund(params.sstore_refund_gas);
        params.sstore_clear_gas
    } else {
        params.sstore_reset_gas
    };
    Ok(cost)
}

/// CALL and CALLCODE: base, value surcharge and, for CALL, account creation
pub fn call(interpreter: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    let params = &vm.config.params;
    let to = Address::from_word(interpreter.stack().peek_at(1)?);
    let value = interpreter.stack().peek_at(2)?;

    let mut cost = params.call_gas;
    if !value.is_zero() {
        cost = cost.saturating_add(params.call_value_transfer_gas);
        if interpreter.opcode() == Opcode::CALL && !vm.storage.exists(&to) {
            cost = cost.saturating_add(params.call_new_account_gas);
        }
    }
    Ok(cost)
}

/// SELFDESTRUCT: surcharge for funding an empty beneficiary, refund once per account
pub fn selfdestruct(interpreter: &Interpreter, vm: &mut Vm<'_>) -> EvmResult<u64> {
    let params = &vm.config.params;
    let address = interpreter.frame().address;
    let beneficiary = Address::from_word(interpreter.stack().peek_at(0)?);

    let mut cost = params.selfdestruct_gas;
    if vm.storage.is_empty(&beneficiary) && !vm.storage.get_balance(&address).is_zero() {
        cost = cost.saturating_add(params.create_by_selfdestruct_gas);
    }
    if !vm.storage.has_self_destructed(&address) {
        vm.storage.add_refund(params.selfdestruct_refund_gas);
    }
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words() {
        assert_eq!(words(0), 0);
        assert_eq!(words(1), 1);
        assert_eq!(words(32), 1);
        assert_eq!(words(33), 2);
        assert_eq!(words(u64::MAX), u64::MAX / 32 + 1);
    }

    // ==================== Memory ====================

    #[test]
    fn test_memory_cost() {
        let params = Params::default();
        assert_eq!(memory_cost(&params, 0), 0);
        assert_eq!(memory_cost(&params, 1), 3);
        // 32 * 3 + 32^2 / 512
        assert_eq!(memory_cost(&params, 32), 98);
        // 1024 * 3 + 1024^2 / 512
        assert_eq!(memory_cost(&params, 1024), 5120);
    }

    #[test]
    fn test_memory_cost_saturates() {
        let params = Params::default();
        assert_eq!(memory_cost(&params, u64::MAX), u64::MAX);
    }

    #[test]
    fn test_memory_cost_is_monotonic() {
        let params = Params::default();
        let mut last = 0;
        for w in 0..2000 {
            let cost = memory_cost(&params, w);
            assert!(cost >= last);
            last = cost;
        }
    }

    // ==================== Calls ====================

    #[test]
    fn test_max_call_gas() {
        assert_eq!(max_call_gas(0), 0);
        assert_eq!(max_call_gas(63), 63);
        assert_eq!(max_call_gas(64), 63);
        assert_eq!(max_call_gas(6400), 6300);
    }

    // ==================== Intrinsic ====================

    #[test]
    fn test_intrinsic_gas() {
        let params = Params::default();
        assert_eq!(intrinsic_gas(&params, &[], false), 21_000);
        assert_eq!(intrinsic_gas(&params, &[], true), 53_000);
        assert_eq!(intrinsic_gas(&params, &[0, 0, 1], false), 21_000 + 4 + 4 + 68);
    }
}
