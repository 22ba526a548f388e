//! Memory-size functions
//!
//! Each returns the number of bytes memory must cover before the
//! instruction runs, read from its stack operands without popping them.

use vesper_primitives::U256;

use crate::error::{EvmError, EvmResult};
use crate::stack::Stack;

/// End of the region `offset..offset + len`, `None` when `len` is zero.
/// Offsets and lengths beyond 32 bits cost more gas than can exist.
pub fn region(offset: U256, len: U256) -> EvmResult<Option<u64>> {
    if len.is_zero() {
        return Ok(None);
    }
    let limit = U256::from(u32::MAX);
    if offset > limit || len > limit {
        return Err(EvmError::OutOfGas);
    }
    Ok(Some(offset.low_u64() + len.low_u64()))
}

fn larger(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn operands(stack: &Stack, offset: usize, len: usize) -> EvmResult<Option<u64>> {
    region(stack.peek_at(offset)?, stack.peek_at(len)?)
}

/// MLOAD
pub fn mload(stack: &Stack) -> EvmResult<Option<u64>> {
    region(stack.peek_at(0)?, U256::from(32u64))
}

/// MSTORE
pub fn mstore(stack: &Stack) -> EvmResult<Option<u64>> {
    region(stack.peek_at(0)?, U256::from(32u64))
}

/// MSTORE8
pub fn mstore8(stack: &Stack) -> EvmResult<Option<u64>> {
    region(stack.peek_at(0)?, U256::one())
}

/// SHA3
pub fn sha3(stack: &Stack) -> EvmResult<Option<u64>> {
    operands(stack, 0, 1)
}

/// CALLDATACOPY, CODECOPY, RETURNDATACOPY
pub fn copy(stack: &Stack) -> EvmResult<Option<u64>> {
    operands(stack, 0, 2)
}

/// EXTCODECOPY
pub fn extcode_copy(stack: &Stack) -> EvmResult<Option<u64>> {
    operands(stack, 1, 3)
}

/// LOG0-LOG4
pub fn log(stack: &Stack) -> EvmResult<Option<u64>> {
    operands(stack, 0, 1)
}

/// CREATE and CREATE2 init code
pub fn create(stack: &Stack) -> EvmResult<Option<u64>> {
    operands(stack, 1, 2)
}

/// RETURN and REVERT
pub fn ret(stack: &Stack) -> EvmResult<Option<u64>> {
    operands(stack, 0, 1)
}

/// CALL and CALLCODE: the larger of the input and output regions
pub fn call(stack: &Stack) -> EvmResult<Option<u64>> {
    Ok(larger(operands(stack, 3, 4)?, operands(stack, 5, 6)?))
}

/// DELEGATECALL and STATICCALL
pub fn call_without_value(stack: &Stack) -> EvmResult<Option<u64>> {
    Ok(larger(operands(stack, 2, 3)?, operands(stack, 4, 5)?))
}
