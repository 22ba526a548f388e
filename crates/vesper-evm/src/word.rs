//! 256-bit word arithmetic
//!
//! Unsigned operations wrap modulo 2^256. Signed operations reinterpret the
//! word as two's complement. Division and modulo by zero yield zero.

use primitive_types::U512;
use vesper_primitives::U256;

/// Word with only the sign bit set (the most negative signed value)
pub fn min_signed() -> U256 {
    U256::one() << 255usize
}

/// Build a word from a comparison result
pub fn from_bool(value: bool) -> U256 {
    if value {
        U256::one()
    } else {
        U256::zero()
    }
}

/// Whether the sign bit is set
pub fn is_negative(value: U256) -> bool {
    value.bit(255)
}

/// Two's complement negation
pub fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

fn abs(value: U256) -> U256 {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

/// Low 256 bits of a 512-bit value
fn truncate(value: U512) -> U256 {
    let mut buf = [0u8; 64];
    value.to_big_endian(&mut buf);
    U256::from_big_endian(&buf[32..])
}

/// Wrapping addition
pub fn add(a: U256, b: U256) -> U256 {
    a.overflowing_add(b).0
}

/// Wrapping subtraction
pub fn sub(a: U256, b: U256) -> U256 {
    a.overflowing_sub(b).0
}

/// Wrapping multiplication
pub fn mul(a: U256, b: U256) -> U256 {
    a.overflowing_mul(b).0
}

/// Unsigned division
pub fn div(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a / b
    }
}

/// Signed division, truncating toward zero. `MIN / -1` wraps to `MIN`.
pub fn sdiv(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let min = min_signed();
    if a == min && b == U256::MAX {
        return min;
    }
    let quotient = abs(a) / abs(b);
    if is_negative(a) != is_negative(b) {
        negate(quotient)
    } else {
        quotient
    }
}

/// Unsigned modulo
pub fn rem(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        U256::zero()
    } else {
        a % b
    }
}

/// Signed modulo; the result takes the dividend's sign
pub fn smod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let r = abs(a) % abs(b);
    if is_negative(a) {
        negate(r)
    } else {
        r
    }
}

/// `(a + b) % m` without intermediate overflow
pub fn addmod(a: U256, b: U256, m: U256) -> U256 {
    if m.is_zero() {
        return U256::zero();
    }
    truncate((U512::from(a) + U512::from(b)) % U512::from(m))
}

/// `(a * b) % m` without intermediate overflow
pub fn mulmod(a: U256, b: U256, m: U256) -> U256 {
    if m.is_zero() {
        return U256::zero();
    }
    truncate(a.full_mul(b) % U512::from(m))
}

/// `base ^ exponent` mod 2^256 by repeated squaring
pub fn exp(mut base: U256, mut exponent: U256) -> U256 {
    let mut result = U256::one();
    while !exponent.is_zero() {
        if exponent.bit(0) {
            result = mul(result, base);
        }
        exponent = exponent >> 1usize;
        base = mul(base, base);
    }
    result
}

/// Extend the sign of the byte at `index` (0 = least significant)
pub fn signextend(index: U256, value: U256) -> U256 {
    if index >= U256::from(31u64) {
        return value;
    }
    let bit = index.low_u64() as usize * 8 + 7;
    let mask = (U256::one() << bit) - U256::one();
    if value.bit(bit) {
        value | !mask
    } else {
        value & mask
    }
}

/// Byte `index` of `value`, counting from the most significant byte
pub fn byte(index: U256, value: U256) -> U256 {
    if index >= U256::from(32u64) {
        return U256::zero();
    }
    U256::from(value.byte(31 - index.low_u64() as usize))
}

/// Logical shift left
pub fn shl(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256u64) {
        U256::zero()
    } else {
        value << shift.low_u64() as usize
    }
}

/// Logical shift right
pub fn shr(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256u64) {
        U256::zero()
    } else {
        value >> shift.low_u64() as usize
    }
}

/// Arithmetic shift right
pub fn sar(shift: U256, value: U256) -> U256 {
    let negative = is_negative(value);
    if shift >= U256::from(256u64) {
        return if negative { U256::MAX } else { U256::zero() };
    }
    let shift = shift.low_u64() as usize;
    if negative {
        !((!value) >> shift)
    } else {
        value >> shift
    }
}

/// Signed less-than
pub fn slt(a: U256, b: U256) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

/// Signed greater-than
pub fn sgt(a: U256, b: U256) -> bool {
    slt(b, a)
}

/// Number of significant bytes
pub fn byte_len(value: U256) -> u64 {
    (value.bits() as u64 + 7) / 8
}

/// Convert to `usize` if the value fits
pub fn to_usize(value: U256) -> Option<usize> {
    if value.bits() > 64 {
        return None;
    }
    usize::try_from(value.low_u64()).ok()
}

/// Convert to `usize`, clamping at `usize::MAX`
pub fn saturating_usize(value: U256) -> usize {
    to_usize(value).unwrap_or(usize::MAX)
}

/// Convert to `u64`, clamping at `u64::MAX`
pub fn saturating_u64(value: U256) -> u64 {
    if value.bits() > 64 {
        u64::MAX
    } else {
        value.low_u64()
    }
}
