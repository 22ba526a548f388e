//! EVM error types

use thiserror::Error;

/// Errors that end a frame.
///
/// [`EvmError::Revert`] keeps the frame's remaining gas; every other
/// variant consumes it. Both roll the frame's state changes back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Out of gas
    #[error("out of gas")]
    OutOfGas,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Invalid jump destination
    #[error("invalid jump destination: {0}")]
    InvalidJump(usize),

    /// Invalid opcode
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// State modification attempted in a read-only frame
    #[error("write protection")]
    WriteProtection,

    /// Memory written before it was resized
    #[error("invalid memory access")]
    InvalidMemoryAccess,

    /// Return data out of bounds
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,

    /// Deployed code larger than the configured limit
    #[error("max code size exceeded")]
    MaxCodeSizeExceeded,

    /// Contract creation collision
    #[error("contract address collision")]
    ContractAddressCollision,

    /// Insufficient balance for transfer
    #[error("insufficient balance for transfer")]
    InsufficientBalance,

    /// Call depth exceeded
    #[error("max call depth exceeded")]
    DepthExceeded,

    /// Precompile rejected its input
    #[error("precompile failed: {0}")]
    PrecompileFailed(String),

    /// `REVERT` executed
    #[error("execution reverted")]
    Revert,
}

impl EvmError {
    /// Whether the frame keeps its remaining gas
    pub fn is_revert(&self) -> bool {
        matches!(self, EvmError::Revert)
    }
}

/// Result type for EVM operations
pub type EvmResult<T> = Result<T, EvmError>;

/// Errors that reject a transaction before execution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Sender cannot pay gas limit times gas price
    #[error("insufficient balance to pay for gas")]
    InsufficientBalanceForGas,

    /// Block gas pool exhausted
    #[error("gas limit reached")]
    GasLimitReached,

    /// Gas limit below the intrinsic cost
    #[error("intrinsic gas too low: have {have}, want {want}")]
    IntrinsicGas {
        /// Gas limit supplied
        have: u64,
        /// Intrinsic cost
        want: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", EvmError::OutOfGas), "out of gas");
        assert_eq!(format!("{}", EvmError::InvalidJump(100)), "invalid jump destination: 100");
        assert_eq!(format!("{}", EvmError::InvalidOpcode(0xFE)), "invalid opcode: 0xfe");
        assert_eq!(format!("{}", EvmError::WriteProtection), "write protection");
        assert_eq!(format!("{}", EvmError::DepthExceeded), "max call depth exceeded");
        assert_eq!(
            format!("{}", EvmError::PrecompileFailed("bad input".to_string())),
            "precompile failed: bad input"
        );
    }

    #[test]
    fn test_only_revert_keeps_gas() {
        assert!(EvmError::Revert.is_revert());
        assert!(!EvmError::OutOfGas.is_revert());
        assert!(!EvmError::ContractAddressCollision.is_revert());
    }

    #[test]
    fn test_transition_error_display() {
        assert_eq!(
            TransitionError::IntrinsicGas { have: 100, want: 21000 }.to_string(),
            "intrinsic gas too low: have 100, want 21000"
        );
        assert_eq!(TransitionError::GasLimitReached.to_string(), "gas limit reached");
    }
}
