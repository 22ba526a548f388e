//! # vesper-primitives
//!
//! Primitive types shared by the Vesper EVM crates.
//!
//! - [`Address`]: 20-byte account address
//! - [`H256`]: 32-byte hash / storage slot
//! - [`U256`]: 256-bit machine word (re-exported from `primitive-types`)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;
