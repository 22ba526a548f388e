//! # vesper-state
//!
//! Account and storage state consumed by the EVM.
//!
//! This crate provides:
//! - The [`Storage`] trait the interpreter reads and writes through
//! - [`Account`], [`Log`] and [`Snapshot`] value types
//! - [`MemoryState`], a journaled in-memory backend with O(changes) revert

#![warn(missing_docs)]
#![warn(clippy::all)]

mod memory;
mod traits;

pub use memory::MemoryState;
pub use traits::{Account, Log, Snapshot, Storage, EMPTY_CODE_HASH};
