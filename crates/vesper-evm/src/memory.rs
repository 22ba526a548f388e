//! EVM linear memory

use crate::error::{EvmError, EvmResult};
use vesper_primitives::U256;

/// Byte-addressable frame memory.
///
/// Grows in 32-byte words and never shrinks. Writes must target bytes
/// already covered by a [`Memory::resize`]; reads past the end yield zeros.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Get current memory size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Size in 32-byte words
    pub fn word_count(&self) -> usize {
        self.data.len() / 32
    }

    /// Grow to the smallest word multiple covering `new_len` bytes
    pub fn resize(&mut self, new_len: usize) {
        if new_len <= self.data.len() {
            return;
        }
        let aligned = new_len.div_ceil(32).saturating_mul(32);
        self.data.resize(aligned, 0);
    }

    /// Write `data` at `offset`; `len` must equal `data.len()` and the range must be allocated
    pub fn set(&mut self, offset: usize, len: usize, data: &[u8]) -> EvmResult<()> {
        if len == 0 {
            return Ok(());
        }
        let end = offset.checked_add(len).ok_or(EvmError::InvalidMemoryAccess)?;
        if end > self.data.len() || data.len() != len {
            return Err(EvmError::InvalidMemoryAccess);
        }
        self.data[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Copy `len` bytes from `offset`, zero-padded past the end
    pub fn get(&self, offset: usize, len: usize) -> Vec<u8> {
        copy_padded(&self.data, offset, len)
    }

    /// Load a 32-byte big-endian word
    pub fn load_word(&self, offset: usize) -> U256 {
        U256::from_big_endian(&self.get(offset, 32))
    }

    /// Store a 32-byte big-endian word
    pub fn store_word(&mut self, offset: usize, value: U256) -> EvmResult<()> {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        self.set(offset, 32, &bytes)
    }

    /// Store a single byte
    pub fn store_byte(&mut self, offset: usize, value: u8) -> EvmResult<()> {
        self.set(offset, 1, &[value])
    }

    /// Get raw data slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// `len` bytes of `data` starting at `offset`, zero-padded past the end
pub fn copy_padded(data: &[u8], offset: usize, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if offset < data.len() {
        let end = offset.saturating_add(len).min(data.len());
        out[..end - offset].copy_from_slice(&data[offset..end]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_padded() {
        assert_eq!(copy_padded(&[1, 2, 3], 1, 4), vec![2, 3, 0, 0]);
        assert_eq!(copy_padded(&[1, 2, 3], usize::MAX, 2), vec![0, 0]);
    }

    #[test]
    fn test_new_memory_is_empty() {
        let memory = Memory::new();
        assert_eq!(memory.size(), 0);
        assert_eq!(memory.word_count(), 0);
    }

    // ==================== Resize ====================

    #[test]
    fn test_resize_rounds_to_words() {
        let mut memory = Memory::new();
        memory.resize(1);
        assert_eq!(memory.size(), 32);
        memory.resize(33);
        assert_eq!(memory.size(), 64);
        assert_eq!(memory.word_count(), 2);
    }

    #[test]
    fn test_resize_never_shrinks() {
        let mut memory = Memory::new();
        memory.resize(96);
        memory.resize(10);
        assert_eq!(memory.size(), 96);
    }

    #[test]
    fn test_resize_zero_fills() {
        let mut memory = Memory::new();
        memory.resize(64);
        assert!(memory.data().iter().all(|&b| b == 0));
    }

    // ==================== Set / get ====================

    #[test]
    fn test_set_requires_prior_resize() {
        let mut memory = Memory::new();
        assert_eq!(memory.set(0, 1, &[0xaa]), Err(EvmError::InvalidMemoryAccess));
        memory.resize(1);
        memory.set(0, 1, &[0xaa]).unwrap();
        assert_eq!(memory.data()[0], 0xaa);
    }

    #[test]
    fn test_set_length_mismatch() {
        let mut memory = Memory::new();
        memory.resize(32);
        assert_eq!(memory.set(0, 2, &[1]), Err(EvmError::InvalidMemoryAccess));
    }

    #[test]
    fn test_set_past_end() {
        let mut memory = Memory::new();
        memory.resize(32);
        assert_eq!(memory.set(31, 2, &[1, 2]), Err(EvmError::InvalidMemoryAccess));
    }

    #[test]
    fn test_get_zero_pads() {
        let mut memory = Memory::new();
        memory.resize(32);
        memory.set(30, 2, &[0x11, 0x22]).unwrap();
        assert_eq!(memory.get(30, 4), vec![0x11, 0x22, 0, 0]);
        assert_eq!(memory.get(1000, 3), vec![0, 0, 0]);
        assert!(memory.get(0, 0).is_empty());
    }

    // ==================== Words ====================

    #[test]
    fn test_word_store_load() {
        let mut memory = Memory::new();
        memory.resize(64);
        memory.store_word(16, U256::from(0xdeadbeefu64)).unwrap();
        assert_eq!(memory.load_word(16), U256::from(0xdeadbeefu64));
        assert_eq!(memory.data()[47], 0xef);
    }

    #[test]
    fn test_store_byte() {
        let mut memory = Memory::new();
        memory.resize(32);
        memory.store_byte(31, 0x42).unwrap();
        assert_eq!(memory.load_word(0), U256::from(0x42u64));
    }
}
