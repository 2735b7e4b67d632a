//! Reusable staging buffer for extracted string arguments.
//!
//! Each parse adjusts the buffer to the length of the argument text, so a
//! correctly tokenized string can never exceed it. Pushing past the limit
//! fails with [`BufferOverflow`] instead of growing.

use crate::error::BufferOverflow;

/// Initial capacity, large enough for any ordinary chat line.
const DEFAULT_CAPACITY: usize = 512;

/// Growable byte buffer with a per-parse limit.
#[derive(Debug, Clone)]
pub struct ScratchBuffer {
    data: Vec<u8>,
    limit: usize,
}

impl ScratchBuffer {
    /// Create a buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a buffer with the given capacity and limit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            limit: capacity,
        }
    }

    /// Clear the contents and set the limit to `len`, growing if needed.
    pub fn adjust(&mut self, len: usize) {
        self.data.clear();
        if self.data.capacity() < len {
            self.data.reserve(len);
        }
        self.limit = len;
    }

    /// Discard the staged bytes.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Append one byte.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<(), BufferOverflow> {
        if self.data.len() >= self.limit {
            return Err(BufferOverflow { limit: self.limit });
        }
        self.data.push(byte);
        Ok(())
    }

    /// Append a slice, failing without writing anything if it would not fit.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<(), BufferOverflow> {
        if self.data.len() + bytes.len() > self.limit {
            return Err(BufferOverflow { limit: self.limit });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Remove the last staged byte.
    #[inline]
    pub fn pop(&mut self) -> Option<u8> {
        self.data.pop()
    }

    /// ASCII-lowercase the staged bytes.
    pub fn make_lowercase(&mut self) {
        self.data.make_ascii_lowercase();
    }

    /// ASCII-uppercase the staged bytes.
    pub fn make_uppercase(&mut self) {
        self.data.make_ascii_uppercase();
    }

    /// Staged bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of staged bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing is staged.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current limit.
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Materialize the staged bytes as a string and clear the buffer.
    pub fn take_string(&mut self) -> String {
        let s = String::from_utf8_lossy(&self.data).into_owned();
        self.data.clear();
        s
    }
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new()
    }
}
