use alloc::vec::Vec;
use core::cmp::min;

/// Receive buffer that the transport appends to and the dispatch hub compacts.
///
/// Implementations are provided for `Vec<u8>`, for caller storage
/// ([`FixedLinearBuffer`]) and for an owned array ([`FixedBuffer`]). See the
/// `flb_*` unit tests for checks worth running against your own implementation.
pub trait UnderlyingBuffer {
    /// Removes all elements from the buffer.
    fn clear(&mut self);

    /// Returns the number of elements currently stored in the buffer.
    fn len(&self) -> usize;

    /// Minimum capacity the buffer guarantees; `Vec` reports `usize::MAX`.
    fn max_capacity(&self) -> usize;

    /// Appends as much of `other` as fits, returns the number of bytes dropped.
    fn extend_from_slice(&mut self, other: &[u8]) -> usize;

    /// Removes the first `count` elements, moving the rest to the front.
    fn drain(&mut self, count: usize);

    /// The filled part of the buffer
    fn as_slice(&self) -> &[u8];

    /// Locates the given u8 value within the buffer, returning the index (if it is found).
    fn find(&self, value: u8) -> Option<usize> {
        self.as_slice().iter().position(|elem| *elem == value)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UnderlyingBuffer for Vec<u8> {
    fn clear(&mut self) {
        self.clear();
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn max_capacity(&self) -> usize {
        usize::MAX
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        self.extend_from_slice(other);
        0
    }

    fn drain(&mut self, count: usize) {
        self.drain(0..min(count, self.len()));
    }

    fn as_slice(&self) -> &[u8] {
        self
    }
}

/// Holds a mutable reference to a fixed byte array
#[derive(Debug)]
pub struct FixedLinearBuffer<'a> {
    buffer: &'a mut [u8],
    len: usize,
}

impl<'a> FixedLinearBuffer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buffer: buf,
            len: 0,
        }
    }
}

impl UnderlyingBuffer for FixedLinearBuffer<'_> {
    fn clear(&mut self) {
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn max_capacity(&self) -> usize {
        self.buffer.len()
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        let before = self.len;
        self.len = append(self.buffer, self.len, other);
        other.len() - (self.len - before)
    }

    fn drain(&mut self, count: usize) {
        self.len = shift_front(self.buffer, self.len, count);
    }

    fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.len]
    }
}

/// Owned fixed-size receive buffer, for transports that keep it in a static
/// or on the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedBuffer<const N: usize> {
    buffer: [u8; N],
    len: usize,
}

impl<const N: usize> FixedBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            len: 0,
        }
    }
}

impl<const N: usize> Default for FixedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> UnderlyingBuffer for FixedBuffer<N> {
    fn clear(&mut self) {
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn max_capacity(&self) -> usize {
        N
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        let before = self.len;
        self.len = append(&mut self.buffer, self.len, other);
        other.len() - (self.len - before)
    }

    fn drain(&mut self, count: usize) {
        self.len = shift_front(&mut self.buffer, self.len, count);
    }

    fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.len]
    }
}

/// Copy as much of `other` as fits after `len`, returns the new length
fn append(storage: &mut [u8], len: usize, other: &[u8]) -> usize {
    let to_copy = min(other.len(), storage.len() - len);
    storage[len..len + to_copy].copy_from_slice(&other[..to_copy]);
    len + to_copy
}

/// Drop the first `count` of `len` filled bytes, returns the new length
fn shift_front(storage: &mut [u8], len: usize, count: usize) -> usize {
    if count >= len {
        return 0;
    }
    storage.copy_within(count..len, 0);
    len - count
}
