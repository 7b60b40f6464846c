//! Reusable byte buffer handed out by the pool.
//!
//! Every buffer carries a process-unique tag so callers and tests can
//! tell which allocation they are holding across acquire/release cycles.

use bytes::BytesMut;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default capacity for freshly created pool buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// A reusable byte buffer with a process-unique identity tag.
///
/// A buffer is owned by exactly one party at a time: the pool while it
/// sits on the free list, or the single caller that acquired it. The type
/// is deliberately not `Clone`, so exclusivity holds by construction.
pub struct Buffer {
    tag: u64,
    data: BytesMut,
}

impl Buffer {
    /// Create a buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a buffer with at least `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tag: NEXT_TAG.fetch_add(1, Ordering::Relaxed),
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// Process-unique identity of this buffer. Stable across reuse.
    #[inline]
    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// Clear contents while keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Consume the buffer, returning the underlying bytes.
    ///
    /// The allocation leaves the pool's accounting for good; use this when
    /// handing data to something that outlives the lease.
    pub fn into_inner(self) -> BytesMut {
        self.data
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Buffer {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.data
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.data
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("tag", &self.tag)
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_unique() {
        let a = Buffer::new();
        let b = Buffer::new();
        let c = Buffer::with_capacity(16);
        assert_ne!(a.tag(), b.tag());
        assert_ne!(b.tag(), c.tag());
        assert_ne!(a.tag(), c.tag());
    }

    #[test]
    fn test_default_capacity_is_reserved() {
        let buf = Buffer::new();
        assert!(buf.capacity() >= DEFAULT_BUFFER_CAPACITY);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_clear_keeps_allocation() {
        let mut buf = Buffer::with_capacity(64);
        buf.extend_from_slice(b"hello pool");
        assert_eq!(buf.len(), 10);
        let cap = buf.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn test_deref_exposes_bytes() {
        let mut buf = Buffer::with_capacity(32);
        buf.extend_from_slice(b"abc");
        assert_eq!(&buf[..], b"abc");
    }

    #[test]
    fn test_into_inner_hands_back_contents() {
        let mut buf = Buffer::with_capacity(32);
        buf.extend_from_slice(b"payload");
        let inner = buf.into_inner();
        assert_eq!(&inner[..], b"payload");
    }
}
