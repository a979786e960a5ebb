//! Lexicographic byte-key intervals.
//!
//! Ranges over the key space are half-open: `[start, end)`. The empty key is
//! the smallest possible key; as an end bound it means "unbounded", so
//! `[empty, empty)` covers the whole key space.

use std::{fmt, sync::Arc};

/// A key in the byte-lexicographic key space.
///
/// Keys compare byte-wise; the empty key sorts before every other key. The
/// backing bytes are shared, so cloning a key never copies them.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteKey(Arc<[u8]>);

impl ByteKey {
    /// The empty key.
    pub fn empty() -> Self {
        ByteKey(Arc::from(&[][..]))
    }

    /// Build a key by copying `bytes`.
    pub fn copy_from(bytes: &[u8]) -> Self {
        ByteKey(Arc::from(bytes))
    }

    /// Build a key from an already shared allocation without copying.
    pub fn from_shared(bytes: Arc<[u8]>) -> Self {
        ByteKey(bytes)
    }

    /// Borrow the key bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Whether this is the empty key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ByteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteKey(")?;
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// A half-open interval `[start, end)` over [`ByteKey`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteKeyRange {
    start: ByteKey,
    end: ByteKey,
}

impl ByteKeyRange {
    /// The range covering the entire key space.
    pub fn all() -> Self {
        ByteKeyRange {
            start: ByteKey::empty(),
            end: ByteKey::empty(),
        }
    }

    /// Build the range `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` while `end` is a real (non-empty) key. A
    /// disordered range is a programming error.
    pub fn of(start: ByteKey, end: ByteKey) -> Self {
        assert!(
            end.is_empty() || start <= end,
            "disordered key range: start {start:?} > end {end:?}"
        );
        ByteKeyRange { start, end }
    }

    /// Inclusive start key.
    pub fn start_key(&self) -> &ByteKey {
        &self.start
    }

    /// Exclusive end key; the empty key means unbounded.
    pub fn end_key(&self) -> &ByteKey {
        &self.end
    }

    /// Whether `key` falls inside the interval.
    pub fn contains(&self, key: &ByteKey) -> bool {
        key >= &self.start && (self.end.is_empty() || key < &self.end)
    }
}
