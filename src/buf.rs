//! Immutable byte buffers with a zero-copy extraction path.
//!
//! Requests deserialized from the wire already pay one copy out of the
//! transport buffers; forcing a second copy for every key fragment handed to
//! the range plumbing is pure overhead. [`ByteBuf`] keeps the backing
//! allocation shared (`Arc<[u8]>`) and only materializes a fresh array when
//! the representation makes returning the backing storage incorrect.

use std::sync::Arc;

use once_cell::sync::Lazy;

static EMPTY: Lazy<Arc<[u8]>> = Lazy::new(|| Arc::from(&[][..]));

/// An immutable sequence of bytes over a shared backing allocation.
///
/// Two representations exist and the distinction is load-bearing:
///
/// * [`ByteBuf::Flat`] owns its entire backing array with no slicing. This is
///   the only shape eligible for zero-copy extraction.
/// * [`ByteBuf::Bounded`] is a sub-range view over a possibly larger array.
///   Extraction must copy, since handing out the backing array verbatim would
///   leak bytes outside the window.
///
/// Extraction dispatches on the variant, never on a capability probe, so the
/// fast path is taken only when its correctness is structurally guaranteed.
#[derive(Clone, Debug)]
pub enum ByteBuf {
    /// Directly wraps a whole backing array.
    Flat(Arc<[u8]>),
    /// A `[offset, offset + len)` window over a backing array.
    Bounded {
        /// The shared backing array, possibly larger than the window.
        backing: Arc<[u8]>,
        /// First byte of the window.
        offset: usize,
        /// Window length in bytes.
        len: usize,
    },
}

impl ByteBuf {
    /// An empty flat buffer. Used as the "unbounded" marker for range bounds.
    pub fn empty() -> Self {
        ByteBuf::Flat(Arc::clone(&EMPTY))
    }

    /// Wrap an entire byte array as a flat buffer without copying.
    ///
    /// Ownership of the bytes becomes shared; the `Arc` guarantees no caller
    /// can mutate them behind the buffer's back.
    pub fn wrap(bytes: Arc<[u8]>) -> Self {
        ByteBuf::Flat(bytes)
    }

    /// Wrap the window `[offset, offset + len)` as a bounded buffer without
    /// copying the backing array.
    ///
    /// # Panics
    ///
    /// Panics if the window falls outside the backing array. An out-of-range
    /// wrap is a programming error, not a recoverable condition.
    pub fn wrap_range(bytes: Arc<[u8]>, offset: usize, len: usize) -> Self {
        let end = offset
            .checked_add(len)
            .unwrap_or_else(|| panic!("byte window overflows: offset={offset} len={len}"));
        assert!(
            end <= bytes.len(),
            "byte window [{offset}, {end}) out of range for backing array of {}",
            bytes.len()
        );
        ByteBuf::Bounded {
            backing: bytes,
            offset,
            len,
        }
    }

    /// Extract the underlying bytes, without copying when possible.
    ///
    /// A flat buffer hands back its own backing allocation (shared, not
    /// copied); callers observe the exact same storage via [`Arc::ptr_eq`].
    /// Any other representation falls back to materializing a fresh array.
    pub fn extract(&self) -> Arc<[u8]> {
        match self {
            ByteBuf::Flat(bytes) => Arc::clone(bytes),
            ByteBuf::Bounded { .. } => Arc::from(self.as_slice()),
        }
    }

    /// Borrow the logical byte contents.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            ByteBuf::Flat(bytes) => bytes,
            ByteBuf::Bounded {
                backing,
                offset,
                len,
            } => &backing[*offset..*offset + *len],
        }
    }

    /// Materialize the logical contents into a fresh `Vec`. Always copies.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Logical length in bytes.
    pub fn len(&self) -> usize {
        match self {
            ByteBuf::Flat(bytes) => bytes.len(),
            ByteBuf::Bounded { len, .. } => *len,
        }
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ByteBuf {
    fn default() -> Self {
        ByteBuf::empty()
    }
}

// Equality is over the logical contents; a bounded view equals a flat buffer
// holding the same bytes.
impl PartialEq for ByteBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for ByteBuf {}

impl From<Arc<[u8]>> for ByteBuf {
    fn from(bytes: Arc<[u8]>) -> Self {
        ByteBuf::wrap(bytes)
    }
}

impl From<Vec<u8>> for ByteBuf {
    fn from(bytes: Vec<u8>) -> Self {
        ByteBuf::Flat(Arc::from(bytes))
    }
}

impl From<&[u8]> for ByteBuf {
    fn from(bytes: &[u8]) -> Self {
        ByteBuf::Flat(Arc::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::ByteBuf;

    #[test]
    fn flat_extract_shares_backing_storage() {
        let bytes: Arc<[u8]> = Arc::from(&[1u8, 2, 3][..]);
        let buf = ByteBuf::wrap(Arc::clone(&bytes));

        let extracted = buf.extract();
        assert!(Arc::ptr_eq(&bytes, &extracted));
        assert_eq!(&extracted[..], &[1, 2, 3]);
    }

    #[test]
    fn bounded_extract_copies_exact_window() {
        let bytes: Arc<[u8]> = Arc::from(&[1u8, 2, 3, 4, 5][..]);
        let buf = ByteBuf::wrap_range(Arc::clone(&bytes), 1, 3);

        let extracted = buf.extract();
        assert!(!Arc::ptr_eq(&bytes, &extracted));
        assert_eq!(&extracted[..], &[2, 3, 4]);
        assert_eq!(buf.as_slice(), &[2, 3, 4]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn wrap_range_rejects_out_of_range_window() {
        let bytes: Arc<[u8]> = Arc::from(&[1u8, 2, 3][..]);
        let _ = ByteBuf::wrap_range(bytes, 2, 2);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn wrap_range_rejects_overflowing_window() {
        let bytes: Arc<[u8]> = Arc::from(&[1u8, 2, 3][..]);
        let _ = ByteBuf::wrap_range(bytes, usize::MAX, 2);
    }

    #[test]
    fn equality_is_over_logical_contents() {
        let backing: Arc<[u8]> = Arc::from(&[9u8, 1, 2, 9][..]);
        let bounded = ByteBuf::wrap_range(backing, 1, 2);
        let flat = ByteBuf::from(&[1u8, 2][..]);

        assert_eq!(bounded, flat);
        assert_ne!(bounded, ByteBuf::empty());
    }

    #[test]
    fn empty_buffer_is_empty() {
        assert!(ByteBuf::empty().is_empty());
        assert_eq!(ByteBuf::default().to_vec(), Vec::<u8>::new());
    }
}
