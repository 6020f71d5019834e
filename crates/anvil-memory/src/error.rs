//! Allocator error types.

use std::error::Error;
use std::fmt;

/// Errors reported by the fallible allocation entry points.
///
/// The infallible entry points ([`allocate`](crate::allocate) and friends)
/// treat the same conditions as contract violations and panic instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The alignment is zero, not a power of two, or larger than the
    /// shift marker can encode.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// `count * item_size` (plus alignment padding) does not fit in `usize`.
    SizeOverflow {
        /// Number of items requested.
        count: usize,
        /// Size of one item in bytes.
        item_size: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAlignment { align } => {
                write!(
                    f,
                    "invalid alignment {align}: must be a power of two in 1..={}",
                    crate::MAX_ALIGNMENT
                )
            }
            Self::SizeOverflow { count, item_size } => {
                write!(
                    f,
                    "allocation size overflow: {count} items of {item_size} bytes"
                )
            }
        }
    }
}

impl Error for AllocError {}
