//! Error types for container serialization.

use std::error::Error;
use std::fmt;

/// Errors raised while moving containers through an [`Archive`](crate::archive::Archive).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveError {
    /// A reader ran out of bytes before a field was complete.
    UnexpectedEnd {
        /// Name of the field being read.
        name: String,
        /// Bytes the field needed.
        needed: usize,
        /// Bytes left in the source.
        remaining: usize,
    },
    /// A length prefix does not fit the target's index type.
    LengthOverflow {
        /// Name of the field being written.
        name: String,
        /// The offending element count.
        len: usize,
    },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd {
                name,
                needed,
                remaining,
            } => write!(
                f,
                "unexpected end of archive reading '{name}': needed {needed} bytes, {remaining} remaining"
            ),
            Self::LengthOverflow { name, len } => {
                write!(f, "'{name}' has {len} elements, more than a u32 count prefix can hold")
            }
        }
    }
}

impl Error for ArchiveError {}
