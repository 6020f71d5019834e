//! Error types for string formatting.

use std::error::Error;
use std::fmt;

/// Errors from [`try_format`](crate::format::try_format).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// Braces do not pair up, or a placeholder opens inside another.
    UnbalancedBraces {
        /// Byte offset of the offending brace.
        offset: usize,
    },
    /// A `{N}` placeholder names an argument that was not supplied.
    ArgumentIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of supplied arguments.
        count: usize,
    },
    /// A sequential `{}` placeholder ran past the supplied arguments.
    MissingArgument {
        /// Zero-based ordinal of the placeholder in the template.
        position: usize,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedBraces { offset } => {
                write!(f, "unbalanced braces in format string at byte {offset}")
            }
            Self::ArgumentIndexOutOfRange { index, count } => {
                write!(f, "argument index {index} out of range ({count} arguments)")
            }
            Self::MissingArgument { position } => {
                write!(f, "no argument left for placeholder {position}")
            }
        }
    }
}

impl Error for FormatError {}
