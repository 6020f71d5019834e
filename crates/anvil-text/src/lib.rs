//! Text for Anvil: a null-terminated string of 16-bit units, the
//! transcoders that feed it, and brace-placeholder formatting.
//!
//! ```text
//! narrow / UTF-8 / UTF-16 / UTF-32 source
//!        │  transcode::SourceEncoding (probe, then write in place)
//!        ▼
//! EncodedString ── GrowableArray<u16>, always [] or [.., 0]
//!        ▲
//!        │  format::try_format("{} {1:.2}", &[FormatArgument])
//! ```
//!
//! Transcoding is lossy by contract: unrepresentable input becomes
//! [`BOGUS_SYMBOL`] or is dropped, never an error.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod format;
pub mod string;
pub mod transcode;

pub use error::FormatError;
pub use format::{format, try_format, FormatArgument};
pub use string::{EncodedString, NPOS};
pub use transcode::{Char, Narrow, Native, SourceEncoding, Utf16, Utf32, Utf8, BOGUS_SYMBOL};
