//! Anvil: engine-controlled memory, containers and text.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Anvil sub-crates. For most users, adding `anvil` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use anvil::prelude::*;
//!
//! let mut scores: GrowableArray<i32> = (1..=10).collect();
//! scores.remove_at(3, 3);
//! assert_eq!(scores.as_slice(), &[1, 2, 3, 7, 8, 9, 10]);
//!
//! let mut ages = Map::new();
//! ages.add("Ann", 30u32);
//! let greeting = anvil::text::format_string!(
//!     "Hello {}, you are {} years old.",
//!     "Ann",
//!     *ages.get(&"Ann").unwrap(),
//! );
//! assert_eq!(greeting, "Hello Ann, you are 30 years old.");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`memory`] | `anvil-memory` | Aligned blocks, growth policies, allocator config |
//! | [`containers`] | `anvil-containers` | Array, set, map, direct-mapped table, archives |
//! | [`text`] | `anvil-text` | Encoded strings, transcoders, formatting |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Aligned allocation and growth arithmetic (`anvil-memory`).
///
/// Most users never touch blocks directly; [`memory::AllocConfig`] and
/// [`memory::GrowthPolicy`] tune how containers grow.
pub use anvil_memory as memory;

/// Containers (`anvil-containers`).
///
/// [`containers::GrowableArray`], [`containers::OpenHashSet`],
/// [`containers::Map`] and [`containers::DirectMappedTable`], plus the
/// [`containers::Archive`] visitor.
pub use anvil_containers as containers;

/// Text (`anvil-text`).
///
/// [`text::EncodedString`] and the [`text::SourceEncoding`] transcoders.
pub use anvil_text as text;

/// Common imports for typical Anvil usage.
///
/// ```rust
/// use anvil::prelude::*;
/// ```
pub mod prelude {
    // Memory
    pub use anvil_memory::{AllocConfig, GrowthPolicy};

    // Containers
    pub use anvil_containers::{
        Archivable, Archive, DirectMappedTable, GrowableArray, Map, MemoryReader, MemoryWriter,
        OpenHashSet, Pair, SlotId,
    };

    // Hashing
    pub use anvil_containers::{ByteChecksum, Fnv1a, HashEquality, ValueEquality};

    // Text
    pub use anvil_text::{format, try_format, EncodedString, FormatArgument, NPOS};

    // Errors
    pub use anvil_containers::ArchiveError;
    pub use anvil_memory::AllocError;
    pub use anvil_text::FormatError;
}
