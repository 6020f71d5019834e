//! Engine containers for Anvil: growable array, open-hashing set and map.
//!
//! Every container here stores its elements in [`GrowableArray`]s, which in
//! turn own one [`anvil_memory::AlignedBlock`] each. Nothing hands out
//! addresses; sets and maps identify entries by [`SlotId`].
//!
//! # Architecture
//!
//! ```text
//! GrowableArray<T>          contiguous storage, policy-driven growth
//! ├── OpenHashSet<T, H, C>  slots: GrowableArray<Slot<T>>
//! │   │                     buckets: GrowableArray<Option<SlotId>>
//! │   └── Map<K, V, H, C>   OpenHashSet<Pair<K, V>> keyed by K
//! └── DirectMappedTable<T>  fixed power-of-two slots, last writer wins
//!
//! hash      HashStrategy (Fnv1a, ByteChecksum) + Comparator (HashEquality, ValueEquality)
//! archive   Archive visitor, MemoryReader/MemoryWriter, array framing
//! ```
//!
//! Containers are single-threaded: no internal synchronization.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod archive;
pub mod array;
pub mod direct;
pub mod error;
pub mod hash;
pub mod map;
pub mod set;

pub use archive::{
    serialize_array, serialize_pod_array, Archivable, Archive, MemoryReader, MemoryWriter,
};
pub use array::GrowableArray;
pub use direct::DirectMappedTable;
pub use error::ArchiveError;
pub use hash::{ByteChecksum, Comparator, Fnv1a, HashEquality, HashStrategy, ValueEquality};
pub use map::{Map, Pair};
pub use set::{OpenHashSet, SlotId};
