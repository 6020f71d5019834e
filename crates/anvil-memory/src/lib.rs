//! Aligned block allocation and growth arithmetic for Anvil containers.
//!
//! This is the leaf crate of the Anvil runtime. It owns every piece of
//! address arithmetic in the workspace; the container crates above it only
//! see [`AlignedBlock`] handles and element counts.
//!
//! # Architecture
//!
//! ```text
//! aligned   allocate / free / reallocate raw aligned blocks
//! │         └── 1-byte shift marker stored just before each block
//! growth    capacity arithmetic (geometric and heap policies)
//! config    AllocConfig (alignment + growth policy), validated
//! ```
//!
//! # Block layout
//!
//! ```text
//! raw start                    aligned address (returned)
//! │                            │
//! ▼                            ▼
//! ┌───────── shift bytes ─────┬──────────── size bytes ────────────┐
//! │ padding ...       │marker │ user data                          │
//! └───────────────────┴───────┴────────────────────────────────────┘
//! ```
//!
//! The marker holds `shift` (1..=256, with 256 stored as 0) so that
//! [`free`] can recover the raw start without any side table.
//!
//! This crate is the only one in the workspace that contains `unsafe`
//! outside of the container internals, and it is confined to `aligned.rs`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod aligned;
pub mod config;
pub mod error;
pub mod growth;

pub use aligned::{align_address, allocate, free, reallocate, try_allocate, AlignedBlock};
pub use config::AllocConfig;
pub use error::AllocError;
pub use growth::GrowthPolicy;

/// Default alignment, in bytes, for blocks handed out by [`allocate`].
pub const DEFAULT_ALIGNMENT: usize = 16;

/// Largest alignment the 1-byte shift marker can encode.
pub const MAX_ALIGNMENT: usize = 256;
