//! Test utilities and fixture types for Anvil development.
//!
//! Provides [`DropTracker`] for checking that containers drop every element
//! exactly once, plus archive-able fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use anvil_containers::GrowableArray;

pub use fixtures::{Record, Vertex};

/// Counts live and dropped [`Tracked`] values.
///
/// Clones share the same counters, so a tracker can be kept by the test
/// while its values move into the container under test.
#[derive(Clone, Default)]
pub struct DropTracker {
    live: Rc<Cell<usize>>,
    drops: Rc<Cell<usize>>,
}

impl DropTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracked value.
    pub fn track(&self, value: i32) -> Tracked {
        self.live.set(self.live.get() + 1);
        Tracked {
            value,
            tracker: self.clone(),
        }
    }

    /// Values created (or cloned) and not yet dropped.
    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// Values dropped so far.
    pub fn drops(&self) -> usize {
        self.drops.get()
    }
}

/// A value whose construction and destruction are counted by a
/// [`DropTracker`].
pub struct Tracked {
    value: i32,
    tracker: DropTracker,
}

impl Tracked {
    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        self.tracker.track(self.value)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.tracker.live.set(self.tracker.live.get() - 1);
        self.tracker.drops.set(self.tracker.drops.get() + 1);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.value).finish()
    }
}

/// `{1, 2, ..., n}` with capacity exactly `n`.
pub fn one_to(n: i32) -> GrowableArray<i32> {
    let values: Vec<i32> = (1..=n).collect();
    GrowableArray::from_slice(&values)
}

/// Capacities a heap-policy array passes through while growing one element
/// at a time up to `len` elements.
pub fn heap_capacity_steps(len: usize) -> Vec<usize> {
    let mut steps = Vec::new();
    let mut capacity = 0;
    for required in 1..=len {
        if required > capacity {
            capacity = if capacity == 0 {
                required.max(4)
            } else {
                required + 3 * required / 8 + 16
            };
            steps.push(capacity);
        }
    }
    steps
}
