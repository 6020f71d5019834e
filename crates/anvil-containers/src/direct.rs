//! Fixed-capacity direct-mapped table.
//!
//! Each value maps to exactly one slot, `hash & (capacity - 1)`. There are
//! no chains: inserting into an occupied slot evicts the occupant. Useful
//! as a lossy cache where the newest entry should win.

use crate::array::GrowableArray;
use crate::hash::{Comparator, Fnv1a, HashEquality, HashStrategy};

/// A power-of-two sized table with one optional entry per slot.
#[derive(Clone, Debug)]
pub struct DirectMappedTable<T, H = Fnv1a, C = HashEquality> {
    entries: GrowableArray<Option<T>>,
    count: usize,
    hasher: H,
    comparator: C,
}

impl<T> DirectMappedTable<T> {
    /// Create a table with `capacity` slots and the default strategies.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of two.
    pub fn new(capacity: usize) -> Self {
        Self::with_strategies(capacity, Fnv1a, HashEquality)
    }
}

impl<T, H, C> DirectMappedTable<T, H, C> {
    /// Create a table with explicit strategies.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of two.
    pub fn with_strategies(capacity: usize, hasher: H, comparator: C) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "direct-mapped capacity {capacity} must be a power of two"
        );
        let mut entries = GrowableArray::with_capacity(capacity);
        entries.resize_with(capacity, || None);
        Self {
            entries,
            count: 0,
            hasher,
            comparator,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied slots.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Occupied entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().flatten()
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
        self.count = 0;
    }
}

impl<T, H, C> DirectMappedTable<T, H, C>
where
    H: HashStrategy<T>,
    C: Comparator<T>,
{
    /// Store `value` in its slot and return the evicted occupant, if any.
    pub fn insert(&mut self, value: T) -> Option<T> {
        let slot = self.slot_of(self.hasher.hash(&value));
        let evicted = self.entries[slot].replace(value);
        if evicted.is_none() {
            self.count += 1;
        }
        evicted
    }

    /// The stored value comparing equal to `value`.
    pub fn find(&self, value: &T) -> Option<&T> {
        let hash = self.hasher.hash(value);
        self.entries[self.slot_of(hash)]
            .as_ref()
            .filter(|&stored| {
                self.comparator
                    .equals(hash, value, self.hasher.hash(stored), stored)
            })
    }

    /// Whether a stored value compares equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Remove and return the stored value comparing equal to `value`.
    /// Neighbouring slots are untouched.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let hash = self.hasher.hash(value);
        let slot = self.slot_of(hash);
        let matches = match &self.entries[slot] {
            Some(stored) => {
                self.comparator
                    .equals(hash, value, self.hasher.hash(stored), stored)
            }
            None => false,
        };
        if !matches {
            return None;
        }
        self.count -= 1;
        self.entries[slot].take()
    }

    fn slot_of(&self, hash: u32) -> usize {
        hash as usize & (self.entries.len() - 1)
    }
}
