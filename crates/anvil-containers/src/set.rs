//! Bucket-chained open-hashing set.
//!
//! Values live in an append-only slot array; each slot carries the id of the
//! next slot in its bucket's chain. Bucket heads are a separate array whose
//! length is 0 or a power of two, so bucket selection is a mask.
//!
//! ```text
//! buckets: [ 2 ][ - ][ 0 ][ 3 ]
//!            │         │    │
//! slots:     ▼         ▼    ▼
//!   0: a → -   1: b → -   2: c → 1   3: d → -
//! ```
//!
//! A new slot becomes the head of its chain, so chains are walked
//! most-recently-inserted first.

use std::fmt;
use std::ops::Index;

use crate::array::GrowableArray;
use crate::hash::{Comparator, Fnv1a, HashEquality, HashStrategy};

/// Handle to a slot in an [`OpenHashSet`].
///
/// Slots are never removed, so an id stays valid for the set's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u32);

impl SlotId {
    /// Position of the slot in insertion order.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    value: T,
    next: Option<SlotId>,
    // `hash & (bucket_count - 1)` as of the last link.
    bucket: u32,
}

/// Bucket count wanted for `count` live slots.
fn desired_buckets(count: usize) -> usize {
    if count < 4 {
        1
    } else {
        (count / 2 + 8).next_power_of_two()
    }
}

/// Open-hashing set with upsert semantics.
///
/// `H` hashes values and `C` decides whether two values are the same
/// entry. With the default [`HashEquality`] comparator, values with equal
/// hashes are treated as the same entry.
#[derive(Clone)]
pub struct OpenHashSet<T, H = Fnv1a, C = HashEquality> {
    slots: GrowableArray<Slot<T>>,
    buckets: GrowableArray<Option<SlotId>>,
    bucket_count: u32,
    hasher: H,
    comparator: C,
}

impl<T> OpenHashSet<T> {
    /// Create an empty set with the default strategies. Does not allocate.
    pub fn new() -> Self {
        Self::with_strategies(Fnv1a, HashEquality)
    }
}

impl<T, H, C> OpenHashSet<T, H, C> {
    /// Create an empty set with explicit hash and comparison strategies.
    pub fn with_strategies(hasher: H, comparator: C) -> Self {
        Self {
            slots: GrowableArray::new(),
            buckets: GrowableArray::new(),
            bucket_count: 0,
            hasher,
            comparator,
        }
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Alias of [`len`](Self::len).
    #[inline]
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// Whether the set has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot capacity before the slot array must grow.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Current number of buckets (0 or a power of two).
    pub fn bucket_count(&self) -> usize {
        self.bucket_count as usize
    }

    /// Bytes reserved by the slot and bucket arrays.
    pub fn size_in_bytes(&self) -> usize {
        self.slots.size_in_bytes() + self.buckets.size_in_bytes()
    }

    /// The hash strategy.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// The comparison strategy.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// The value stored at `id`, if the id is in range.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.index()).map(|slot| &slot.value)
    }

    /// Entries in slot (insertion) order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    pub(crate) fn value_mut(&mut self, id: SlotId) -> &mut T {
        &mut self.slots[id.index()].value
    }

    pub(crate) fn iter_mut_values(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().map(|slot| &mut slot.value)
    }

    /// Walk the chain for `hash` and return the first slot accepted by
    /// `matches`.
    pub(crate) fn find_id_where<F>(&self, hash: u32, mut matches: F) -> Option<SlotId>
    where
        F: FnMut(&T) -> bool,
    {
        if self.bucket_count == 0 {
            return None;
        }
        let mut cursor = self.buckets[(hash & (self.bucket_count - 1)) as usize];
        while let Some(id) = cursor {
            let slot = &self.slots[id.index()];
            if matches(&slot.value) {
                return Some(id);
            }
            cursor = slot.next;
        }
        None
    }
}

impl<T, H, C> OpenHashSet<T, H, C>
where
    H: HashStrategy<T>,
    C: Comparator<T>,
{
    /// Insert `value`, or replace the stored value it compares equal to.
    ///
    /// Returns the id of the slot now holding `value`. Replacing never
    /// changes the count or the slot id.
    ///
    /// # Panics
    ///
    /// Panics if the set already holds `u32::MAX` slots.
    pub fn add(&mut self, value: T) -> SlotId {
        let hash = self.hasher.hash(&value);
        if let Some(id) = self.find_id_by_hash(hash, &value) {
            self.slots[id.index()].value = value;
            return id;
        }

        let index = self.slots.len();
        let id = match u32::try_from(index) {
            Ok(raw) if raw < u32::MAX => SlotId(raw),
            _ => panic!("set slot count {index} exceeds u32 range"),
        };
        self.slots.add(Slot {
            value,
            next: None,
            bucket: 0,
        });
        if !self.conditional_rehash() {
            self.link(id, hash);
        }
        id
    }

    /// Add every value from `values`, upserting duplicates.
    pub fn append<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter();
        let (lower, _) = values.size_hint();
        self.slots.reserve(self.slots.len() + lower);
        for value in values {
            self.add(value);
        }
    }

    /// Reserve slots for `count` entries and size the buckets for them.
    pub fn reserve(&mut self, count: usize) {
        self.slots.reserve(count);
        let desired = desired_buckets(count);
        if desired > self.bucket_count as usize {
            self.rehash(desired);
        }
    }

    /// The stored value comparing equal to `value`.
    pub fn find(&self, value: &T) -> Option<&T> {
        self.find_id(value).map(|id| &self.slots[id.index()].value)
    }

    /// Mutable access to the stored value comparing equal to `value`.
    ///
    /// Changing the stored value's hash through this reference leaves it in
    /// the wrong chain until the next rehash.
    pub fn find_mut(&mut self, value: &T) -> Option<&mut T> {
        self.find_id(value)
            .map(|id| &mut self.slots[id.index()].value)
    }

    /// Id of the slot comparing equal to `value`.
    pub fn find_id(&self, value: &T) -> Option<SlotId> {
        self.find_id_by_hash(self.hasher.hash(value), value)
    }

    /// Like [`find_id`](Self::find_id) with a precomputed hash.
    pub fn find_id_by_hash(&self, hash: u32, value: &T) -> Option<SlotId> {
        self.find_id_where(hash, |candidate| {
            let candidate_hash = self.hasher.hash(candidate);
            self.comparator.equals(hash, value, candidate_hash, candidate)
        })
    }

    /// Whether a stored value compares equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.find_id(value).is_some()
    }

    fn link(&mut self, id: SlotId, hash: u32) {
        let bucket = hash & (self.bucket_count - 1);
        let head = self.buckets[bucket as usize];
        let slot = &mut self.slots[id.index()];
        slot.bucket = bucket;
        slot.next = head;
        self.buckets[bucket as usize] = Some(id);
    }

    /// Grow the bucket table if the live count calls for it. Returns whether
    /// a rehash (which links every slot) happened.
    fn conditional_rehash(&mut self) -> bool {
        let desired = desired_buckets(self.slots.len());
        if desired > self.bucket_count as usize {
            self.rehash(desired);
            true
        } else {
            false
        }
    }

    fn rehash(&mut self, bucket_count: usize) {
        tracing::debug!(
            from = self.bucket_count,
            to = bucket_count,
            slots = self.slots.len(),
            "rehashing set"
        );
        let bucket_count = match u32::try_from(bucket_count) {
            Ok(count) => count,
            Err(_) => panic!("bucket count {bucket_count} exceeds u32 range"),
        };
        self.buckets = GrowableArray::with_len(bucket_count as usize);
        self.bucket_count = bucket_count;
        for index in 0..self.slots.len() {
            let hash = self.hasher.hash(&self.slots[index].value);
            self.link(SlotId(index as u32), hash);
        }
    }
}

impl<T> Default for OpenHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H, C> Index<SlotId> for OpenHashSet<T, H, C> {
    type Output = T;

    fn index(&self, id: SlotId) -> &T {
        &self.slots[id.index()].value
    }
}

impl<T: fmt::Debug, H, C> fmt::Debug for OpenHashSet<T, H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for OpenHashSet<T>
where
    Fnv1a: HashStrategy<T>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.append(iter);
        set
    }
}

impl<T, H, C> Extend<T> for OpenHashSet<T, H, C>
where
    H: HashStrategy<T>,
    C: Comparator<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.append(iter);
    }
}

impl<'a, T, H, C> IntoIterator for &'a OpenHashSet<T, H, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over set entries in slot order.
pub struct Iter<'a, T> {
    inner: std::slice::Iter<'a, Slot<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|slot| &slot.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ValueEquality;
    use indexmap::IndexSet;
    use proptest::prelude::*;
    use std::hash::{Hash, Hasher};

    /// Identified by `id` only; `label` rides along.
    #[derive(Clone, Debug)]
    struct Tagged {
        id: u32,
        label: &'static str,
    }

    impl Hash for Tagged {
        fn hash<S: Hasher>(&self, state: &mut S) {
            self.id.hash(state);
        }
    }

    #[derive(Clone, Copy, Debug, Default)]
    struct Constant;

    impl HashStrategy<u32> for Constant {
        fn hash(&self, _value: &u32) -> u32 {
            7
        }
    }

    fn chain_lengths<T, H, C>(set: &OpenHashSet<T, H, C>) -> Vec<usize> {
        (0..set.bucket_count())
            .map(|bucket| {
                let mut len = 0;
                let mut cursor = set.buckets[bucket];
                while let Some(id) = cursor {
                    assert_eq!(set.slots[id.index()].bucket as usize, bucket);
                    len += 1;
                    cursor = set.slots[id.index()].next;
                }
                len
            })
            .collect()
    }

    #[test]
    fn empty_set_misses_everything() {
        let set: OpenHashSet<u32> = OpenHashSet::new();
        assert_eq!(set.bucket_count(), 0);
        assert!(set.find(&1).is_none());
        assert!(!set.contains(&1));
        assert!(set.is_empty());
    }

    #[test]
    fn add_ten_then_readd_keeps_count() {
        let mut set = OpenHashSet::new();
        for i in 1..=10u32 {
            set.add(i);
        }
        assert_eq!(set.count(), 10);
        set.add(5);
        assert_eq!(set.count(), 10);
        for i in 1..=10u32 {
            assert!(set.contains(&i), "missing {i}");
        }
        assert!(!set.contains(&11));
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut set = OpenHashSet::new();
        let first = set.add(Tagged { id: 3, label: "old" });
        set.add(Tagged { id: 4, label: "other" });
        let again = set.add(Tagged { id: 3, label: "new" });
        assert_eq!(first, again);
        assert_eq!(set.len(), 2);
        assert_eq!(set[first].label, "new");
        assert_eq!(set.find(&Tagged { id: 3, label: "" }).unwrap().label, "new");
    }

    #[test]
    fn hash_equality_merges_colliding_values() {
        let mut set = OpenHashSet::with_strategies(Constant, HashEquality);
        set.add(1u32);
        set.add(2u32);
        assert_eq!(set.len(), 1);
        assert_eq!(set.find(&99), Some(&2));
    }

    #[test]
    fn value_equality_keeps_colliding_values_apart() {
        let mut set = OpenHashSet::with_strategies(Constant, ValueEquality);
        for v in 0..20u32 {
            set.add(v);
        }
        assert_eq!(set.len(), 20);
        assert!(set.contains(&13));
        assert!(!set.contains(&99));
        let lengths = chain_lengths(&set);
        assert_eq!(lengths.iter().sum::<usize>(), 20);
        assert_eq!(lengths[7], 20);
    }

    #[test]
    fn rehash_thresholds() {
        let mut set = OpenHashSet::new();
        set.add(0u32);
        assert_eq!(set.bucket_count(), 1);
        for v in 1..4u32 {
            set.add(v);
        }
        assert_eq!(set.bucket_count(), 16);
        for v in 4..17u32 {
            set.add(v);
        }
        assert_eq!(set.bucket_count(), 16);
        set.add(17);
        assert_eq!(set.bucket_count(), 32);
        assert_eq!(chain_lengths(&set).iter().sum::<usize>(), 18);
    }

    #[test]
    fn chains_are_most_recent_first() {
        let mut set = OpenHashSet::with_strategies(Constant, ValueEquality);
        set.add(10u32);
        set.add(20u32);
        set.add(30u32);
        set.add(40u32);
        set.add(50u32);
        let head = set.buckets[7].unwrap();
        assert_eq!(set[head], 50);
        assert_eq!(set[set.slots[head.index()].next.unwrap()], 40);
    }

    #[test]
    fn reserve_presizes_buckets() {
        let mut set: OpenHashSet<u32> = OpenHashSet::new();
        set.reserve(100);
        assert!(set.capacity() >= 100);
        assert_eq!(set.bucket_count(), 64);
        set.add(1);
        assert_eq!(set.bucket_count(), 64);
        assert!(set.contains(&1));
    }

    #[test]
    fn find_mut_and_get() {
        let mut set = OpenHashSet::new();
        let id = set.add(Tagged { id: 1, label: "a" });
        set.find_mut(&Tagged { id: 1, label: "" }).unwrap().label = "b";
        assert_eq!(set.get(id).unwrap().label, "b");
        assert!(set.get(SlotId(5)).is_none());
    }

    #[test]
    fn collect_and_iterate_in_slot_order() {
        let set: OpenHashSet<u32> = [5, 3, 9, 3].into_iter().collect();
        let order: Vec<u32> = set.iter().copied().collect();
        assert_eq!(order, vec![5, 3, 9]);
        assert!(set.size_in_bytes() > 0);
    }

    #[test]
    fn collect_owned_strings() {
        let set: OpenHashSet<String> = ["tea", "coffee", "tea"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&"coffee".to_owned()));
    }

    proptest! {
        #[test]
        fn membership_matches_model(values in prop::collection::vec(0u16..512, 0..300)) {
            let mut set = OpenHashSet::with_strategies(Fnv1a, ValueEquality);
            let mut model = IndexSet::new();
            for v in &values {
                set.add(*v);
                model.insert(*v);
                prop_assert_eq!(set.len(), model.len());
            }
            for v in 0u16..512 {
                prop_assert_eq!(set.contains(&v), model.contains(&v));
            }
            let ours: Vec<u16> = set.iter().copied().collect();
            let theirs: Vec<u16> = model.iter().copied().collect();
            prop_assert_eq!(ours, theirs);
            prop_assert_eq!(chain_lengths(&set).iter().sum::<usize>(), set.len());
        }

        #[test]
        fn upsert_is_idempotent(v in any::<u64>(), extra in 1usize..5) {
            let mut set = OpenHashSet::new();
            let id = set.add(v);
            for _ in 0..extra {
                prop_assert_eq!(set.add(v), id);
            }
            prop_assert_eq!(set.len(), 1);
        }
    }
}
