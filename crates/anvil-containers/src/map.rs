//! Key/value map projected over [`OpenHashSet`].
//!
//! A [`Map`] stores [`Pair`]s in a set whose strategies only look at the key,
//! so adding an existing key replaces the pair in place.

use std::fmt;

use crate::hash::{Comparator, Fnv1a, HashEquality, HashStrategy};
use crate::set::{OpenHashSet, SlotId};

/// An owned key/value pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair<K, V> {
    /// Lookup key.
    pub key: K,
    /// Associated value.
    pub value: V,
}

impl<K, V> Pair<K, V> {
    /// Create a pair.
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

/// Hashes a [`Pair`] by its key with the wrapped strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairKeyHash<H>(pub H);

impl<K, V, H: HashStrategy<K>> HashStrategy<Pair<K, V>> for PairKeyHash<H> {
    fn hash(&self, pair: &Pair<K, V>) -> u32 {
        self.0.hash(&pair.key)
    }
}

/// Compares [`Pair`]s by key with the wrapped comparator.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairKeyEq<C>(pub C);

impl<K, V, C: Comparator<K>> Comparator<Pair<K, V>> for PairKeyEq<C> {
    fn equals(&self, lhs_hash: u32, lhs: &Pair<K, V>, rhs_hash: u32, rhs: &Pair<K, V>) -> bool {
        self.0.equals(lhs_hash, &lhs.key, rhs_hash, &rhs.key)
    }
}

/// Hash map with upsert semantics and slot-order iteration.
#[derive(Clone)]
pub struct Map<K, V, H = Fnv1a, C = HashEquality> {
    set: OpenHashSet<Pair<K, V>, PairKeyHash<H>, PairKeyEq<C>>,
}

impl<K, V> Map<K, V> {
    /// Create an empty map with the default strategies.
    pub fn new() -> Self {
        Self::with_strategies(Fnv1a, HashEquality)
    }
}

impl<K, V, H, C> Map<K, V, H, C> {
    /// Create an empty map with explicit key hash and comparison strategies.
    pub fn with_strategies(hasher: H, comparator: C) -> Self {
        Self {
            set: OpenHashSet::with_strategies(PairKeyHash(hasher), PairKeyEq(comparator)),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Alias of [`len`](Self::len).
    pub fn count(&self) -> usize {
        self.set.count()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Entry capacity before the slot array must grow.
    pub fn capacity(&self) -> usize {
        self.set.capacity()
    }

    /// Bytes reserved by the underlying set.
    pub fn size_in_bytes(&self) -> usize {
        self.set.size_in_bytes()
    }

    /// Entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.set.iter().map(|pair| (&pair.key, &pair.value))
    }

    /// Keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.set.iter().map(|pair| &pair.key)
    }

    /// Values in slot order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.set.iter().map(|pair| &pair.value)
    }

    /// Mutable values in slot order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.set.iter_mut_values().map(|pair| &mut pair.value)
    }

    /// The pair stored at `id`.
    pub fn get_pair(&self, id: SlotId) -> Option<&Pair<K, V>> {
        self.set.get(id)
    }
}

impl<K, V, H, C> Map<K, V, H, C>
where
    H: HashStrategy<K>,
    C: Comparator<K>,
{
    /// Insert or replace the entry for `key`, returning the stored value.
    pub fn add(&mut self, key: K, value: V) -> &mut V {
        let id = self.set.add(Pair { key, value });
        &mut self.set.value_mut(id).value
    }

    /// Same as [`add`](Self::add); the pair is built directly from its parts.
    pub fn emplace(&mut self, key: K, value: V) -> &mut V {
        self.add(key, value)
    }

    /// The value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_id(key).map(|id| &self.set[id].value)
    }

    /// Mutable access to the value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.find_id(key).map(|id| &mut self.set.value_mut(id).value)
    }

    /// Whether `key` has an entry.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_id(key).is_some()
    }

    fn find_id(&self, key: &K) -> Option<SlotId> {
        let hasher = &self.set.hasher().0;
        let comparator = &self.set.comparator().0;
        let hash = hasher.hash(key);
        self.set.find_id_where(hash, |pair| {
            comparator.equals(hash, key, hasher.hash(&pair.key), &pair.key)
        })
    }
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H, C> fmt::Debug for Map<K, V, H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Map<K, V>
where
    Fnv1a: HashStrategy<K>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, H, C> Extend<(K, V)> for Map<K, V, H, C>
where
    H: HashStrategy<K>,
    C: Comparator<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.set
            .append(iter.into_iter().map(|(key, value)| Pair { key, value }));
    }
}
