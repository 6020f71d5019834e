//! Contiguous growable array backed by an [`AlignedBlock`].
//!
//! [`GrowableArray`] owns exactly one block. Elements `[0, len)` are
//! initialised, `[len, capacity)` is raw memory. Growth reallocates the
//! block according to the array's [`GrowthPolicy`](anvil_memory::GrowthPolicy).

#![allow(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use anvil_memory::{reallocate, AlignedBlock, AllocConfig};

/// A contiguous, resizable sequence of `T` with engine-controlled growth.
///
/// Copying (`Clone`) deep-copies the live elements into a block of exactly
/// `len` slots. Moving out with [`std::mem::take`] leaves the source empty
/// with zero capacity, ready for reuse.
pub struct GrowableArray<T> {
    block: Option<AlignedBlock>,
    len: usize,
    capacity: usize,
    config: AllocConfig,
    _owns: PhantomData<T>,
}

// SAFETY: the array owns its elements exclusively, like `Vec<T>`.
unsafe impl<T: Send> Send for GrowableArray<T> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync> Sync for GrowableArray<T> {}

impl<T> GrowableArray<T> {
    /// Create an empty array with the default config. Does not allocate.
    pub fn new() -> Self {
        Self::with_config(AllocConfig::default())
    }

    /// Create an empty array with an explicit layout config.
    ///
    /// # Panics
    ///
    /// Panics if the effective alignment for `T` cannot be encoded.
    pub fn with_config(config: AllocConfig) -> Self {
        let effective = config.with_alignment(config.alignment_for::<T>());
        if let Err(e) = effective.validate() {
            panic!("{e}");
        }
        Self {
            block: None,
            len: 0,
            capacity: 0,
            config: effective,
            _owns: PhantomData,
        }
    }

    /// Create an empty array with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut array = Self::new();
        array.reserve(capacity);
        array
    }

    /// Create an array of `count` default-constructed elements with
    /// capacity exactly `count`.
    pub fn with_len(count: usize) -> Self
    where
        T: Default,
    {
        let mut array = Self::with_capacity(count);
        array.add_default(count);
        array
    }

    /// Deep-copy a slice into a new array of capacity exactly `items.len()`.
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        let mut array = Self::with_config(AllocConfig::default());
        array.reserve(items.len());
        for item in items {
            array.emplace_with(|| item.clone());
        }
        array
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live elements. Says nothing about capacity.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current block can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes reserved for elements (`capacity * size_of::<T>()`).
    pub fn size_in_bytes(&self) -> usize {
        self.capacity * mem::size_of::<T>()
    }

    /// The layout config this array was built with.
    pub fn config(&self) -> &AllocConfig {
        &self.config
    }

    /// View the live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is initialised and the pointer is aligned and
        // non-null (dangling only when `len == 0` or `T` is zero-sized).
        unsafe { slice::from_raw_parts(self.data_ptr().as_ptr(), self.len) }
    }

    /// Mutably view the live elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, plus `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.data_ptr().as_ptr(), self.len) }
    }

    /// Append an element and return a reference to it.
    pub fn add(&mut self, item: T) -> &mut T {
        let index = self.emplace_with(|| item);
        &mut self.as_mut_slice()[index]
    }

    /// Construct an element directly in the next slot and return its index.
    ///
    /// The array grows before `make` runs, so `make` writes straight into
    /// the final storage.
    pub fn emplace_with<F>(&mut self, make: F) -> usize
    where
        F: FnOnce() -> T,
    {
        let index = self.len;
        self.grow_for(index + 1);
        // SAFETY: `grow_for` guarantees `capacity > index`, and slot `index`
        // is raw memory.
        unsafe { self.data_ptr().as_ptr().add(index).write(make()) };
        self.len = index + 1;
        index
    }

    /// Append `count` default-constructed elements. Returns the index of the
    /// first new element (the old length).
    pub fn add_default(&mut self, count: usize) -> usize
    where
        T: Default,
    {
        let old_len = self.len;
        self.grow_for(old_len + count);
        for _ in 0..count {
            self.emplace_with(T::default);
        }
        old_len
    }

    /// Insert `item` at `index`, shifting the tail up by one.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, item: T) {
        let len = self.len;
        assert!(index <= len, "insert index {index} out of bounds (len {len})");
        self.grow_for(len + 1);
        // SAFETY: capacity >= len + 1, so the shifted tail fits; the gap at
        // `index` is then overwritten without dropping.
        unsafe {
            let base = self.data_ptr().as_ptr();
            ptr::copy(base.add(index), base.add(index + 1), len - index);
            base.add(index).write(item);
        }
        self.len = len + 1;
    }

    /// Insert clones of `items` at `index`, shifting the tail up.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_slice(&mut self, index: usize, items: &[T])
    where
        T: Clone,
    {
        let len = self.len;
        assert!(index <= len, "insert index {index} out of bounds (len {len})");
        self.check_address(items);
        let count = items.len();
        if count == 0 {
            return;
        }
        self.grow_for(len + count);

        // Until the gap is filled, only `[0, index)` is considered live, so a
        // panicking `clone` leaks the tail instead of double-dropping it.
        self.len = index;
        // SAFETY: capacity >= len + count; the tail moves into raw memory and
        // the gap `[index, index + count)` is written exactly once.
        unsafe {
            let base = self.data_ptr().as_ptr();
            ptr::copy(base.add(index), base.add(index + count), len - index);
            for (offset, item) in items.iter().enumerate() {
                base.add(index + offset).write(item.clone());
            }
        }
        self.len = len + count;
    }

    /// Append clones of `items` at the end.
    pub fn append_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.check_address(items);
        self.grow_for(self.len + items.len());
        for item in items {
            self.emplace_with(|| item.clone());
        }
    }

    /// Remove `count` elements starting at `index`, keeping the order of the
    /// remaining ones. Capacity is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `count == 0` or `index + count > len`.
    pub fn remove_at(&mut self, index: usize, count: usize) {
        let len = self.len;
        assert!(count > 0, "remove_at requires a non-zero count");
        assert!(
            index.checked_add(count).is_some_and(|end| end <= len),
            "remove range {index}..{} out of bounds (len {len})",
            index.saturating_add(count)
        );

        self.len = index;
        // SAFETY: `[index, index + count)` is live and dropped exactly once;
        // the tail is then moved down over it.
        unsafe {
            let base = self.data_ptr().as_ptr();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(index), count));
            ptr::copy(base.add(index + count), base.add(index), len - index - count);
        }
        self.len = len - count;
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is now outside the live range.
        Some(unsafe { self.data_ptr().as_ptr().add(self.len).read() })
    }

    /// Drop every element. Capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drop elements past `len`. No-op when already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let excess = self.len - len;
        self.len = len;
        // SAFETY: `[len, len + excess)` was live and is now outside the
        // live range.
        unsafe {
            let tail = self.data_ptr().as_ptr().add(len);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(tail, excess));
        }
    }

    /// Ensure room for at least `capacity` elements. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.capacity {
            let exact = self.config.growth.reserve(capacity);
            self.realloc_to(exact);
        }
    }

    /// Resize to `len` elements, default-constructing new ones or dropping
    /// the excess. Shrinking keeps the capacity.
    pub fn resize(&mut self, len: usize)
    where
        T: Default,
    {
        self.resize_with(len, T::default);
    }

    /// Resize to `len` elements, filling new slots from `fill`.
    pub fn resize_with<F>(&mut self, len: usize, mut fill: F)
    where
        F: FnMut() -> T,
    {
        if len <= self.len {
            self.truncate(len);
            return;
        }
        self.grow_for(len);
        while self.len < len {
            self.emplace_with(&mut fill);
        }
    }

    /// Release unused capacity. An empty array gives its block back.
    pub fn shrink_to_fit(&mut self) {
        if self.capacity > self.len {
            self.realloc_to(self.len);
        }
    }

    /// Index of the first element equal to `item`.
    pub fn find(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|candidate| candidate == item)
    }

    fn data_ptr(&self) -> NonNull<T> {
        match &self.block {
            Some(block) => block.cast(),
            None => NonNull::dangling(),
        }
    }

    /// Grow with the configured policy so that `required` elements fit.
    fn grow_for(&mut self, required: usize) {
        if required > self.capacity {
            let next = self.config.growth.grow(required, self.capacity);
            self.realloc_to(next);
        }
    }

    fn realloc_to(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.len);
        self.block = reallocate(
            self.block.take(),
            capacity,
            mem::size_of::<T>(),
            self.config.alignment,
        );
        self.capacity = capacity;
    }

    /// Reject slices that point into this array's own block; growth could
    /// move the storage out from under them.
    fn check_address(&self, items: &[T]) {
        if let Some(block) = &self.block {
            debug_assert!(
                items.is_empty() || !block.contains_address(items.as_ptr() as usize),
                "cannot append a slice of the array to itself"
            );
        }
    }
}

impl<T> Drop for GrowableArray<T> {
    fn drop(&mut self) {
        // SAFETY: `[0, len)` is live; the block is released afterwards by
        // its own drop.
        unsafe { ptr::drop_in_place(self.as_mut_slice() as *mut [T]) };
    }
}

impl<T> Default for GrowableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for GrowableArray<T> {
    fn clone(&self) -> Self {
        let mut copy = Self::with_config(self.config);
        copy.reserve(self.len);
        for item in self.iter() {
            copy.emplace_with(|| item.clone());
        }
        copy
    }
}

impl<T> Deref for GrowableArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for GrowableArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for GrowableArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for GrowableArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for GrowableArray<T> {}

impl<T: PartialOrd> PartialOrd for GrowableArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord> Ord for GrowableArray<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash> Hash for GrowableArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: Clone> From<&[T]> for GrowableArray<T> {
    fn from(items: &[T]) -> Self {
        Self::from_slice(items)
    }
}

impl<T, const N: usize> From<[T; N]> for GrowableArray<T> {
    fn from(items: [T; N]) -> Self {
        let mut array = Self::with_capacity(N);
        for item in items {
            array.emplace_with(|| item);
        }
        array
    }
}

impl<T> FromIterator<T> for GrowableArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T> Extend<T> for GrowableArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > 0 {
            self.grow_for(self.len + lower);
        }
        for item in iter {
            self.emplace_with(|| item);
        }
    }
}

impl<'a, T> IntoIterator for &'a GrowableArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut GrowableArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> IntoIterator for GrowableArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let mut array = ManuallyDrop::new(self);
        let ptr = array.data_ptr();
        let end = array.len;
        IntoIter {
            block: array.block.take(),
            ptr,
            start: 0,
            end,
        }
    }
}

/// Owning iterator over a [`GrowableArray`].
pub struct IntoIter<T> {
    // Keeps the storage alive; released on drop.
    block: Option<AlignedBlock>,
    ptr: NonNull<T>,
    start: usize,
    end: usize,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let index = self.start;
        self.start += 1;
        // SAFETY: `[start, end)` holds the elements not yet yielded.
        Some(unsafe { self.ptr.as_ptr().add(index).read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: as in `next`.
        Some(unsafe { self.ptr.as_ptr().add(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: `[start, end)` was never yielded and is still live.
        unsafe {
            let rest = self.ptr.as_ptr().add(self.start);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(rest, self.end - self.start));
        }
        drop(self.block.take());
    }
}
