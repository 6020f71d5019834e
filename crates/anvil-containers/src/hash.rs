//! Hash and equality strategies for the hashed containers.
//!
//! Uses 32-bit FNV-1a, which is deterministic across runs but not
//! cryptographically secure. Integers and raw bytes are hashed in native
//! byte order, so results differ between little- and big-endian targets.
//! Bucket selection masks the low bits, so the full 32-bit result is kept
//! and never truncated by the strategy.

use std::hash::{Hash, Hasher};

/// FNV-1a offset basis for 32-bit.
const FNV_OFFSET: u32 = 0x811c_9dc5;
/// FNV-1a prime for 32-bit.
const FNV_PRIME: u32 = 0x0100_0193;

/// Feed a byte slice into an FNV-1a hash state.
#[inline]
fn fnv1a_bytes(mut hash: u32, bytes: &[u8]) -> u32 {
    for &b in bytes {
        hash = (hash ^ b as u32).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Maps a value to a 32-bit hash.
pub trait HashStrategy<T: ?Sized> {
    /// Hash `value`.
    fn hash(&self, value: &T) -> u32;
}

/// Decides whether two hashed values are the same entry.
///
/// Both hashes are passed in so strategies can short-circuit on them.
pub trait Comparator<T: ?Sized> {
    /// Whether `lhs` and `rhs` denote the same entry.
    fn equals(&self, lhs_hash: u32, lhs: &T, rhs_hash: u32, rhs: &T) -> bool;
}

/// A [`Hasher`] computing 32-bit FNV-1a over everything written to it.
#[derive(Clone, Copy, Debug)]
pub struct FnvHasher(u32);

impl Default for FnvHasher {
    fn default() -> Self {
        Self(FNV_OFFSET)
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.0 as u64
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0 = fnv1a_bytes(self.0, bytes);
    }
}

/// Default strategy: FNV-1a over the value's [`Hash`] stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fnv1a;

impl<T: Hash + ?Sized> HashStrategy<T> for Fnv1a {
    fn hash(&self, value: &T) -> u32 {
        let mut hasher = FnvHasher::default();
        value.hash(&mut hasher);
        hasher.0
    }
}

/// FNV-1a over the raw bytes of a plain-old-data value.
///
/// Unlike [`Fnv1a`], no length prefixes or discriminants are mixed in, so
/// equal byte images always hash equally.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByteChecksum;

impl<T: bytemuck::NoUninit> HashStrategy<T> for ByteChecksum {
    fn hash(&self, value: &T) -> u32 {
        fnv1a_bytes(FNV_OFFSET, bytemuck::bytes_of(value))
    }
}

impl<T: bytemuck::NoUninit> HashStrategy<[T]> for ByteChecksum {
    fn hash(&self, value: &[T]) -> u32 {
        fnv1a_bytes(FNV_OFFSET, bytemuck::cast_slice(value))
    }
}

/// Default comparator: two entries are equal when their hashes are equal.
///
/// Values are never inspected, so colliding hashes merge distinct values
/// into one entry. Use [`ValueEquality`] when collisions are possible.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashEquality;

impl<T: ?Sized> Comparator<T> for HashEquality {
    #[inline]
    fn equals(&self, lhs_hash: u32, _lhs: &T, rhs_hash: u32, _rhs: &T) -> bool {
        lhs_hash == rhs_hash
    }
}

/// Compares hashes first, then the values themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueEquality;

impl<T: PartialEq + ?Sized> Comparator<T> for ValueEquality {
    #[inline]
    fn equals(&self, lhs_hash: u32, lhs: &T, rhs_hash: u32, rhs: &T) -> bool {
        lhs_hash == rhs_hash && lhs == rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_known_vectors() {
        assert_eq!(fnv1a_bytes(FNV_OFFSET, b""), 0x811c_9dc5);
        assert_eq!(fnv1a_bytes(FNV_OFFSET, b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_bytes(FNV_OFFSET, b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn fnv1a_is_deterministic() {
        let a = Fnv1a.hash(&42u64);
        let b = Fnv1a.hash(&42u64);
        assert_eq!(a, b);
        assert_ne!(Fnv1a.hash(&42u64), Fnv1a.hash(&43u64));
    }

    #[test]
    fn str_hashes_through_unsized_impl() {
        assert_eq!(Fnv1a.hash("coffee"), Fnv1a.hash(&String::from("coffee")));
    }

    #[test]
    fn byte_checksum_sees_raw_bytes() {
        let value = 0x0403_0201u32;
        assert_eq!(
            ByteChecksum.hash(&value),
            fnv1a_bytes(FNV_OFFSET, &value.to_ne_bytes())
        );
        let floats = [1.0f32, 2.0];
        assert_eq!(
            ByteChecksum.hash(&floats[..]),
            fnv1a_bytes(FNV_OFFSET, bytemuck::cast_slice(&floats))
        );
    }

    #[test]
    fn integers_hash_in_native_byte_order() {
        let value = 0x0102_0304u32;
        assert_eq!(Fnv1a.hash(&value), fnv1a_bytes(FNV_OFFSET, &value.to_ne_bytes()));
        assert_eq!(Fnv1a.hash(&value), ByteChecksum.hash(&value));
    }

    #[test]
    fn hash_equality_ignores_values() {
        assert!(HashEquality.equals(7, &1, 7, &2));
        assert!(!HashEquality.equals(7, &1, 8, &1));
    }

    #[test]
    fn value_equality_checks_both() {
        assert!(ValueEquality.equals(7, &1, 7, &1));
        assert!(!ValueEquality.equals(7, &1, 7, &2));
        assert!(!ValueEquality.equals(7, &1, 8, &1));
    }
}
