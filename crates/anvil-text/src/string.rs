//! Null-terminated string of 16-bit internal units.
//!
//! The buffer is either empty or ends in exactly one 0 unit, and no other
//! unit is 0. `length` counts characters, `size` counts buffer units
//! including the terminator.

use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign};

use anvil_containers::GrowableArray;

use crate::transcode::{Char, Narrow, Native, SourceEncoding, Utf16, Utf32, Utf8};

/// "No position" / "to the end" marker for character indices.
pub const NPOS: usize = usize::MAX;

/// A growable, null-terminated string of internal units.
#[derive(Clone, Default)]
pub struct EncodedString {
    data: GrowableArray<Char>,
}

impl EncodedString {
    /// Create an empty string. Does not allocate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from 8-bit single-byte text; non-ASCII bytes become `'?'`.
    pub fn from_narrow(src: &[u8]) -> Self {
        Self::from_encoded::<Narrow>(src)
    }

    /// Build from UTF-8 bytes.
    pub fn from_utf8(src: &[u8]) -> Self {
        Self::from_encoded::<Utf8>(src)
    }

    /// Build from UTF-16 units.
    pub fn from_utf16(src: &[u16]) -> Self {
        Self::from_encoded::<Utf16>(src)
    }

    /// Build from UTF-32 code points.
    pub fn from_utf32(src: &[u32]) -> Self {
        Self::from_encoded::<Utf32>(src)
    }

    /// Build from internal units.
    pub fn from_chars(src: &[Char]) -> Self {
        Self::from_encoded::<Native>(src)
    }

    /// Build from any source encoding. The buffer is sized exactly.
    pub fn from_encoded<E: SourceEncoding>(src: &[E::Unit]) -> Self {
        let mut string = Self::new();
        string.append_characters::<E>(src);
        string
    }

    /// Copy `other` into a buffer with room for `extra` more characters, so
    /// a planned concatenation does not reallocate.
    pub fn with_headroom(other: &EncodedString, extra: usize) -> Self {
        let mut data = GrowableArray::with_capacity(other.size() + extra + usize::from(other.is_empty()));
        data.append_slice(other.as_chars_with_nul());
        Self { data }
    }

    /// Number of characters, excluding the terminator.
    #[inline]
    pub fn length(&self) -> usize {
        self.data.len().saturating_sub(1)
    }

    /// Number of buffer units, including the terminator when non-empty.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Bytes reserved by the buffer.
    pub fn size_in_bytes(&self) -> usize {
        self.data.size_in_bytes()
    }

    /// Units the buffer holds before it must grow.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Whether the string has no characters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// The characters, without the terminator.
    pub fn as_chars(&self) -> &[Char] {
        &self.data[..self.length()]
    }

    /// The whole buffer, terminator included. Empty for an empty string.
    pub fn as_chars_with_nul(&self) -> &[Char] {
        &self.data
    }

    /// Append one internal unit. A 0 unit is ignored.
    pub fn append_character(&mut self, c: Char) {
        debug_assert!(c != 0, "cannot append the terminator as a character");
        if c == 0 {
            return;
        }
        match self.data.last_mut() {
            Some(terminator) => *terminator = c,
            None => {
                self.data.add(c);
            }
        }
        self.data.add(0);
    }

    /// Append text in any source encoding.
    ///
    /// The source is probed first, then transcoded directly into the grown
    /// buffer and re-terminated.
    pub fn append_characters<E: SourceEncoding>(&mut self, src: &[E::Unit]) {
        let produced = E::transcode(None, src);
        if produced == 0 {
            return;
        }
        let start = self.length();
        let size = start + produced + 1;
        if self.data.capacity() == 0 {
            self.data.reserve(size);
        }
        self.data.resize(size);
        let written = E::transcode(Some(&mut self.data[start..start + produced]), src);
        debug_assert_eq!(written, produced);
        self.data[start + produced] = 0;
    }

    /// Append 8-bit single-byte text.
    pub fn append_narrow(&mut self, src: &[u8]) {
        self.append_characters::<Narrow>(src);
    }

    /// Append UTF-8 bytes.
    pub fn append_utf8(&mut self, src: &[u8]) {
        self.append_characters::<Utf8>(src);
    }

    /// Append UTF-16 units.
    pub fn append_utf16(&mut self, src: &[u16]) {
        self.append_characters::<Utf16>(src);
    }

    /// Append UTF-32 code points.
    pub fn append_utf32(&mut self, src: &[u32]) {
        self.append_characters::<Utf32>(src);
    }

    /// Append another string.
    pub fn append_string(&mut self, other: &EncodedString) {
        self.append_characters::<Native>(other.as_chars());
    }

    /// Remove `count` characters starting at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `count == 0` or `index + count > length`.
    pub fn remove_at(&mut self, index: usize, count: usize) {
        let length = self.length();
        assert!(
            index.checked_add(count).is_some_and(|end| end <= length),
            "remove range {index}..{} out of bounds (length {length})",
            index.saturating_add(count)
        );
        self.data.remove_at(index, count);
        if self.data.len() == 1 {
            self.data.clear();
        }
    }

    /// Remove every character. Capacity is kept.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Characters in `[start, end)` as a new string. `end` is clamped to the
    /// length; pass [`NPOS`] for "to the end".
    ///
    /// # Panics
    ///
    /// Panics if `start` is past the clamped end.
    pub fn sub_str(&self, start: usize, end: usize) -> EncodedString {
        let end = end.min(self.length());
        assert!(start <= end, "sub_str start {start} past end {end}");
        Self::from_chars(&self.as_chars()[start..end])
    }

    /// Index of the first occurrence of `c`.
    pub fn find_char(&self, c: Char) -> Option<usize> {
        self.as_chars().iter().position(|&unit| unit == c)
    }

    /// Index of the first occurrence of `needle`. An empty needle matches
    /// at 0.
    pub fn find<N: AsRef<[Char]>>(&self, needle: N) -> Option<usize> {
        let needle = needle.as_ref();
        if needle.is_empty() {
            return Some(0);
        }
        self.as_chars()
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Whether the string begins with `prefix`.
    pub fn starts_with<N: AsRef<[Char]>>(&self, prefix: N) -> bool {
        self.as_chars().starts_with(prefix.as_ref())
    }

    /// Decode to a Rust `String`, replacing unpaired or misordered
    /// surrogates with U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.as_chars())
    }
}

impl AsRef<[Char]> for EncodedString {
    fn as_ref(&self) -> &[Char] {
        self.as_chars()
    }
}

impl From<&str> for EncodedString {
    /// UTF-8 ingestion; stops at an embedded NUL.
    fn from(text: &str) -> Self {
        Self::from_utf8(text.as_bytes())
    }
}

impl From<&String> for EncodedString {
    fn from(text: &String) -> Self {
        Self::from(text.as_str())
    }
}

impl fmt::Display for EncodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in char::decode_utf16(self.as_chars().iter().copied()) {
            f.write_char(c.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl fmt::Debug for EncodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl PartialEq for EncodedString {
    fn eq(&self, other: &Self) -> bool {
        self.as_chars() == other.as_chars()
    }
}

impl Eq for EncodedString {}

impl PartialOrd for EncodedString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EncodedString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_chars().cmp(other.as_chars())
    }
}

impl Hash for EncodedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_chars().hash(state);
    }
}

impl PartialEq<str> for EncodedString {
    /// Compares against `other` ingested as UTF-8.
    fn eq(&self, other: &str) -> bool {
        *self == EncodedString::from(other)
    }
}

impl PartialEq<&str> for EncodedString {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl AddAssign<&EncodedString> for EncodedString {
    fn add_assign(&mut self, other: &EncodedString) {
        self.append_string(other);
    }
}

impl AddAssign<&str> for EncodedString {
    fn add_assign(&mut self, other: &str) {
        self.append_utf8(other.as_bytes());
    }
}

impl AddAssign<Char> for EncodedString {
    fn add_assign(&mut self, c: Char) {
        self.append_character(c);
    }
}

impl Add<&EncodedString> for EncodedString {
    type Output = EncodedString;

    fn add(mut self, other: &EncodedString) -> EncodedString {
        self += other;
        self
    }
}

impl Add<&str> for EncodedString {
    type Output = EncodedString;

    fn add(mut self, other: &str) -> EncodedString {
        self += other;
        self
    }
}
