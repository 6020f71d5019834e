//! Bidirectional archive visitor and array serialization.
//!
//! An [`Archive`] either reads or writes; the same `archive` routine drives
//! both directions. All integers are little-endian. Arrays are framed with
//! a `u32` element count followed by the elements.

use std::mem;

use crate::array::GrowableArray;
use crate::error::ArchiveError;

/// A serialization sink or source.
pub trait Archive {
    /// Whether fields are filled from the archive.
    fn is_reading(&self) -> bool;

    /// Whether fields are copied into the archive.
    fn is_writing(&self) -> bool {
        !self.is_reading()
    }

    /// Transfer `buffer.len()` bytes. Readers overwrite `buffer`, writers
    /// copy it out. `name` and `label` identify the field for diagnostics.
    fn serialize(&mut self, buffer: &mut [u8], name: &str, label: &str)
        -> Result<(), ArchiveError>;

    /// Bytes a reader can still supply, when known. Lets bulk reads reject
    /// an oversized count before allocating for it.
    fn bytes_available(&self) -> Option<usize> {
        None
    }
}

/// Appends written fields to a byte array.
pub struct MemoryWriter<'a> {
    out: &'a mut GrowableArray<u8>,
}

impl<'a> MemoryWriter<'a> {
    /// Create a writer appending to `out`.
    pub fn new(out: &'a mut GrowableArray<u8>) -> Self {
        Self { out }
    }

    /// Bytes in the output so far.
    pub fn position(&self) -> usize {
        self.out.len()
    }
}

impl Archive for MemoryWriter<'_> {
    fn is_reading(&self) -> bool {
        false
    }

    fn serialize(&mut self, buffer: &mut [u8], name: &str, label: &str) -> Result<(), ArchiveError> {
        tracing::trace!(name, label, bytes = buffer.len(), "archive write");
        self.out.append_slice(buffer);
        Ok(())
    }
}

/// Reads fields from a byte slice.
pub struct MemoryReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> MemoryReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
}

impl Archive for MemoryReader<'_> {
    fn is_reading(&self) -> bool {
        true
    }

    fn serialize(&mut self, buffer: &mut [u8], name: &str, label: &str) -> Result<(), ArchiveError> {
        let needed = buffer.len();
        let remaining = self.remaining();
        if needed > remaining {
            return Err(ArchiveError::UnexpectedEnd {
                name: name.to_owned(),
                needed,
                remaining,
            });
        }
        tracing::trace!(name, label, bytes = needed, "archive read");
        buffer.copy_from_slice(&self.data[self.offset..self.offset + needed]);
        self.offset += needed;
        Ok(())
    }

    fn bytes_available(&self) -> Option<usize> {
        Some(self.remaining())
    }
}

/// A value that can move through an [`Archive`] in either direction.
pub trait Archivable {
    /// Read into or write out of `self`, depending on the archive.
    fn archive<A: Archive + ?Sized>(
        &mut self,
        ar: &mut A,
        name: &str,
        label: &str,
    ) -> Result<(), ArchiveError>;
}

macro_rules! impl_archivable_le {
    ($($t:ty),* $(,)?) => {
        $(
            impl Archivable for $t {
                fn archive<A: Archive + ?Sized>(
                    &mut self,
                    ar: &mut A,
                    name: &str,
                    label: &str,
                ) -> Result<(), ArchiveError> {
                    let mut bytes = self.to_le_bytes();
                    ar.serialize(&mut bytes, name, label)?;
                    if ar.is_reading() {
                        *self = <$t>::from_le_bytes(bytes);
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_archivable_le!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Archivable for bool {
    fn archive<A: Archive + ?Sized>(
        &mut self,
        ar: &mut A,
        name: &str,
        label: &str,
    ) -> Result<(), ArchiveError> {
        let mut byte = [*self as u8];
        ar.serialize(&mut byte, name, label)?;
        if ar.is_reading() {
            *self = byte[0] != 0;
        }
        Ok(())
    }
}

impl<T: Archivable + Default> Archivable for GrowableArray<T> {
    fn archive<A: Archive + ?Sized>(
        &mut self,
        ar: &mut A,
        name: &str,
        label: &str,
    ) -> Result<(), ArchiveError> {
        serialize_array(ar, self, name, label)
    }
}

fn archive_count<A: Archive + ?Sized>(
    ar: &mut A,
    len: usize,
    name: &str,
) -> Result<usize, ArchiveError> {
    let mut count = if ar.is_reading() {
        0
    } else {
        u32::try_from(len).map_err(|_| ArchiveError::LengthOverflow {
            name: name.to_owned(),
            len,
        })?
    };
    count.archive(ar, name, "count")?;
    Ok(count as usize)
}

/// Serialize an array element by element.
///
/// Reading rebuilds `array` from default-constructed elements; on failure
/// `array` is left empty. Writing walks the elements in order.
pub fn serialize_array<A, T>(
    ar: &mut A,
    array: &mut GrowableArray<T>,
    name: &str,
    label: &str,
) -> Result<(), ArchiveError>
where
    A: Archive + ?Sized,
    T: Archivable + Default,
{
    if ar.is_reading() {
        array.clear();
        let count = archive_count(ar, 0, name)?;
        let mut incoming = GrowableArray::with_config(*array.config());
        for _ in 0..count {
            let mut item = T::default();
            item.archive(ar, name, label)?;
            incoming.add(item);
        }
        *array = incoming;
    } else {
        archive_count(ar, array.len(), name)?;
        for item in array.iter_mut() {
            item.archive(ar, name, label)?;
        }
    }
    Ok(())
}

/// Serialize an array of plain-old-data elements as one raw byte range.
///
/// Element bytes are written in native order; only the count prefix is
/// normalised to little-endian. Reading checks the count against the bytes
/// the archive can still supply before allocating, and leaves `array`
/// empty on failure.
pub fn serialize_pod_array<A, T>(
    ar: &mut A,
    array: &mut GrowableArray<T>,
    name: &str,
    label: &str,
) -> Result<(), ArchiveError>
where
    A: Archive + ?Sized,
    T: bytemuck::Pod,
{
    if !ar.is_reading() {
        archive_count(ar, array.len(), name)?;
        return ar.serialize(bytemuck::cast_slice_mut(array.as_mut_slice()), name, label);
    }

    array.clear();
    let count = archive_count(ar, 0, name)?;
    let needed = count
        .checked_mul(mem::size_of::<T>())
        .ok_or_else(|| ArchiveError::LengthOverflow {
            name: name.to_owned(),
            len: count,
        })?;
    if let Some(remaining) = ar.bytes_available() {
        if needed > remaining {
            return Err(ArchiveError::UnexpectedEnd {
                name: name.to_owned(),
                needed,
                remaining,
            });
        }
    }
    let mut incoming = GrowableArray::with_config(*array.config());
    incoming.resize_with(count, T::zeroed);
    ar.serialize(bytemuck::cast_slice_mut(incoming.as_mut_slice()), name, label)?;
    *array = incoming;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        id: u32,
        weight: f64,
        alive: bool,
        history: GrowableArray<i16>,
    }

    impl Archivable for Sample {
        fn archive<A: Archive + ?Sized>(
            &mut self,
            ar: &mut A,
            name: &str,
            _label: &str,
        ) -> Result<(), ArchiveError> {
            self.id.archive(ar, name, "id")?;
            self.weight.archive(ar, name, "weight")?;
            self.alive.archive(ar, name, "alive")?;
            self.history.archive(ar, name, "history")
        }
    }

    fn sample(id: u32) -> Sample {
        Sample {
            id,
            weight: id as f64 * 1.5,
            alive: id % 2 == 0,
            history: GrowableArray::from([id as i16, -(id as i16)]),
        }
    }

    #[test]
    fn directions() {
        let mut bytes = GrowableArray::new();
        assert!(MemoryWriter::new(&mut bytes).is_writing());
        assert!(MemoryReader::new(&[]).is_reading());
        assert!(!MemoryReader::new(&[]).is_writing());
    }

    #[test]
    fn primitives_are_little_endian() {
        let mut bytes = GrowableArray::new();
        let mut writer = MemoryWriter::new(&mut bytes);
        0x0102_0304u32.archive(&mut writer, "v", "").unwrap();
        assert_eq!(writer.position(), 4);
        assert_eq!(bytes.as_slice(), &[4, 3, 2, 1]);
    }

    #[test]
    fn nested_arrays_round_trip() {
        let mut records: GrowableArray<Sample> = (1..=3).map(sample).collect();
        let mut bytes = GrowableArray::new();
        serialize_array(&mut MemoryWriter::new(&mut bytes), &mut records, "records", "").unwrap();

        let mut restored = GrowableArray::from([sample(99)]);
        let mut reader = MemoryReader::new(&bytes);
        serialize_array(&mut reader, &mut restored, "records", "").unwrap();
        assert_eq!(reader.remaining(), 0);
        assert_eq!(restored, records);
    }

    #[test]
    fn pod_array_round_trip() {
        let mut values = GrowableArray::from([1.0f32, -2.5, 3.25]);
        let mut bytes = GrowableArray::new();
        serialize_pod_array(&mut MemoryWriter::new(&mut bytes), &mut values, "v", "").unwrap();
        assert_eq!(bytes.len(), 4 + 3 * 4);

        let mut restored = GrowableArray::new();
        serialize_pod_array(&mut MemoryReader::new(&bytes), &mut restored, "v", "").unwrap();
        assert_eq!(restored, values);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut values = GrowableArray::from([7u64, 8, 9]);
        let mut bytes = GrowableArray::new();
        serialize_array(&mut MemoryWriter::new(&mut bytes), &mut values, "ticks", "").unwrap();

        let cut = &bytes[..bytes.len() - 3];
        let mut restored: GrowableArray<u64> = GrowableArray::new();
        let err = serialize_array(&mut MemoryReader::new(cut), &mut restored, "ticks", "")
            .unwrap_err();
        assert_eq!(
            err,
            ArchiveError::UnexpectedEnd {
                name: "ticks".into(),
                needed: 8,
                remaining: 5,
            }
        );
    }

    #[test]
    fn pod_count_without_payload_leaves_array_empty() {
        let prefix = 1_000_000u32.to_le_bytes();
        let mut restored = GrowableArray::from([1u64, 2, 3]);
        let err = serialize_pod_array(&mut MemoryReader::new(&prefix), &mut restored, "ticks", "")
            .unwrap_err();
        assert_eq!(
            err,
            ArchiveError::UnexpectedEnd {
                name: "ticks".into(),
                needed: 8_000_000,
                remaining: 0,
            }
        );
        assert_eq!(restored.len(), 0);
        assert!(restored.capacity() <= 3);
    }

    #[test]
    fn pod_short_payload_leaves_array_empty() {
        let mut values = GrowableArray::from([1.5f32, 2.5, 3.5]);
        let mut bytes = GrowableArray::new();
        serialize_pod_array(&mut MemoryWriter::new(&mut bytes), &mut values, "v", "").unwrap();

        let mut restored = GrowableArray::from([9.0f32]);
        let cut = &bytes[..bytes.len() - 1];
        assert!(serialize_pod_array(&mut MemoryReader::new(cut), &mut restored, "v", "").is_err());
        assert!(restored.is_empty());
    }

    #[test]
    fn failed_element_read_leaves_array_empty() {
        let mut values = GrowableArray::from([7u64, 8, 9]);
        let mut bytes = GrowableArray::new();
        serialize_array(&mut MemoryWriter::new(&mut bytes), &mut values, "ticks", "").unwrap();

        let mut restored = GrowableArray::from([1u64]);
        let cut = &bytes[..bytes.len() - 3];
        assert!(serialize_array(&mut MemoryReader::new(cut), &mut restored, "ticks", "").is_err());
        assert!(restored.is_empty());
    }

    #[test]
    fn writers_report_no_byte_budget() {
        let mut bytes = GrowableArray::new();
        assert_eq!(MemoryWriter::new(&mut bytes).bytes_available(), None);
        assert_eq!(MemoryReader::new(&[1, 2, 3]).bytes_available(), Some(3));
    }

    #[test]
    fn dyn_archive_is_usable() {
        let mut bytes = GrowableArray::new();
        let mut writer = MemoryWriter::new(&mut bytes);
        let ar: &mut dyn Archive = &mut writer;
        let mut flag = true;
        flag.archive(ar, "flag", "").unwrap();
        assert_eq!(bytes.as_slice(), &[1]);
    }
}
