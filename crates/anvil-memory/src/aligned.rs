//! Raw aligned block allocation.
//!
//! Every block is carved out of a byte-aligned request of `size + align`
//! bytes. The first aligned address strictly after the raw start is handed
//! out, and the byte just before it records how far it was shifted. Freeing
//! reads that byte back to find the raw start again.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::{self, NonNull};

use crate::error::AllocError;
use crate::MAX_ALIGNMENT;

/// Round `address` up to the next multiple of `align`.
///
/// `align` must be a power of two.
#[inline]
pub const fn align_address(address: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    let mask = align - 1;
    (address + mask) & !mask
}

fn check_alignment(align: usize) -> Result<(), AllocError> {
    if align == 0 || !align.is_power_of_two() || align > MAX_ALIGNMENT {
        return Err(AllocError::InvalidAlignment { align });
    }
    Ok(())
}

/// An exclusively owned, aligned, uninitialised block of bytes.
///
/// The block is released when dropped. Contents are never read or
/// initialised by the block itself; callers own that responsibility.
pub struct AlignedBlock {
    ptr: NonNull<u8>,
    size: usize,
    align: usize,
}

// SAFETY: the block is a uniquely owned heap allocation with no
// thread-affine state; moving it to another thread is the same as moving
// a `Box<[u8]>`.
unsafe impl Send for AlignedBlock {}
// SAFETY: `&AlignedBlock` only exposes the address and sizes.
unsafe impl Sync for AlignedBlock {}

impl AlignedBlock {
    /// Start of the usable region. Always a multiple of [`align`](Self::align).
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Start of the usable region, cast to `T`.
    #[inline]
    pub fn cast<T>(&self) -> NonNull<T> {
        self.ptr.cast()
    }

    /// Number of usable bytes requested at allocation time.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alignment of the usable region.
    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    /// Whether `addr` falls inside the usable region.
    pub fn contains_address(&self, addr: usize) -> bool {
        let start = self.ptr.as_ptr() as usize;
        addr >= start && addr < start + self.size
    }

    /// Decode the shift marker stored before the usable region.
    fn shift(&self) -> usize {
        // SAFETY: every block is shifted by at least one byte from its raw
        // start, so `ptr - 1` is inside the same allocation.
        let marker = unsafe { self.ptr.as_ptr().sub(1).read() };
        if marker == 0 {
            MAX_ALIGNMENT
        } else {
            marker as usize
        }
    }

    fn raw_layout(&self) -> Layout {
        // SAFETY: the same size/align pair was validated by `Layout::from_size_align`
        // when the block was created.
        unsafe { Layout::from_size_align_unchecked(self.size + self.align, 1) }
    }
}

impl Drop for AlignedBlock {
    fn drop(&mut self) {
        let shift = self.shift();
        if shift > self.align {
            tracing::error!(
                address = self.ptr.as_ptr() as usize,
                shift,
                align = self.align,
                "aligned block marker corrupted"
            );
            panic!(
                "corrupted aligned block marker: shift {shift} exceeds alignment {}",
                self.align
            );
        }
        tracing::trace!(size = self.size, align = self.align, "aligned block released");
        // SAFETY: `shift` was validated against the alignment, so `ptr - shift`
        // is the raw start returned by `alloc::alloc` with `raw_layout()`.
        unsafe {
            let raw = self.ptr.as_ptr().sub(shift);
            alloc::dealloc(raw, self.raw_layout());
        }
    }
}

impl fmt::Debug for AlignedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBlock")
            .field("ptr", &self.ptr)
            .field("size", &self.size)
            .field("align", &self.align)
            .finish()
    }
}

/// Allocate `size` bytes aligned to `align`.
///
/// Returns [`AllocError`] for a malformed alignment or a size that cannot be
/// represented. Running out of memory is not reported: it goes to
/// [`std::alloc::handle_alloc_error`], which aborts.
pub fn try_allocate(size: usize, align: usize) -> Result<AlignedBlock, AllocError> {
    check_alignment(align)?;
    let overflow = AllocError::SizeOverflow {
        count: size,
        item_size: 1,
    };
    let total = size.checked_add(align).ok_or_else(|| overflow.clone())?;
    let layout = Layout::from_size_align(total, 1).map_err(|_| overflow)?;

    // SAFETY: `total >= align >= 1`, so the layout is never zero-sized.
    let raw = unsafe { alloc::alloc(layout) };
    let Some(raw) = NonNull::new(raw) else {
        alloc::handle_alloc_error(layout);
    };

    let raw_addr = raw.as_ptr() as usize;
    let mut shift = align_address(raw_addr, align) - raw_addr;
    if shift == 0 {
        // Make room for the marker byte.
        shift = align;
    }
    debug_assert!(shift > 0 && shift <= align);

    // SAFETY: `shift <= align` and the allocation spans `size + align` bytes,
    // so both the marker at `shift - 1` and the usable region
    // `[shift, shift + size)` are in bounds.
    let aligned = unsafe {
        let aligned = raw.as_ptr().add(shift);
        aligned.sub(1).write(shift as u8);
        NonNull::new_unchecked(aligned)
    };

    tracing::trace!(size, align, shift, "aligned block acquired");

    Ok(AlignedBlock {
        ptr: aligned,
        size,
        align,
    })
}

/// Allocate `size` bytes aligned to `align`.
///
/// # Panics
///
/// Panics if `align` is not a power of two in `1..=256` or if the request
/// overflows. Aborts on out-of-memory.
pub fn allocate(size: usize, align: usize) -> AlignedBlock {
    match try_allocate(size, align) {
        Ok(block) => block,
        Err(e) => panic!("{e}"),
    }
}

/// Release a block. Equivalent to dropping it.
///
/// # Panics
///
/// Panics if the shift marker in front of the block has been overwritten
/// with a value larger than the block's alignment.
pub fn free(block: AlignedBlock) {
    drop(block);
}

/// Move `existing` into a block sized for `new_count` items of `item_size`
/// bytes each.
///
/// The first `min(old, new)` bytes are carried over; the old block is
/// released. A `new_count` of zero releases the block and returns `None`.
///
/// # Panics
///
/// Panics if `new_count * item_size` overflows or `align` is malformed.
pub fn reallocate(
    existing: Option<AlignedBlock>,
    new_count: usize,
    item_size: usize,
    align: usize,
) -> Option<AlignedBlock> {
    if new_count == 0 {
        drop(existing);
        return None;
    }

    let Some(new_size) = new_count.checked_mul(item_size) else {
        panic!(
            "{}",
            AllocError::SizeOverflow {
                count: new_count,
                item_size,
            }
        );
    };

    let block = allocate(new_size, align);
    if let Some(old) = existing {
        debug_assert_eq!(old.align(), align, "reallocate must keep the alignment");
        let carried = old.size().min(new_size);
        tracing::trace!(
            old_size = old.size(),
            new_size,
            carried,
            "aligned block reallocated"
        );
        // SAFETY: both regions are at least `carried` bytes long and belong
        // to distinct live allocations.
        unsafe { ptr::copy_nonoverlapping(old.as_ptr(), block.as_ptr(), carried) };
    }
    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn align_address_rounds_up() {
        assert_eq!(align_address(0, 16), 0);
        assert_eq!(align_address(1, 16), 16);
        assert_eq!(align_address(16, 16), 16);
        assert_eq!(align_address(17, 8), 24);
        assert_eq!(align_address(5, 1), 5);
    }

    #[test]
    fn allocate_returns_aligned_address() {
        for align in [1, 2, 4, 8, 16, 32, 64, 128, 256] {
            let block = allocate(100, align);
            assert_eq!(block.as_ptr() as usize % align, 0, "align {align}");
            assert_eq!(block.size(), 100);
            assert_eq!(block.align(), align);
        }
    }

    #[test]
    fn marker_is_never_zero_shift() {
        let block = allocate(8, 16);
        let shift = block.shift();
        assert!((1..=16).contains(&shift));
    }

    #[test]
    fn max_alignment_blocks_decode_shift() {
        // A 256-byte shift is stored as 0 and must still decode in range.
        for _ in 0..16 {
            let block = allocate(1, 256);
            assert_eq!(block.as_ptr() as usize % 256, 0);
            assert!((1..=256).contains(&block.shift()));
        }
    }

    #[test]
    fn zero_size_block_is_valid() {
        let block = allocate(0, 16);
        assert_eq!(block.size(), 0);
        assert_eq!(block.as_ptr() as usize % 16, 0);
        free(block);
    }

    #[test]
    fn usable_region_is_writable() {
        let block = allocate(64, 32);
        unsafe {
            for i in 0..64 {
                block.as_ptr().add(i).write(i as u8);
            }
            for i in 0..64 {
                assert_eq!(block.as_ptr().add(i).read(), i as u8);
            }
        }
    }

    #[test]
    fn try_allocate_rejects_bad_alignment() {
        assert_eq!(
            try_allocate(8, 0).unwrap_err(),
            AllocError::InvalidAlignment { align: 0 }
        );
        assert_eq!(
            try_allocate(8, 24).unwrap_err(),
            AllocError::InvalidAlignment { align: 24 }
        );
        assert_eq!(
            try_allocate(8, 512).unwrap_err(),
            AllocError::InvalidAlignment { align: 512 }
        );
    }

    #[test]
    fn try_allocate_rejects_overflowing_size() {
        let err = try_allocate(usize::MAX, 16).unwrap_err();
        assert!(matches!(err, AllocError::SizeOverflow { .. }));
    }

    #[test]
    #[should_panic(expected = "invalid alignment")]
    fn allocate_panics_on_bad_alignment() {
        let _ = allocate(8, 3);
    }

    #[test]
    fn reallocate_grows_and_preserves_bytes() {
        let block = allocate(4, 16);
        unsafe { ptr::copy_nonoverlapping([1u8, 2, 3, 4].as_ptr(), block.as_ptr(), 4) };
        let grown = reallocate(Some(block), 8, 2, 16).unwrap();
        assert_eq!(grown.size(), 16);
        let mut head = [0u8; 4];
        unsafe { ptr::copy_nonoverlapping(grown.as_ptr(), head.as_mut_ptr(), 4) };
        assert_eq!(head, [1, 2, 3, 4]);
    }

    #[test]
    fn reallocate_shrinks_and_truncates() {
        let block = allocate(8, 8);
        unsafe {
            for i in 0..8 {
                block.as_ptr().add(i).write(10 + i as u8);
            }
        }
        let shrunk = reallocate(Some(block), 3, 1, 8).unwrap();
        assert_eq!(shrunk.size(), 3);
        unsafe {
            assert_eq!(shrunk.as_ptr().read(), 10);
            assert_eq!(shrunk.as_ptr().add(2).read(), 12);
        }
    }

    #[test]
    fn reallocate_to_zero_releases() {
        let block = allocate(8, 16);
        assert!(reallocate(Some(block), 0, 4, 16).is_none());
        assert!(reallocate(None, 0, 4, 16).is_none());
    }

    #[test]
    fn reallocate_from_nothing_allocates() {
        let block = reallocate(None, 10, 4, 16).unwrap();
        assert_eq!(block.size(), 40);
    }

    #[test]
    fn contains_address_covers_usable_region_only() {
        let block = allocate(16, 16);
        let start = block.as_ptr() as usize;
        assert!(block.contains_address(start));
        assert!(block.contains_address(start + 15));
        assert!(!block.contains_address(start + 16));
        assert!(!block.contains_address(start - 1));
    }

    #[test]
    #[should_panic(expected = "corrupted aligned block marker")]
    fn corrupted_marker_is_fatal() {
        let block = allocate(16, 16);
        // A zero marker decodes to a 256-byte shift, which a 16-aligned
        // block can never have.
        unsafe { block.as_ptr().sub(1).write(0) };
        drop(block);
    }

    proptest! {
        #[test]
        fn every_block_is_aligned(size in 0usize..4096, align_pow in 0u32..=8) {
            let align = 1usize << align_pow;
            let block = allocate(size, align);
            prop_assert_eq!(block.as_ptr() as usize % align, 0);
            let shift = block.shift();
            prop_assert!(shift >= 1 && shift <= align);
        }
    }
}
