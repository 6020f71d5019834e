//! Capacity growth arithmetic.
//!
//! Both policies are monotonic, never return less than the requested size,
//! and grow by a constant factor so that `n` appends cost O(n) copies in
//! total.

/// How a container picks its next capacity when an append overflows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GrowthPolicy {
    /// `capacity + capacity / 2`, or [`GrowthPolicy::MIN_CAPACITY`] from
    /// empty, clamped up to the requested size.
    Geometric,
    /// `requested + 3 * requested / 8 + 16` once the container holds
    /// anything; `max(4, requested)` from empty. Front-loads headroom so
    /// byte-granular containers reallocate rarely.
    #[default]
    Heap,
}

impl GrowthPolicy {
    /// Capacity handed out on the first growth from empty.
    pub const MIN_CAPACITY: usize = 4;

    /// Next capacity for a container of `current` capacity that must hold
    /// `requested` items.
    ///
    /// # Panics
    ///
    /// Panics if `requested <= current` (there is nothing to grow) or if the
    /// result overflows `usize`.
    pub fn grow(self, requested: usize, current: usize) -> usize {
        assert!(
            requested > current,
            "grow called without overflow: requested {requested}, capacity {current}"
        );
        match self {
            Self::Geometric => {
                let next = if current == 0 {
                    Self::MIN_CAPACITY
                } else {
                    current
                        .checked_add(current / 2)
                        .unwrap_or_else(|| capacity_overflow(requested))
                };
                next.max(requested)
            }
            Self::Heap => {
                if current == 0 {
                    requested.max(Self::MIN_CAPACITY)
                } else {
                    requested
                        .checked_mul(3)
                        .map(|n| n / 8)
                        .and_then(|extra| requested.checked_add(extra))
                        .and_then(|n| n.checked_add(16))
                        .unwrap_or_else(|| capacity_overflow(requested))
                }
            }
        }
    }

    /// Capacity for an explicit `reserve(count)` request. Reservations are
    /// exact under both policies.
    #[inline]
    pub fn reserve(self, count: usize) -> usize {
        count
    }
}

fn capacity_overflow(requested: usize) -> ! {
    panic!("capacity overflow growing to {requested} items")
}
