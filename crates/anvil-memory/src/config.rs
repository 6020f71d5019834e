//! Allocator configuration parameters.

use crate::error::AllocError;
use crate::growth::GrowthPolicy;
use crate::MAX_ALIGNMENT;

/// Memory layout configuration for a container's backing block.
///
/// Validated with [`AllocConfig::validate`]; containers call it once at
/// construction and never change it afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocConfig {
    /// Minimum alignment of the backing block in bytes.
    ///
    /// Default: 16. Raised to the element type's own alignment when that is
    /// larger. Must be a power of two no larger than 256.
    pub alignment: usize,

    /// Growth policy used when an append overflows the capacity.
    ///
    /// Default: [`GrowthPolicy::Heap`].
    pub growth: GrowthPolicy,
}

impl AllocConfig {
    /// Default block alignment.
    pub const DEFAULT_ALIGNMENT: usize = crate::DEFAULT_ALIGNMENT;

    /// Create a config with the default alignment and the given growth policy.
    pub fn new(growth: GrowthPolicy) -> Self {
        Self {
            alignment: Self::DEFAULT_ALIGNMENT,
            growth,
        }
    }

    /// Override the alignment.
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Check that the alignment can be encoded by the block marker.
    pub fn validate(&self) -> Result<(), AllocError> {
        let align = self.alignment;
        if align == 0 || !align.is_power_of_two() || align > MAX_ALIGNMENT {
            return Err(AllocError::InvalidAlignment { align });
        }
        Ok(())
    }

    /// Alignment to use for a block of `T`: the larger of the configured
    /// alignment and `T`'s own.
    pub fn alignment_for<T>(&self) -> usize {
        self.alignment.max(std::mem::align_of::<T>())
    }
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self::new(GrowthPolicy::default())
    }
}
