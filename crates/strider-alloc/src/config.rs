//! Configuration for the simulated device backend.

use crate::error::AllocError;

/// Configuration for [`SimDevice`](crate::sim::SimDevice).
///
/// Controls how rows are padded, how block bases are aligned, and how much
/// memory the simulated device holds. Validated at construction; all values
/// are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimDeviceConfig {
    /// Row pitch granularity in bytes. Every row width is rounded up to a
    /// multiple of this value.
    ///
    /// Default: 256. Must be a non-zero power of two.
    pub pitch_alignment: usize,

    /// Alignment of every block base address in bytes.
    ///
    /// Default: 256. Must be a non-zero power of two.
    pub base_alignment: usize,

    /// Total bytes the device can hand out at once (after padding).
    ///
    /// Default: 1 GiB. Must be non-zero.
    pub capacity_bytes: usize,
}

impl SimDeviceConfig {
    /// Default row pitch granularity.
    pub const DEFAULT_PITCH_ALIGNMENT: usize = 256;

    /// Default base address alignment.
    pub const DEFAULT_BASE_ALIGNMENT: usize = 256;

    /// Default device capacity: 1 GiB.
    pub const DEFAULT_CAPACITY_BYTES: usize = 1 << 30;

    /// Create a config with the given capacity and default alignments.
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            pitch_alignment: Self::DEFAULT_PITCH_ALIGNMENT,
            base_alignment: Self::DEFAULT_BASE_ALIGNMENT,
            capacity_bytes,
        }
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), AllocError> {
        if !self.pitch_alignment.is_power_of_two() {
            return Err(AllocError::InvalidConfig {
                reason: format!(
                    "pitch_alignment ({}) must be a non-zero power of two",
                    self.pitch_alignment
                ),
            });
        }
        if !self.base_alignment.is_power_of_two() {
            return Err(AllocError::InvalidConfig {
                reason: format!(
                    "base_alignment ({}) must be a non-zero power of two",
                    self.base_alignment
                ),
            });
        }
        if self.capacity_bytes == 0 {
            return Err(AllocError::InvalidConfig {
                reason: "capacity_bytes must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SimDeviceConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY_BYTES)
    }
}
