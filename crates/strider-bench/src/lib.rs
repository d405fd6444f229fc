//! Benchmark profiles for Strider allocators.
//!
//! - [`reference_device`]: 1 GiB simulated device with 256-byte pitch
//! - [`field_plane`] / [`field_volume`]: extents matching a 100x100 grid
//!   simulation field and a 64^3 volume

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strider_alloc::{SimDevice, SimDeviceConfig};
use strider_core::Extent;

/// Simulated device with default alignments and 1 GiB of capacity.
pub fn reference_device() -> SimDevice {
    SimDevice::default()
}

/// Simulated device with a custom row pitch granularity.
pub fn device_with_pitch(pitch_alignment: usize) -> SimDevice {
    SimDevice::new(SimDeviceConfig {
        pitch_alignment,
        ..SimDeviceConfig::default()
    })
    .expect("benchmark pitch alignment must be a power of two")
}

/// 100x100 plane: one scalar field of the reference grid.
pub fn field_plane() -> Extent<2> {
    Extent::new([100, 100])
}

/// 64x64x64 volume.
pub fn field_volume() -> Extent<3> {
    Extent::new([64, 64, 64])
}

/// Flat buffer with the same element count as [`field_plane`].
pub fn field_line() -> Extent<1> {
    Extent::new([100 * 100])
}
