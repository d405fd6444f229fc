//! The device-memory backend abstraction.

use crate::addr::DeviceAddr;
use crate::error::BackendError;

/// A pitched block as reported by a backend.
///
/// `row_pitch` and `slice_pitch` are the real, final strides in bytes,
/// including whatever alignment padding the backend applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PitchedBlock {
    /// Base address of the block.
    pub base: DeviceAddr,
    /// Bytes between the starts of consecutive rows.
    pub row_pitch: usize,
    /// Bytes between the starts of consecutive 2D slices.
    pub slice_pitch: usize,
}

/// Performs physical allocation and release of device memory.
///
/// Implementations decide row padding and report it back. Every method
/// may block. Implementations must be safe to call concurrently; the
/// allocators built on top of this trait hold no locks of their own.
pub trait DeviceBackend: Send + Sync {
    /// Human-readable backend name (for diagnostics).
    fn name(&self) -> &str;

    /// Reserve a flat, contiguous block of `bytes` bytes.
    fn alloc_linear(&self, bytes: usize) -> Result<DeviceAddr, BackendError>;

    /// Reserve `slices` stacked 2D slices of `rows` rows, each row holding
    /// at least `row_bytes` bytes.
    ///
    /// The returned `row_pitch` must be `>= row_bytes` and the returned
    /// `slice_pitch` must be `>= rows * row_pitch`.
    fn alloc_pitched(
        &self,
        row_bytes: usize,
        rows: usize,
        slices: usize,
    ) -> Result<PitchedBlock, BackendError>;

    /// Release a block previously returned by this backend.
    fn free(&self, addr: DeviceAddr) -> Result<(), BackendError>;
}
