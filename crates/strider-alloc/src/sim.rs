//! Host-memory reference backend.
//!
//! [`SimDevice`] implements [`DeviceBackend`] on ordinary host memory so
//! allocators can be exercised without hardware. It pads rows the way a
//! real device does (row width rounded up to
//! [`SimDeviceConfig::pitch_alignment`]), aligns every base address,
//! enforces a capacity budget, and refuses to free addresses it did not
//! hand out.

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use strider_core::{BackendError, DeviceAddr, DeviceBackend, PitchedBlock};

use crate::config::SimDeviceConfig;
use crate::error::AllocError;
use crate::raw::HostBlock;

/// Simulated device backed by host allocations.
///
/// Thread-safe: bookkeeping is serialised behind a mutex, so concurrent
/// allocations each get an independent block. Blocks still live when the
/// device is dropped are released with it.
pub struct SimDevice {
    config: SimDeviceConfig,
    state: Mutex<SimState>,
}

#[derive(Default)]
struct SimState {
    /// Live blocks keyed by base address, in allocation order.
    live: IndexMap<DeviceAddr, HostBlock>,
    /// Bytes reserved by live blocks, padding included.
    used: usize,
}

impl SimDevice {
    /// Backend name reported in diagnostics.
    pub const NAME: &'static str = "sim";

    /// Create a simulated device after validating `config`.
    pub fn new(config: SimDeviceConfig) -> Result<Self, AllocError> {
        config.validate()?;
        Ok(Self {
            config,
            state: Mutex::new(SimState::default()),
        })
    }

    /// The configuration this device was built with.
    pub fn config(&self) -> &SimDeviceConfig {
        &self.config
    }

    /// Number of blocks currently allocated.
    pub fn live_blocks(&self) -> usize {
        self.lock().live.len()
    }

    /// Whether `addr` is the base of a live block.
    pub fn is_live(&self, addr: DeviceAddr) -> bool {
        self.lock().live.contains_key(&addr)
    }

    /// Bytes reserved by live blocks, padding included.
    pub fn used_bytes(&self) -> usize {
        self.lock().used
    }

    /// Total capacity in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.config.capacity_bytes
    }

    /// Bytes still available for allocation.
    pub fn available_bytes(&self) -> usize {
        self.config.capacity_bytes - self.lock().used
    }

    /// Round a row width up to the configured pitch granularity.
    pub fn row_pitch_for(&self, row_bytes: usize) -> Option<usize> {
        row_bytes.checked_next_multiple_of(self.config.pitch_alignment)
    }

    // Bookkeeping stays consistent across a panic elsewhere, so a poisoned
    // lock is still usable.
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reserve(&self, bytes: usize) -> Result<DeviceAddr, BackendError> {
        if bytes == 0 {
            return Err(BackendError::Unsupported {
                reason: "zero-byte allocation".to_string(),
            });
        }
        let mut state = self.lock();
        let available = self.config.capacity_bytes - state.used;
        if bytes > available {
            return Err(BackendError::OutOfMemory {
                requested: bytes,
                available,
            });
        }
        let block = HostBlock::zeroed(bytes, self.config.base_alignment).ok_or(
            BackendError::OutOfMemory {
                requested: bytes,
                available,
            },
        )?;
        let addr = DeviceAddr::new(block.addr()).ok_or(BackendError::Device {
            code: -1,
            reason: "host allocator returned null".to_string(),
        })?;
        state.used += block.len();
        state.live.insert(addr, block);
        Ok(addr)
    }
}

impl Default for SimDevice {
    fn default() -> Self {
        Self {
            config: SimDeviceConfig::default(),
            state: Mutex::new(SimState::default()),
        }
    }
}

impl DeviceBackend for SimDevice {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn alloc_linear(&self, bytes: usize) -> Result<DeviceAddr, BackendError> {
        self.reserve(bytes)
    }

    fn alloc_pitched(
        &self,
        row_bytes: usize,
        rows: usize,
        slices: usize,
    ) -> Result<PitchedBlock, BackendError> {
        if row_bytes == 0 || rows == 0 || slices == 0 {
            return Err(BackendError::Unsupported {
                reason: format!("empty pitched request {row_bytes}x{rows}x{slices}"),
            });
        }
        let too_large = || BackendError::OutOfMemory {
            requested: usize::MAX,
            available: self.available_bytes(),
        };
        let row_pitch = self.row_pitch_for(row_bytes).ok_or_else(too_large)?;
        let slice_pitch = row_pitch.checked_mul(rows).ok_or_else(too_large)?;
        let total = slice_pitch.checked_mul(slices).ok_or_else(too_large)?;
        let base = self.reserve(total)?;
        Ok(PitchedBlock {
            base,
            row_pitch,
            slice_pitch,
        })
    }

    fn free(&self, addr: DeviceAddr) -> Result<(), BackendError> {
        let block = {
            let mut state = self.lock();
            let block = state
                .live
                .shift_remove(&addr)
                .ok_or(BackendError::UnknownAddress { addr })?;
            state.used -= block.len();
            block
        };
        drop(block);
        Ok(())
    }
}

impl Drop for SimDevice {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !state.live.is_empty() {
            tracing::warn!(
                leaked_blocks = state.live.len(),
                leaked_bytes = state.used,
                "sim device dropped with live blocks; releasing them"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SimDevice {
        SimDevice::new(SimDeviceConfig {
            pitch_alignment: 64,
            base_alignment: 128,
            capacity_bytes: 4096,
        })
        .unwrap()
    }

    #[test]
    fn invalid_config_rejected() {
        let result = SimDevice::new(SimDeviceConfig::new(0));
        assert!(matches!(result, Err(AllocError::InvalidConfig { .. })));
    }

    #[test]
    fn row_pitch_rounds_up_to_alignment() {
        let dev = small();
        let block = dev.alloc_pitched(16, 3, 1).unwrap();
        assert_eq!(block.row_pitch, 64);
        assert_eq!(block.slice_pitch, 192);
        assert_eq!(dev.used_bytes(), 192);
    }

    #[test]
    fn exact_multiple_is_not_padded() {
        let dev = small();
        let block = dev.alloc_pitched(128, 2, 2).unwrap();
        assert_eq!(block.row_pitch, 128);
        assert_eq!(block.slice_pitch, 256);
        assert_eq!(dev.used_bytes(), 512);
    }

    #[test]
    fn bases_are_aligned() {
        let dev = small();
        let a = dev.alloc_linear(10).unwrap();
        let b = dev.alloc_pitched(10, 2, 1).unwrap();
        assert!(a.is_aligned_to(128));
        assert!(b.base.is_aligned_to(128));
        assert_ne!(a, b.base);
    }

    #[test]
    fn capacity_is_enforced() {
        let dev = small();
        dev.alloc_linear(4000).unwrap();
        let err = dev.alloc_linear(200).unwrap_err();
        assert_eq!(
            err,
            BackendError::OutOfMemory {
                requested: 200,
                available: 96
            }
        );
    }

    #[test]
    fn free_returns_capacity() {
        let dev = small();
        let a = dev.alloc_linear(4096).unwrap();
        assert_eq!(dev.available_bytes(), 0);
        dev.free(a).unwrap();
        assert_eq!(dev.available_bytes(), 4096);
        assert_eq!(dev.live_blocks(), 0);
        assert!(dev.alloc_linear(4096).is_ok());
    }

    #[test]
    fn unknown_free_rejected() {
        let dev = small();
        let a = dev.alloc_linear(8).unwrap();
        dev.free(a).unwrap();
        assert_eq!(
            dev.free(a).unwrap_err(),
            BackendError::UnknownAddress { addr: a }
        );
    }

    #[test]
    fn empty_requests_unsupported() {
        let dev = small();
        assert!(matches!(
            dev.alloc_linear(0),
            Err(BackendError::Unsupported { .. })
        ));
        assert!(matches!(
            dev.alloc_pitched(16, 0, 1),
            Err(BackendError::Unsupported { .. })
        ));
    }

    #[test]
    fn pitched_overflow_is_out_of_memory() {
        let dev = small();
        assert!(matches!(
            dev.alloc_pitched(usize::MAX / 2, 4, 1),
            Err(BackendError::OutOfMemory { .. })
        ));
    }

    #[test]
    fn drop_with_live_blocks_releases_them() {
        let dev = small();
        dev.alloc_linear(64).unwrap();
        dev.alloc_pitched(32, 4, 1).unwrap();
        assert_eq!(dev.live_blocks(), 2);
        drop(dev);
    }

    #[test]
    fn default_device_uses_default_config() {
        let dev = SimDevice::default();
        assert_eq!(dev.config(), &SimDeviceConfig::default());
        assert_eq!(dev.name(), "sim");
    }
}
