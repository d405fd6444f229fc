//! Test utilities and mock backends for Strider development.
//!
//! Provides [`MockBackend`], a [`DeviceBackend`] that hands out fake
//! addresses, records every call, and can be told how to pad rows or when
//! to fail. Nothing it returns is ever dereferenced.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::Mutex;

use indexmap::IndexMap;
use strider_core::{BackendError, DeviceAddr, DeviceBackend, PitchedBlock};

/// First fake address handed out by a [`MockBackend`].
pub const MOCK_BASE: usize = 0x1000_0000;

/// Spacing between fake blocks, so no two blocks ever overlap.
const MOCK_GUARD: usize = 0x1000;

/// How a [`MockBackend`] chooses the row pitch for a pitched request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PitchRule {
    /// Report the unpadded row width.
    Tight,
    /// Round the row width up to a multiple of the given value.
    Aligned(usize),
    /// Always report exactly this pitch, even if it is too small.
    Fixed(usize),
}

/// One recorded backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    AllocLinear { bytes: usize },
    AllocPitched {
        row_bytes: usize,
        rows: usize,
        slices: usize,
    },
    Free { addr: DeviceAddr },
}

impl BackendCall {
    pub fn is_alloc(&self) -> bool {
        !matches!(self, Self::Free { .. })
    }
}

#[derive(Default)]
struct MockState {
    calls: Vec<BackendCall>,
    live: IndexMap<DeviceAddr, usize>,
    next: usize,
    fail_next: Option<BackendError>,
    fail_after: Option<usize>,
}

/// Recording backend with configurable padding and failure injection.
///
/// Safe to share across threads; calls are recorded in the order the
/// internal lock was taken.
pub struct MockBackend {
    rule: PitchRule,
    slice_shortfall: usize,
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new(rule: PitchRule) -> Self {
        Self {
            rule,
            slice_shortfall: 0,
            state: Mutex::new(MockState {
                next: MOCK_BASE,
                ..MockState::default()
            }),
        }
    }

    /// Report slice pitches `bytes` smaller than `rows * row_pitch`.
    pub fn with_slice_shortfall(mut self, bytes: usize) -> Self {
        self.slice_shortfall = bytes;
        self
    }

    /// Make every allocation after the first `n` successful ones fail
    /// with `OutOfMemory`.
    pub fn failing_after(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_after = Some(n);
        self
    }

    /// Make the next allocation fail with `error`.
    pub fn fail_next_alloc(&self, error: BackendError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of allocation calls (successful or not).
    pub fn alloc_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.is_alloc())
            .count()
    }

    /// Number of free calls (successful or not).
    pub fn free_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| !c.is_alloc())
            .count()
    }

    /// Number of blocks allocated and not yet freed.
    pub fn live_count(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    /// Bases of live blocks, in allocation order.
    pub fn live_addrs(&self) -> Vec<DeviceAddr> {
        self.state.lock().unwrap().live.keys().copied().collect()
    }

    fn row_pitch(&self, row_bytes: usize) -> usize {
        match self.rule {
            PitchRule::Tight => row_bytes,
            PitchRule::Aligned(align) => row_bytes.div_ceil(align) * align,
            PitchRule::Fixed(pitch) => pitch,
        }
    }

    fn reserve(&self, call: BackendCall, bytes: usize) -> Result<DeviceAddr, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        if let Some(remaining) = state.fail_after {
            if remaining == 0 {
                return Err(BackendError::OutOfMemory {
                    requested: bytes,
                    available: 0,
                });
            }
            state.fail_after = Some(remaining - 1);
        }
        let addr = DeviceAddr::new(state.next).expect("mock addresses start above zero");
        state.next += bytes.div_ceil(MOCK_GUARD).max(1) * MOCK_GUARD;
        state.live.insert(addr, bytes);
        Ok(addr)
    }
}

impl DeviceBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn alloc_linear(&self, bytes: usize) -> Result<DeviceAddr, BackendError> {
        self.reserve(BackendCall::AllocLinear { bytes }, bytes)
    }

    fn alloc_pitched(
        &self,
        row_bytes: usize,
        rows: usize,
        slices: usize,
    ) -> Result<PitchedBlock, BackendError> {
        let row_pitch = self.row_pitch(row_bytes);
        let slice_pitch = (row_pitch * rows).saturating_sub(self.slice_shortfall);
        let call = BackendCall::AllocPitched {
            row_bytes,
            rows,
            slices,
        };
        let base = self.reserve(call, row_pitch * rows * slices)?;
        Ok(PitchedBlock {
            base,
            row_pitch,
            slice_pitch,
        })
    }

    fn free(&self, addr: DeviceAddr) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(BackendCall::Free { addr });
        state
            .live
            .shift_remove(&addr)
            .map(|_| ())
            .ok_or(BackendError::UnknownAddress { addr })
    }
}
