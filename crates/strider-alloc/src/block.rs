//! Scoped ownership of a single device allocation.
//!
//! [`DeviceBlock`] carries the deallocation obligation that a
//! [`BufferCursor`] deliberately does not. It frees its block exactly once:
//! explicitly through [`DeviceBlock::release`], or on drop.

use std::fmt;
use std::mem;

use strider_core::{Device, DeviceBackend, Extent};

use crate::cursor::BufferCursor;
use crate::error::AllocError;
use crate::even_pitch::DeviceMemEvenPitch;
use crate::layout::{PitchLayout, Rank};

/// Owner of one even-pitch allocation on a borrowed backend.
///
/// Hands out copies of its cursor for addressing. Dropping the block frees
/// it; a free failure during drop is logged, since `Drop` cannot return it.
/// Use [`release`](Self::release) to observe that error instead.
#[must_use]
pub struct DeviceBlock<'b, T, const D: usize, B: DeviceBackend + ?Sized>
where
    Rank<D>: PitchLayout<D>,
{
    backend: &'b B,
    cursor: BufferCursor<T, D, Device>,
}

impl<'b, T, const D: usize, B: DeviceBackend + ?Sized> DeviceBlock<'b, T, D, B>
where
    Rank<D>: PitchLayout<D>,
{
    /// Allocate a block of `extent` elements on `backend`.
    pub fn allocate(backend: &'b B, extent: Extent<D>) -> Result<Self, AllocError> {
        let cursor = DeviceMemEvenPitch::<T, D>::allocate(backend, extent)?;
        Ok(Self { backend, cursor })
    }

    /// A copy of the origin cursor.
    pub fn cursor(&self) -> BufferCursor<T, D, Device> {
        self.cursor
    }

    /// The backend the block lives on.
    pub fn backend(&self) -> &'b B {
        self.backend
    }

    /// Free the block now, reporting any backend error.
    pub fn release(self) -> Result<(), AllocError> {
        let (backend, cursor) = (self.backend, self.cursor);
        mem::forget(self);
        DeviceMemEvenPitch::<T, D>::deallocate(backend, cursor)
    }

    /// Give up ownership without freeing. The caller becomes responsible
    /// for passing the returned cursor to
    /// [`DeviceMemEvenPitch::deallocate`] exactly once.
    pub fn into_raw(self) -> BufferCursor<T, D, Device> {
        let cursor = self.cursor;
        mem::forget(self);
        cursor
    }
}

impl<T, const D: usize, B: DeviceBackend + ?Sized> Drop for DeviceBlock<'_, T, D, B>
where
    Rank<D>: PitchLayout<D>,
{
    fn drop(&mut self) {
        if let Err(e) = DeviceMemEvenPitch::<T, D>::deallocate(self.backend, self.cursor) {
            tracing::error!(
                backend = self.backend.name(),
                base = %self.cursor.base(),
                error = %e,
                "failed to free device block on drop"
            );
        }
    }
}

impl<T, const D: usize, B: DeviceBackend + ?Sized> fmt::Debug for DeviceBlock<'_, T, D, B>
where
    Rank<D>: PitchLayout<D>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBlock")
            .field("backend", &self.backend.name())
            .field("cursor", &self.cursor)
            .finish()
    }
}
