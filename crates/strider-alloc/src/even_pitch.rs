//! The even-pitch device allocator.
//!
//! [`DeviceMemEvenPitch<T, D>`] is a zero-sized, stateless allocator. Each
//! `allocate` performs exactly one backend allocation and wraps the result
//! in a [`BufferCursor`]; each `deallocate` performs exactly one backend
//! free with the cursor's base address. Rank-specific behaviour (linear vs
//! pitched requests, pitch validation) lives in [`PitchLayout`].

use std::any::type_name;
use std::marker::PhantomData;
use std::mem::size_of;

use strider_core::{Device, DeviceBackend, Extent, Location};

use crate::cursor::BufferCursor;
use crate::error::AllocError;
use crate::layout::{PitchLayout, Rank};

/// Capability interface shared by buffer allocators of rank `D`.
///
/// Allocators are types, not values: both operations are associated
/// functions and take the backend explicitly.
pub trait BufferAllocator<const D: usize> {
    /// Element type of the buffers produced.
    type Elem;
    /// Where the buffers live.
    type Tag: Location;
    /// Cursor handed out by `allocate` and consumed by `deallocate`.
    type Cursor: Copy;

    /// Allocate a buffer of `extent` elements on `backend`.
    fn allocate<B: DeviceBackend + ?Sized>(
        backend: &B,
        extent: Extent<D>,
    ) -> Result<Self::Cursor, AllocError>;

    /// Release the buffer addressed by `cursor` on `backend`.
    fn deallocate<B: DeviceBackend + ?Sized>(
        backend: &B,
        cursor: Self::Cursor,
    ) -> Result<(), AllocError>;

    /// Name of the location the buffers live in.
    fn location() -> &'static str {
        <Self::Tag as Location>::NAME
    }

    /// Size in bytes of one element.
    fn elem_size() -> usize {
        size_of::<Self::Elem>()
    }
}

/// Stateless allocator of evenly pitched device buffers of rank `D`.
///
/// Rank 1 requests a flat block of `extent[0] * size_of::<T>()` bytes and
/// its cursor carries no pitch. Ranks 2 and 3 request a pitched block; the
/// backend chooses the padding and the cursor records it.
///
/// Zero extent components are rejected with
/// [`AllocError::InvalidExtent`] before the backend is contacted.
pub struct DeviceMemEvenPitch<T, const D: usize>(PhantomData<fn() -> T>);

impl<T, const D: usize> DeviceMemEvenPitch<T, D>
where
    Rank<D>: PitchLayout<D>,
{
    /// Number of axes handled by this allocator.
    pub const DIM: usize = D;

    /// Allocate a buffer of `extent` elements.
    ///
    /// On success the backend has performed exactly one allocation. On
    /// failure no cursor exists and nothing is left allocated.
    pub fn allocate<B: DeviceBackend + ?Sized>(
        backend: &B,
        extent: Extent<D>,
    ) -> Result<BufferCursor<T, D, Device>, AllocError> {
        let elem_size = size_of::<T>();
        if elem_size == 0 {
            return Err(AllocError::ZeroSizedElement {
                type_name: type_name::<T>(),
            });
        }
        if let Some(axis) = extent.first_zero_axis() {
            return Err(AllocError::InvalidExtent {
                extent: extent.dims(),
                axis,
            });
        }
        if extent
            .element_count()
            .and_then(|n| n.checked_mul(elem_size))
            .is_none()
        {
            return Err(AllocError::SizeOverflow {
                extent: extent.dims(),
                elem_size,
            });
        }

        let (base, pitch) = <Rank<D> as PitchLayout<D>>::request(backend, elem_size, &extent)?;
        let cursor = BufferCursor::from_parts(base, extent, pitch);
        tracing::debug!(
            backend = backend.name(),
            elem = type_name::<T>(),
            extent = %extent,
            base = %base,
            pitch = ?cursor.pitches(),
            "allocated even-pitch buffer"
        );
        Ok(cursor)
    }

    /// Release the buffer addressed by `cursor`.
    ///
    /// `cursor` must be the origin cursor returned by [`allocate`]; a view
    /// obtained through [`BufferCursor::shifted`] is rejected with
    /// [`AllocError::DerivedView`] and the backend is not contacted.
    /// Deallocating the same block twice is not detected here.
    ///
    /// Only device-tagged cursors are accepted:
    ///
    /// ```compile_fail
    /// use strider_alloc::{BufferCursor, DeviceMemEvenPitch, SimDevice};
    /// use strider_core::Host;
    ///
    /// fn free_host(device: &SimDevice, cursor: BufferCursor<f32, 2, Host>) {
    ///     let _ = DeviceMemEvenPitch::<f32, 2>::deallocate(device, cursor);
    /// }
    /// ```
    ///
    /// [`allocate`]: Self::allocate
    pub fn deallocate<B: DeviceBackend + ?Sized>(
        backend: &B,
        cursor: BufferCursor<T, D, Device>,
    ) -> Result<(), AllocError> {
        if !cursor.is_origin() {
            return Err(AllocError::DerivedView {
                base: cursor.base(),
                offset: cursor.offset(),
            });
        }
        backend
            .free(cursor.base())
            .map_err(|source| AllocError::FreeFailed {
                backend: backend.name().to_string(),
                source,
            })?;
        tracing::debug!(
            backend = backend.name(),
            base = %cursor.base(),
            "freed even-pitch buffer"
        );
        Ok(())
    }
}

impl<T, const D: usize> BufferAllocator<D> for DeviceMemEvenPitch<T, D>
where
    Rank<D>: PitchLayout<D>,
{
    type Elem = T;
    type Tag = Device;
    type Cursor = BufferCursor<T, D, Device>;

    fn allocate<B: DeviceBackend + ?Sized>(
        backend: &B,
        extent: Extent<D>,
    ) -> Result<Self::Cursor, AllocError> {
        Self::allocate(backend, extent)
    }

    fn deallocate<B: DeviceBackend + ?Sized>(
        backend: &B,
        cursor: Self::Cursor,
    ) -> Result<(), AllocError> {
        Self::deallocate(backend, cursor)
    }
}
