//! Rank-specific pitch layouts.
//!
//! [`PitchLayout`] is implemented for [`Rank<1>`], [`Rank<2>`] and
//! [`Rank<3>`]. Each implementation knows which backend entry point to
//! call, how to validate what the backend reports, and how to turn the
//! stored pitch into per-axis byte strides:
//!
//! | Rank | Backend call    | Pitch                  | Strides                      |
//! |------|-----------------|------------------------|------------------------------|
//! | 1    | `alloc_linear`  | [`NoPitch`]            | `[size]`                     |
//! | 2    | `alloc_pitched` | `[row]`                | `[size, row]`                |
//! | 3    | `alloc_pitched` | `[row, slice]`         | `[size, row, slice]`         |

use std::fmt;
use std::hash::Hash;

use strider_core::{BackendError, DeviceAddr, DeviceBackend, Extent, PitchedBlock};

use crate::error::AllocError;

/// Type-level rank marker. Only ranks 1, 2 and 3 have a layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rank<const D: usize>;

/// Pitch of a rank-1 buffer. There is only one row, so nothing to pad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NoPitch;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Rank<1> {}
    impl Sealed for super::Rank<2> {}
    impl Sealed for super::Rank<3> {}
}

/// How a buffer of rank `D` is requested from a backend and addressed.
pub trait PitchLayout<const D: usize>: sealed::Sealed {
    /// Byte pitches stored in the cursor: `D - 1` values, or [`NoPitch`].
    type Pitch: Copy + fmt::Debug + PartialEq + Eq + Hash + Send + Sync + 'static;

    /// Issue exactly one backend allocation for `extent` elements of
    /// `elem_size` bytes and validate the reported pitch.
    ///
    /// `extent` must already be free of zero components.
    fn request<B: DeviceBackend + ?Sized>(
        backend: &B,
        elem_size: usize,
        extent: &Extent<D>,
    ) -> Result<(DeviceAddr, Self::Pitch), AllocError>;

    /// The pitch values as a slice (empty for rank 1).
    fn pitches(pitch: &Self::Pitch) -> &[usize];

    /// Byte stride of each axis: the element size, then the pitches.
    fn strides(elem_size: usize, pitch: &Self::Pitch) -> [usize; D];
}

impl PitchLayout<1> for Rank<1> {
    type Pitch = NoPitch;

    fn request<B: DeviceBackend + ?Sized>(
        backend: &B,
        elem_size: usize,
        extent: &Extent<1>,
    ) -> Result<(DeviceAddr, NoPitch), AllocError> {
        let bytes = row_bytes(elem_size, extent)?;
        let base = backend
            .alloc_linear(bytes)
            .map_err(|source| allocation_failed(backend, source))?;
        Ok((base, NoPitch))
    }

    fn pitches(_pitch: &NoPitch) -> &[usize] {
        &[]
    }

    fn strides(elem_size: usize, _pitch: &NoPitch) -> [usize; 1] {
        [elem_size]
    }
}

impl PitchLayout<2> for Rank<2> {
    type Pitch = [usize; 1];

    fn request<B: DeviceBackend + ?Sized>(
        backend: &B,
        elem_size: usize,
        extent: &Extent<2>,
    ) -> Result<(DeviceAddr, [usize; 1]), AllocError> {
        let row = row_bytes(elem_size, extent)?;
        let block = backend
            .alloc_pitched(row, extent[1], 1)
            .map_err(|source| allocation_failed(backend, source))?;
        check_pitch(backend, &block, 0, block.row_pitch, row)?;
        Ok((block.base, [block.row_pitch]))
    }

    fn pitches(pitch: &[usize; 1]) -> &[usize] {
        pitch
    }

    fn strides(elem_size: usize, pitch: &[usize; 1]) -> [usize; 2] {
        [elem_size, pitch[0]]
    }
}

impl PitchLayout<3> for Rank<3> {
    type Pitch = [usize; 2];

    fn request<B: DeviceBackend + ?Sized>(
        backend: &B,
        elem_size: usize,
        extent: &Extent<3>,
    ) -> Result<(DeviceAddr, [usize; 2]), AllocError> {
        let row = row_bytes(elem_size, extent)?;
        let block = backend
            .alloc_pitched(row, extent[1], extent[2])
            .map_err(|source| allocation_failed(backend, source))?;
        check_pitch(backend, &block, 0, block.row_pitch, row)?;
        // A row pitch this large cannot describe a real block; treat it as
        // an unsatisfiable slice pitch.
        let min_slice = extent[1].checked_mul(block.row_pitch).unwrap_or(usize::MAX);
        check_pitch(backend, &block, 1, block.slice_pitch, min_slice)?;
        Ok((block.base, [block.row_pitch, block.slice_pitch]))
    }

    fn pitches(pitch: &[usize; 2]) -> &[usize] {
        pitch
    }

    fn strides(elem_size: usize, pitch: &[usize; 2]) -> [usize; 3] {
        [elem_size, pitch[0], pitch[1]]
    }
}

/// Unpadded width of axis 0 in bytes.
fn row_bytes<const D: usize>(elem_size: usize, extent: &Extent<D>) -> Result<usize, AllocError> {
    extent[0]
        .checked_mul(elem_size)
        .ok_or_else(|| AllocError::SizeOverflow {
            extent: extent.dims(),
            elem_size,
        })
}

fn allocation_failed<B: DeviceBackend + ?Sized>(backend: &B, source: BackendError) -> AllocError {
    AllocError::AllocationFailed {
        backend: backend.name().to_string(),
        source,
    }
}

/// Reject a pitch below `required`, handing the block back first so the
/// error path leaks nothing.
fn check_pitch<B: DeviceBackend + ?Sized>(
    backend: &B,
    block: &PitchedBlock,
    axis: usize,
    reported: usize,
    required: usize,
) -> Result<(), AllocError> {
    if reported >= required {
        return Ok(());
    }
    tracing::warn!(
        backend = backend.name(),
        base = %block.base,
        axis,
        reported,
        required,
        "backend reported a pitch below the unpadded size"
    );
    if let Err(e) = backend.free(block.base) {
        tracing::warn!(
            backend = backend.name(),
            base = %block.base,
            error = %e,
            "failed to return block with invalid pitch"
        );
    }
    Err(AllocError::InvalidPitch {
        axis,
        reported,
        required,
    })
}
