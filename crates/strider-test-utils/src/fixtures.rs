//! Reusable backend and extent fixtures.
//!
//! - [`plane_backend`]: pads every row to 256 bytes, like a typical GPU.
//! - [`oom_backend`]: refuses every allocation.
//! - [`sample_extents_1d`] / [`sample_extents_2d`] / [`sample_extents_3d`]:
//!   awkward shapes that exercise padding (odd widths, single rows, tall
//!   columns).

use strider_core::Extent;

use crate::{MockBackend, PitchRule};

/// Row pitch granularity of [`plane_backend`].
pub const PLANE_PITCH: usize = 256;

/// Backend that rounds every row up to [`PLANE_PITCH`] bytes.
pub fn plane_backend() -> MockBackend {
    MockBackend::new(PitchRule::Aligned(PLANE_PITCH))
}

/// Backend whose every allocation fails with `OutOfMemory`.
pub fn oom_backend() -> MockBackend {
    MockBackend::new(PitchRule::Tight).failing_after(0)
}

/// Line lengths from a single element up to just past 4096.
pub fn sample_extents_1d() -> Vec<Extent<1>> {
    vec![Extent::new([1]), Extent::new([10]), Extent::new([4097])]
}

/// Plane shapes with odd widths, single rows, and tall columns.
pub fn sample_extents_2d() -> Vec<Extent<2>> {
    vec![
        Extent::new([1, 1]),
        Extent::new([4, 3]),
        Extent::new([63, 1]),
        Extent::new([64, 64]),
        Extent::new([1, 1000]),
        Extent::new([257, 5]),
    ]
}

/// Volume shapes including a single cell and a thin slab.
pub fn sample_extents_3d() -> Vec<Extent<3>> {
    vec![
        Extent::new([1, 1, 1]),
        Extent::new([5, 4, 2]),
        Extent::new([33, 1, 7]),
        Extent::new([16, 16, 16]),
    ]
}
