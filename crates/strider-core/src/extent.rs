//! Element-count extents for N-dimensional buffers.

use smallvec::SmallVec;
use std::fmt;
use std::ops::Index;

/// Type-erased extent components, used where the rank is not known
/// statically (error payloads, backend call records).
pub type Dims = SmallVec<[usize; 4]>;

/// Logical size of a buffer: one element count per axis.
///
/// Axis 0 is the fastest-varying (contiguous) axis. Counts are in
/// elements, never bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent<const D: usize>([usize; D]);

impl<const D: usize> Extent<D> {
    /// Number of axes.
    pub const RANK: usize = D;

    /// Create an extent from per-axis element counts.
    pub const fn new(dims: [usize; D]) -> Self {
        Self(dims)
    }

    /// Element count along `axis`, or `None` if `axis >= D`.
    pub fn get(&self, axis: usize) -> Option<usize> {
        self.0.get(axis).copied()
    }

    /// The per-axis counts as an array.
    pub fn as_array(&self) -> &[usize; D] {
        &self.0
    }

    /// The per-axis counts as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Total number of elements, or `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
    }

    /// The first axis with a zero count, if any.
    pub fn first_zero_axis(&self) -> Option<usize> {
        self.0.iter().position(|&n| n == 0)
    }

    /// Whether `index` lies inside this extent on every axis.
    pub fn contains(&self, index: &[usize; D]) -> bool {
        index.iter().zip(self.0.iter()).all(|(&i, &n)| i < n)
    }

    /// Rank-erased copy of the counts.
    pub fn dims(&self) -> Dims {
        SmallVec::from_slice(&self.0)
    }
}

impl<const D: usize> From<[usize; D]> for Extent<D> {
    fn from(dims: [usize; D]) -> Self {
        Self(dims)
    }
}

impl<const D: usize> Index<usize> for Extent<D> {
    type Output = usize;

    fn index(&self, axis: usize) -> &usize {
        &self.0[axis]
    }
}

impl<const D: usize> fmt::Display for Extent<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
