//! Allocator-specific error types.

use std::error::Error;
use std::fmt;

use strider_core::{BackendError, DeviceAddr, Dims};

/// Errors that can occur while allocating or releasing a pitched buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The backend could not satisfy the request. Never retried here.
    AllocationFailed {
        /// Name of the backend that refused.
        backend: String,
        /// What the backend reported.
        source: BackendError,
    },
    /// An extent component is zero. Rejected before the backend is called.
    InvalidExtent {
        /// The requested extent.
        extent: Dims,
        /// First axis with a zero count.
        axis: usize,
    },
    /// The element type has size zero, so no byte layout exists.
    ZeroSizedElement {
        /// `std::any::type_name` of the element type.
        type_name: &'static str,
    },
    /// The byte size of the request does not fit in `usize`.
    SizeOverflow {
        /// The requested extent.
        extent: Dims,
        /// Size of one element in bytes.
        elem_size: usize,
    },
    /// The backend reported a pitch smaller than the unpadded size along
    /// that axis. The block has already been returned to the backend.
    InvalidPitch {
        /// Pitch index: 0 for the row pitch, 1 for the slice pitch.
        axis: usize,
        /// Pitch reported by the backend, in bytes.
        reported: usize,
        /// Minimum acceptable pitch, in bytes.
        required: usize,
    },
    /// Attempted to deallocate through a cursor that was shifted away from
    /// its allocation origin.
    DerivedView {
        /// Base address of the original allocation.
        base: DeviceAddr,
        /// Byte offset of the view from `base`.
        offset: usize,
    },
    /// The backend rejected a free.
    FreeFailed {
        /// Name of the backend that refused.
        backend: String,
        /// What the backend reported.
        source: BackendError,
    },
    /// A backend configuration value is out of range.
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { backend, source } => {
                write!(f, "allocation on backend '{backend}' failed: {source}")
            }
            Self::InvalidExtent { extent, axis } => {
                write!(f, "invalid extent {extent:?}: axis {axis} is zero")
            }
            Self::ZeroSizedElement { type_name } => {
                write!(f, "cannot lay out zero-sized element type {type_name}")
            }
            Self::SizeOverflow { extent, elem_size } => {
                write!(
                    f,
                    "extent {extent:?} of {elem_size}-byte elements overflows usize"
                )
            }
            Self::InvalidPitch {
                axis,
                reported,
                required,
            } => {
                write!(
                    f,
                    "backend reported pitch[{axis}] = {reported} bytes, need at least {required}"
                )
            }
            Self::DerivedView { base, offset } => {
                write!(
                    f,
                    "cannot deallocate a derived view: origin is {offset} bytes past base {base}"
                )
            }
            Self::FreeFailed { backend, source } => {
                write!(f, "free on backend '{backend}' failed: {source}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for AllocError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AllocationFailed { source, .. } | Self::FreeFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn allocation_failure_exposes_backend_source() {
        let e = AllocError::AllocationFailed {
            backend: "sim".into(),
            source: BackendError::OutOfMemory {
                requested: 4096,
                available: 0,
            },
        };
        let src = e.source().unwrap();
        assert_eq!(
            src.to_string(),
            "out of device memory: requested 4096 bytes, 0 bytes available"
        );
    }

    #[test]
    fn invalid_extent_names_axis() {
        let e = AllocError::InvalidExtent {
            extent: smallvec![4, 0],
            axis: 1,
        };
        assert_eq!(e.to_string(), "invalid extent [4, 0]: axis 1 is zero");
        assert!(e.source().is_none());
    }
}
