//! Errors reported by device-memory backends.

use std::error::Error;
use std::fmt;

use crate::addr::DeviceAddr;

/// Failure of a single backend allocation or free.
///
/// Backends must surface every failure through this type; a null or
/// zero-sized block is never a valid way to signal exhaustion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendError {
    /// The device cannot satisfy the request.
    OutOfMemory {
        /// Bytes the backend would have had to reserve (after padding).
        requested: usize,
        /// Bytes still available on the device.
        available: usize,
    },
    /// `free` was called with an address this backend did not hand out,
    /// or that has already been freed.
    UnknownAddress {
        /// The offending address.
        addr: DeviceAddr,
    },
    /// The request shape is not supported by this backend.
    Unsupported {
        /// What was unsupported.
        reason: String,
    },
    /// A driver-level error code.
    Device {
        /// Driver status code.
        code: i32,
        /// Driver-provided description.
        reason: String,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                available,
            } => {
                write!(
                    f,
                    "out of device memory: requested {requested} bytes, {available} bytes available"
                )
            }
            Self::UnknownAddress { addr } => {
                write!(f, "address {addr} is not a live allocation")
            }
            Self::Unsupported { reason } => write!(f, "unsupported request: {reason}"),
            Self::Device { code, reason } => write!(f, "device error {code}: {reason}"),
        }
    }
}

impl Error for BackendError {}
