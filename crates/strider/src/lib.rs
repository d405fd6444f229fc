//! Strider: evenly pitched N-dimensional device-memory allocation.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Strider sub-crates. For most users, adding `strider` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strider::prelude::*;
//!
//! let device = SimDevice::default();
//!
//! // A 4x3 plane of f32: 16-byte rows, padded by the device to 256 bytes.
//! let cursor = DeviceMemEvenPitch::<f32, 2>::allocate(&device, Extent::new([4, 3])).unwrap();
//! assert_eq!(cursor.pitches(), &[256]);
//!
//! // Padding is folded into the strides: (3, 2) is 3*4 + 2*256 bytes in.
//! let addr = cursor.address([3, 2]).unwrap();
//! assert_eq!(addr.offset_from(cursor.base()), Some(524));
//!
//! DeviceMemEvenPitch::<f32, 2>::deallocate(&device, cursor).unwrap();
//! assert_eq!(device.live_blocks(), 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strider-core` | Extents, device addresses, location tags, backend trait |
//! | [`alloc`] | `strider-alloc` | Allocators, cursors, scoped blocks, simulated device |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and the backend trait (`strider-core`).
///
/// Contains [`types::Extent`], [`types::DeviceAddr`], the location tags
/// [`types::Device`] and [`types::Host`], and [`types::DeviceBackend`].
pub use strider_core as types;

/// Allocators and cursors (`strider-alloc`).
///
/// [`alloc::DeviceMemEvenPitch`] allocates, [`alloc::BufferCursor`]
/// addresses, [`alloc::DeviceBlock`] owns, and [`alloc::SimDevice`] is a
/// host-memory backend for tests and examples.
pub use strider_alloc as alloc;

/// Common imports for typical Strider usage.
///
/// ```rust
/// use strider::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use strider_core::{
        BackendError, Device, DeviceAddr, DeviceBackend, Extent, Host, Location, PitchedBlock,
    };

    // Allocation
    pub use strider_alloc::{
        AllocError, BufferAllocator, BufferCursor, DeviceBlock, DeviceMemEvenPitch,
    };

    // Reference backend
    pub use strider_alloc::{SimDevice, SimDeviceConfig};
}
