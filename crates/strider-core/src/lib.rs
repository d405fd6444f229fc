//! Core types and traits for Strider pitched device-memory allocation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by allocators, backends, and test doubles:
//! extents, device addresses, location tags, backend errors, and the
//! [`DeviceBackend`] trait that performs the physical reservation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod addr;
pub mod error;
pub mod extent;
pub mod location;
pub mod traits;

pub use addr::DeviceAddr;
pub use error::BackendError;
pub use extent::{Dims, Extent};
pub use location::{Device, Host, Location};
pub use traits::{DeviceBackend, PitchedBlock};
