//! Even-pitch device-memory allocation for Strider arrays.
//!
//! Turns a logical [`Extent`](strider_core::Extent) into a backend
//! allocation whose rows (and, in 3D, slices) are padded to a
//! hardware-friendly stride, and returns a [`BufferCursor`] that hides the
//! padding from everything that indexes through it. This crate is the only
//! one in the workspace that may contain `unsafe` code, confined to
//! `raw.rs` (host memory for [`SimDevice`]).
//!
//! # Architecture
//!
//! ```text
//! DeviceMemEvenPitch<T, D> (stateless, zero-sized)
//! ├── Rank<D>: PitchLayout<D>   (rank 1: linear, rank 2/3: pitched)
//! │   └── DeviceBackend         (alloc_linear / alloc_pitched / free)
//! └── BufferCursor<T, D>        (base + extent + pitch, Copy, non-owning)
//!
//! DeviceBlock<'b, T, D, B>      (scoped owner: frees on drop)
//! SimDevice                     (host-memory reference backend)
//! ```
//!
//! # Ownership
//!
//! A [`BufferCursor`] is a plain descriptor. Copying it never affects the
//! block. Exactly one party must call
//! [`DeviceMemEvenPitch::deallocate`] for each successful
//! [`DeviceMemEvenPitch::allocate`]; [`DeviceBlock`] is the ready-made way
//! to tie that obligation to a scope.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod block;
pub mod config;
pub mod cursor;
pub mod error;
pub mod even_pitch;
pub mod layout;
mod raw;
pub mod sim;

// Public re-exports for the primary API surface.
pub use block::DeviceBlock;
pub use config::SimDeviceConfig;
pub use cursor::BufferCursor;
pub use error::AllocError;
pub use even_pitch::{BufferAllocator, DeviceMemEvenPitch};
pub use layout::{NoPitch, PitchLayout, Rank};
pub use sim::SimDevice;
