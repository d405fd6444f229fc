//! Memory location tags.
//!
//! A location tag is a zero-sized marker type attached to allocators and
//! cursors so generic code can select device- or host-appropriate paths at
//! compile time. A cursor tagged [`Device`] cannot be handed to an API
//! expecting a [`Host`] cursor, and vice versa.

use std::fmt;

mod sealed {
    pub trait Sealed {}
}

/// A memory location. Sealed: only [`Device`] and [`Host`] exist.
pub trait Location: sealed::Sealed + Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Short lowercase name used in logs and `Display` output.
    const NAME: &'static str;
}

/// Memory owned by a compute device (not host-dereferenceable).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Device;

/// Ordinary host memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Host;

impl sealed::Sealed for Device {}
impl sealed::Sealed for Host {}

impl Location for Device {
    const NAME: &'static str = "device";
}

impl Location for Host {
    const NAME: &'static str = "host";
}
