//! Device addresses.
//!
//! A [`DeviceAddr`] is an opaque integer address in some device's memory
//! space. It is never dereferenced on the host; allocators only do
//! arithmetic on it and hand it back to the backend that produced it.

use std::fmt;
use std::num::NonZeroUsize;

/// Non-null address of a byte in device memory.
///
/// Backends must never report a null base address, so the niche is
/// used to make `Option<DeviceAddr>` the same size as `usize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceAddr(NonZeroUsize);

impl DeviceAddr {
    /// Wrap a raw address. Returns `None` for zero.
    pub fn new(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(Self)
    }

    /// The raw integer address.
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Address `bytes` past this one, or `None` on overflow.
    pub fn checked_add(self, bytes: usize) -> Option<Self> {
        self.0.get().checked_add(bytes).and_then(Self::new)
    }

    /// Byte distance from `origin` to `self`, or `None` if `self < origin`.
    pub fn offset_from(self, origin: DeviceAddr) -> Option<usize> {
        self.0.get().checked_sub(origin.0.get())
    }

    /// Whether the address is a multiple of `align` (which must be non-zero).
    pub fn is_aligned_to(self, align: usize) -> bool {
        align != 0 && self.0.get() % align == 0
    }
}

impl fmt::Display for DeviceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert!(DeviceAddr::new(0).is_none());
        assert_eq!(DeviceAddr::new(0x1000).unwrap().get(), 0x1000);
    }

    #[test]
    fn option_uses_null_niche() {
        assert_eq!(
            std::mem::size_of::<Option<DeviceAddr>>(),
            std::mem::size_of::<usize>()
        );
    }

    #[test]
    fn arithmetic() {
        let base = DeviceAddr::new(0x1000).unwrap();
        let next = base.checked_add(524).unwrap();
        assert_eq!(next.offset_from(base), Some(524));
        assert_eq!(base.offset_from(next), None);
        let top = DeviceAddr::new(usize::MAX).unwrap();
        assert!(top.checked_add(1).is_none());
    }

    #[test]
    fn alignment() {
        let a = DeviceAddr::new(0x200).unwrap();
        assert!(a.is_aligned_to(256));
        assert!(!a.checked_add(4).unwrap().is_aligned_to(256));
        assert!(!a.is_aligned_to(0));
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(DeviceAddr::new(255).unwrap().to_string(), "0xff");
    }
}
