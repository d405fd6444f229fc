//! Low-level host memory primitives for the simulated device.
//!
//! The only `unsafe` in the workspace. Each block is a zeroed
//! `std::alloc` allocation released in `Drop`; every `unsafe` site carries
//! a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// An owned, zero-initialised, aligned host allocation.
pub(crate) struct HostBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl HostBlock {
    /// Allocate `size` zeroed bytes aligned to `align`.
    ///
    /// Returns `None` if `size` is zero, the layout is invalid, or the host
    /// allocator fails.
    pub(crate) fn zeroed(size: usize, align: usize) -> Option<Self> {
        if size == 0 {
            return None;
        }
        let layout = Layout::from_size_align(size, align).ok()?;
        // SAFETY: `layout` has non-zero size, checked above.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(ptr).map(|ptr| Self { ptr, layout })
    }

    /// Address of the first byte.
    pub(crate) fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Size of the allocation in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for HostBlock {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed` with exactly `layout`
        // and is freed only here, once.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

// SAFETY: `HostBlock` uniquely owns its allocation and exposes no shared
// access to the bytes, so moving it across threads is sound.
unsafe impl Send for HostBlock {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_refused() {
        assert!(HostBlock::zeroed(0, 64).is_none());
    }

    #[test]
    fn block_is_aligned() {
        let b = HostBlock::zeroed(100, 256).unwrap();
        assert_eq!(b.addr() % 256, 0);
        assert_eq!(b.len(), 100);
    }

    #[test]
    fn bad_alignment_is_refused() {
        assert!(HostBlock::zeroed(16, 3).is_none());
    }
}
