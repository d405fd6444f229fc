//! Buffer cursors: non-owning address descriptors for pitched blocks.
//!
//! A [`BufferCursor`] is everything needed to turn a logical index into a
//! device address: the block base, the origin of this view within the
//! block, the extent, and the pitch reported at allocation time. It never
//! consults allocator or backend state after construction.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

use strider_core::{Device, DeviceAddr, Extent, Location};

use crate::layout::{PitchLayout, Rank};

/// Copyable addressing descriptor for a `D`-dimensional pitched block of
/// `T` elements at location `L`.
///
/// Address of index `(i0, i1, i2)` relative to the view origin:
/// `i0 * size_of::<T>() + i1 * pitch[0] + i2 * pitch[1]`.
///
/// A cursor does not own its block. It stays valid until the block is
/// deallocated; nothing tracks that.
pub struct BufferCursor<T, const D: usize, L: Location = Device>
where
    Rank<D>: PitchLayout<D>,
{
    /// Base address returned by the backend.
    base: DeviceAddr,
    /// Bytes from `base` to this view's index `(0, .., 0)`.
    offset: usize,
    extent: Extent<D>,
    pitch: <Rank<D> as PitchLayout<D>>::Pitch,
    _marker: PhantomData<(fn() -> T, L)>,
}

impl<T, const D: usize, L: Location> BufferCursor<T, D, L>
where
    Rank<D>: PitchLayout<D>,
{
    /// Build a cursor at the origin of a freshly allocated block.
    pub(crate) fn from_parts(
        base: DeviceAddr,
        extent: Extent<D>,
        pitch: <Rank<D> as PitchLayout<D>>::Pitch,
    ) -> Self {
        Self {
            base,
            offset: 0,
            extent,
            pitch,
            _marker: PhantomData,
        }
    }

    /// Base address of the underlying allocation.
    pub fn base(&self) -> DeviceAddr {
        self.base
    }

    /// Address of this view's index `(0, .., 0)`.
    ///
    /// Equal to [`base`](Self::base) unless the cursor was
    /// [`shifted`](Self::shifted).
    pub fn origin(&self) -> DeviceAddr {
        // `shifted` only produces offsets that were addressable.
        self.base.checked_add(self.offset).unwrap_or(self.base)
    }

    /// Byte offset of the view origin from the allocation base.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether this cursor addresses the block from its allocation origin.
    pub fn is_origin(&self) -> bool {
        self.offset == 0
    }

    /// Element counts per axis.
    pub fn extent(&self) -> Extent<D> {
        self.extent
    }

    /// The stored pitch (typed).
    pub fn pitch(&self) -> &<Rank<D> as PitchLayout<D>>::Pitch {
        &self.pitch
    }

    /// The stored pitch values in bytes; empty for rank 1.
    pub fn pitches(&self) -> &[usize] {
        <Rank<D> as PitchLayout<D>>::pitches(&self.pitch)
    }

    /// Size of one element in bytes.
    pub fn elem_size(&self) -> usize {
        size_of::<T>()
    }

    /// Byte stride of each axis.
    pub fn strides(&self) -> [usize; D] {
        <Rank<D> as PitchLayout<D>>::strides(size_of::<T>(), &self.pitch)
    }

    /// Unpadded bytes of one row: `extent[0] * size_of::<T>()`.
    pub fn row_bytes(&self) -> usize {
        self.extent[0].saturating_mul(size_of::<T>())
    }

    /// Bytes spanned by the view, padding included: the stride of the
    /// outermost axis times its extent.
    pub fn byte_len(&self) -> usize {
        let strides = self.strides();
        match (strides.last(), self.extent.as_slice().last()) {
            (Some(&stride), Some(&count)) => stride.saturating_mul(count),
            _ => 0,
        }
    }

    /// Byte offset of `index` from the view origin.
    ///
    /// No bounds check; `None` only on arithmetic overflow.
    pub fn offset_of(&self, index: [usize; D]) -> Option<usize> {
        let strides = self.strides();
        index
            .iter()
            .zip(strides.iter())
            .try_fold(0usize, |acc, (&i, &stride)| {
                i.checked_mul(stride).and_then(|b| acc.checked_add(b))
            })
    }

    /// Device address of `index`: `base + offset + Σ index[k] * stride[k]`.
    ///
    /// No bounds check; `None` only on arithmetic overflow. Use
    /// [`checked_address`](Self::checked_address) for indexes that may lie
    /// outside the extent.
    pub fn address(&self, index: [usize; D]) -> Option<DeviceAddr> {
        let rel = self.offset_of(index)?;
        self.base.checked_add(self.offset.checked_add(rel)?)
    }

    /// Device address of `index`, or `None` if it lies outside the extent.
    pub fn checked_address(&self, index: [usize; D]) -> Option<DeviceAddr> {
        if !self.extent.contains(&index) {
            return None;
        }
        self.address(index)
    }

    /// A derived view whose origin is `index` and whose extent is what
    /// remains of this one past it. Pitches are unchanged.
    ///
    /// Returns `None` if `index` lies outside the extent. A derived view
    /// cannot be passed to `deallocate`.
    pub fn shifted(&self, index: [usize; D]) -> Option<Self> {
        if !self.extent.contains(&index) {
            return None;
        }
        let offset = self.offset.checked_add(self.offset_of(index)?)?;
        let mut remaining = *self.extent.as_array();
        for (n, i) in remaining.iter_mut().zip(index.iter()) {
            *n -= *i;
        }
        Some(Self {
            base: self.base,
            offset,
            extent: Extent::new(remaining),
            pitch: self.pitch,
            _marker: PhantomData,
        })
    }
}

impl<T, const D: usize, L: Location> Clone for BufferCursor<T, D, L>
where
    Rank<D>: PitchLayout<D>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const D: usize, L: Location> Copy for BufferCursor<T, D, L> where Rank<D>: PitchLayout<D> {}

impl<T, const D: usize, L: Location> PartialEq for BufferCursor<T, D, L>
where
    Rank<D>: PitchLayout<D>,
{
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.offset == other.offset
            && self.extent == other.extent
            && self.pitch == other.pitch
    }
}

impl<T, const D: usize, L: Location> Eq for BufferCursor<T, D, L> where Rank<D>: PitchLayout<D> {}

impl<T, const D: usize, L: Location> fmt::Debug for BufferCursor<T, D, L>
where
    Rank<D>: PitchLayout<D>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferCursor")
            .field("elem", &type_name::<T>())
            .field("location", &L::NAME)
            .field("base", &self.base)
            .field("offset", &self.offset)
            .field("extent", &self.extent)
            .field("pitch", &self.pitch)
            .finish()
    }
}

impl<T, const D: usize, L: Location> fmt::Display for BufferCursor<T, D, L>
where
    Rank<D>: PitchLayout<D>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BufferCursor<{}, {}, {}>(base={}, offset={}, extent={}, pitch={:?})",
            type_name::<T>(),
            D,
            L::NAME,
            self.base,
            self.offset,
            self.extent,
            self.pitches()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NoPitch;
    use strider_core::Host;

    fn addr(a: usize) -> DeviceAddr {
        DeviceAddr::new(a).unwrap()
    }

    fn plane() -> BufferCursor<f32, 2> {
        BufferCursor::from_parts(addr(0x1000), Extent::new([4, 3]), [256])
    }

    #[test]
    fn origin_index_is_base() {
        let c = plane();
        assert_eq!(c.address([0, 0]), Some(c.base()));
        assert_eq!(c.origin(), c.base());
        assert!(c.is_origin());
    }

    #[test]
    fn padded_plane_addressing() {
        let c = plane();
        assert_eq!(c.address([3, 2]), Some(addr(0x1000 + 524)));
        assert_eq!(c.strides(), [4, 256]);
        assert_eq!(c.row_bytes(), 16);
        assert_eq!(c.byte_len(), 768);
    }

    #[test]
    fn checked_address_rejects_out_of_extent() {
        let c = plane();
        assert_eq!(c.checked_address([4, 0]), None);
        assert_eq!(c.checked_address([0, 3]), None);
        assert_eq!(c.checked_address([3, 2]), c.address([3, 2]));
        // address is the bare formula
        assert_eq!(c.address([4, 0]), Some(addr(0x1000 + 16)));
        assert_eq!(c.address([0, 3]), Some(addr(0x1000 + 768)));
        assert_eq!(c.offset_of([4, 0]), Some(16));
    }

    #[test]
    fn address_overflow_is_none() {
        let c: BufferCursor<u8, 1> =
            BufferCursor::from_parts(addr(usize::MAX - 4), Extent::new([4]), NoPitch);
        assert!(c.address([3]).is_some());
        assert_eq!(c.address([8]), None);
        assert_eq!(c.checked_address([8]), None);
    }

    #[test]
    fn host_tagged_cursor_addresses_the_same_way() {
        let c: BufferCursor<f32, 2, Host> =
            BufferCursor::from_parts(addr(0x1000), Extent::new([4, 3]), [256]);
        assert_eq!(c.address([3, 2]), plane().address([3, 2]));
        let s = c.to_string();
        assert!(s.contains("host"), "{s}");
        assert!(format!("{c:?}").contains("\"host\""));
    }

    #[test]
    fn line_has_no_pitch() {
        let c: BufferCursor<i32, 1> =
            BufferCursor::from_parts(addr(0x2000), Extent::new([10]), NoPitch);
        assert!(c.pitches().is_empty());
        assert_eq!(c.address([9]), Some(addr(0x2000 + 36)));
        assert_eq!(c.byte_len(), 40);
    }

    #[test]
    fn volume_addressing_uses_slice_pitch() {
        let c: BufferCursor<u16, 3> =
            BufferCursor::from_parts(addr(0x4000), Extent::new([5, 4, 2]), [512, 2048]);
        assert_eq!(c.address([1, 1, 1]), Some(addr(0x4000 + 2 + 512 + 2048)));
        assert_eq!(c.byte_len(), 4096);
    }

    #[test]
    fn shifted_view_moves_origin_and_shrinks_extent() {
        let c = plane();
        let v = c.shifted([1, 2]).unwrap();
        assert_eq!(v.base(), c.base());
        assert_eq!(v.offset(), 4 + 512);
        assert!(!v.is_origin());
        assert_eq!(v.extent(), Extent::new([3, 1]));
        assert_eq!(v.address([0, 0]), c.address([1, 2]));
        assert_eq!(v.address([2, 0]), c.address([3, 2]));
        assert_eq!(v.pitches(), c.pitches());
    }

    #[test]
    fn shifted_outside_extent_is_none() {
        assert!(plane().shifted([0, 3]).is_none());
    }

    #[test]
    fn copies_are_equal_descriptors() {
        let c = plane();
        let d = c;
        assert_eq!(c, d);
    }

    #[test]
    fn display_mentions_location_and_pitch() {
        let s = plane().to_string();
        assert!(s.contains("device"));
        assert!(s.contains("pitch=[256]"));
        assert!(s.contains("extent=[4, 3]"));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn unit_step_adds_exactly_one_stride(
                w in 1usize..64,
                h in 1usize..64,
                d in 1usize..16,
                pad in 0usize..128,
                i in 0usize..63,
                j in 0usize..63,
                k in 0usize..15,
            ) {
                let row = w * 4 + pad;
                let slice = row * h + pad;
                let c: BufferCursor<f32, 3> = BufferCursor::from_parts(
                    DeviceAddr::new(0x10_0000).unwrap(),
                    Extent::new([w, h, d]),
                    [row, slice],
                );
                let (i, j, k) = (i % w, j % h, k % d);
                let here = c.address([i, j, k]).unwrap().get();
                if i + 1 < w {
                    prop_assert_eq!(c.address([i + 1, j, k]).unwrap().get() - here, 4);
                }
                if j + 1 < h {
                    prop_assert_eq!(c.address([i, j + 1, k]).unwrap().get() - here, row);
                }
                if k + 1 < d {
                    prop_assert_eq!(c.address([i, j, k + 1]).unwrap().get() - here, slice);
                }
            }

            #[test]
            fn rows_never_overlap(
                w in 1usize..64,
                h in 2usize..32,
                pad in 0usize..64,
            ) {
                let row = w * 8 + pad;
                let c: BufferCursor<f64, 2> = BufferCursor::from_parts(
                    DeviceAddr::new(0x1000).unwrap(),
                    Extent::new([w, h]),
                    [row],
                );
                for j in 0..h - 1 {
                    let last_of_row = c.address([w - 1, j]).unwrap().get() + 8;
                    let next_row = c.address([0, j + 1]).unwrap().get();
                    prop_assert!(last_of_row <= next_row);
                }
            }
        }
    }
}
