//! The [`Coord`] type alias and filter-volume arithmetic.

use smallvec::SmallVec;

/// A coordinate in a sparse spatial grid.
///
/// Uses `SmallVec<[i32; 4]>` to avoid heap allocation for grids up to
/// 4 dimensions, which covers the usual 1D/2D/3D convolution cases plus a
/// time axis. Higher-dimensional grids spill to the heap transparently.
pub type Coord = SmallVec<[i32; 4]>;

/// Number of cells in a filter with the given per-dimension extents.
///
/// Returns `None` on overflow. A zero-dimensional filter has volume 1.
///
/// ```
/// assert_eq!(trellis_core::volume(&[3, 3, 3]), Some(27));
/// assert_eq!(trellis_core::volume(&[]), Some(1));
/// assert_eq!(trellis_core::volume(&[u32::MAX, 2]), None);
/// ```
pub fn volume(extents: &[u32]) -> Option<u32> {
    extents.iter().try_fold(1u32, |acc, &e| acc.checked_mul(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_of_zero_extent_is_zero() {
        assert_eq!(volume(&[4, 0, 2]), Some(0));
    }

    #[test]
    fn volume_is_product() {
        assert_eq!(volume(&[2]), Some(2));
        assert_eq!(volume(&[2, 3]), Some(6));
        assert_eq!(volume(&[65_536, 65_536]), None);
    }
}
