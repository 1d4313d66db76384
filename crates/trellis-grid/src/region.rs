//! Rectangular regions and the convolution region calculators.
//!
//! An ordinary strided convolution without padding maps output site `o` to
//! the input box `[o * stride, o * stride + size - 1]` on every axis. The two
//! calculators below are the forward and inverse views of that relation.
//! A full (transposed) convolution uses them with input and output roles
//! swapped.

use smallvec::SmallVec;
use trellis_core::Coord;

/// Axis-aligned box of lattice coordinates, bounds inclusive.
///
/// A region is empty when `lb[i] > ub[i]` on any axis. A zero-dimensional
/// region contains exactly one (empty) coordinate.
///
/// # Examples
///
/// ```
/// use trellis_grid::RectangularRegion;
///
/// let region = RectangularRegion::new(vec![0, 10].into(), vec![1, 12].into());
/// assert_eq!(region.volume(), 6);
///
/// // Row-major: the last axis varies fastest.
/// let coords: Vec<Vec<i32>> = region.iter().map(|c| c.to_vec()).collect();
/// assert_eq!(coords[0], vec![0, 10]);
/// assert_eq!(coords[1], vec![0, 11]);
/// assert_eq!(coords[3], vec![1, 10]);
///
/// assert_eq!(region.offset(&[1, 11]), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RectangularRegion {
    lb: Coord,
    ub: Coord,
}

impl RectangularRegion {
    /// Create a region from inclusive lower and upper corners.
    ///
    /// # Panics
    ///
    /// Panics if the corners have different dimension counts.
    pub fn new(lb: Coord, ub: Coord) -> Self {
        assert_eq!(
            lb.len(),
            ub.len(),
            "region corners must have the same dimension count"
        );
        Self { lb, ub }
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.lb.len()
    }

    /// Inclusive lower corner.
    pub fn lower(&self) -> &[i32] {
        &self.lb
    }

    /// Inclusive upper corner.
    pub fn upper(&self) -> &[i32] {
        &self.ub
    }

    /// Number of coordinates along `axis` (0 if the axis is empty).
    pub fn extent(&self, axis: usize) -> usize {
        let span = i64::from(self.ub[axis]) - i64::from(self.lb[axis]) + 1;
        span.max(0) as usize
    }

    /// Returns `true` if the region holds no coordinates.
    pub fn is_empty(&self) -> bool {
        (0..self.ndim()).any(|axis| self.lb[axis] > self.ub[axis])
    }

    /// Number of coordinates in the region.
    pub fn volume(&self) -> usize {
        (0..self.ndim()).map(|axis| self.extent(axis)).product()
    }

    /// Returns `true` if `coord` lies inside the region.
    pub fn contains(&self, coord: &[i32]) -> bool {
        coord.len() == self.ndim()
            && coord
                .iter()
                .zip(self.lb.iter().zip(&self.ub))
                .all(|(&c, (&lo, &hi))| lo <= c && c <= hi)
    }

    /// Linear position of `coord` in the row-major enumeration of the region.
    ///
    /// `coord` must lie inside the region (checked in debug builds). The
    /// result is always `< self.volume()` for members.
    pub fn offset(&self, coord: &[i32]) -> usize {
        debug_assert!(
            self.contains(coord),
            "{coord:?} is outside region {:?}..={:?}",
            self.lb,
            self.ub
        );
        let mut offset = 0usize;
        let mut stride = 1usize;
        for axis in (0..self.ndim()).rev() {
            offset += stride * (i64::from(coord[axis]) - i64::from(self.lb[axis])) as usize;
            stride *= self.extent(axis);
        }
        offset
    }

    /// Iterate the region's coordinates in row-major order.
    pub fn iter(&self) -> RegionIter<'_> {
        RegionIter {
            region: self,
            next: if self.is_empty() {
                None
            } else {
                Some(self.lb.clone())
            },
        }
    }
}

impl<'a> IntoIterator for &'a RectangularRegion {
    type Item = Coord;
    type IntoIter = RegionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Row-major iterator over a [`RectangularRegion`].
///
/// Created by [`RectangularRegion::iter`].
#[derive(Clone, Debug)]
pub struct RegionIter<'a> {
    region: &'a RectangularRegion,
    next: Option<Coord>,
}

impl Iterator for RegionIter<'_> {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let current = self.next.take()?;

        // Advance odometer (rightmost = fastest).
        let mut succ = current.clone();
        for axis in (0..succ.len()).rev() {
            if succ[axis] < self.region.ub[axis] {
                succ[axis] += 1;
                self.next = Some(succ);
                return Some(current);
            }
            succ[axis] = self.region.lb[axis];
        }
        Some(current)
    }
}

fn clamp_to_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Input box read by ordinary-convolution output site `output`.
///
/// On every axis: `[output * stride, output * stride + size - 1]`. No
/// padding and no clipping; the box always has exactly `size` entries per
/// axis, so its [`offset`](RectangularRegion::offset) ranges over the whole
/// filter volume.
///
/// # Panics
///
/// Panics if the three slices differ in length.
///
/// ```
/// let r = trellis_grid::receptive_field(&[3], &[2], &[2]);
/// assert_eq!(r.lower(), &[6]);
/// assert_eq!(r.upper(), &[7]);
/// ```
pub fn receptive_field(output: &[i32], size: &[u32], stride: &[u32]) -> RectangularRegion {
    assert!(
        output.len() == size.len() && size.len() == stride.len(),
        "coordinate, size and stride must have the same dimension count"
    );
    let mut lb: Coord = SmallVec::with_capacity(output.len());
    let mut ub: Coord = SmallVec::with_capacity(output.len());
    for axis in 0..output.len() {
        let start = i64::from(output[axis]) * i64::from(stride[axis]);
        lb.push(clamp_to_i32(start));
        ub.push(clamp_to_i32(start + i64::from(size[axis]) - 1));
    }
    RectangularRegion { lb, ub }
}

/// Ordinary-convolution output sites whose receptive field covers `input`.
///
/// On every axis: `lb = max(0, (input - size + stride) / stride)` with
/// truncating division and `ub = min(spatial - 1, input / stride)`. The
/// result is clipped to `[0, spatial)` and may be empty near the borders.
///
/// # Panics
///
/// Panics if the four slices differ in length.
///
/// ```
/// let r = trellis_grid::footprint(&[5], &[3], &[2], &[10]);
/// assert_eq!(r.lower(), &[2]);
/// assert_eq!(r.upper(), &[2]);
/// ```
pub fn footprint(input: &[i32], size: &[u32], stride: &[u32], spatial: &[u32]) -> RectangularRegion {
    assert!(
        input.len() == size.len() && size.len() == stride.len() && stride.len() == spatial.len(),
        "coordinate, size, stride and spatial size must have the same dimension count"
    );
    let mut lb: Coord = SmallVec::with_capacity(input.len());
    let mut ub: Coord = SmallVec::with_capacity(input.len());
    for axis in 0..input.len() {
        let c = i64::from(input[axis]);
        let s = i64::from(stride[axis]);
        let first = (c - i64::from(size[axis]) + s) / s;
        let last = c / s;
        lb.push(clamp_to_i32(first.max(0)));
        ub.push(clamp_to_i32(last.min(i64::from(spatial[axis]) - 1)));
    }
    RectangularRegion { lb, ub }
}
