//! Sparse coordinate grids with lazy index allocation.

use crate::error::GridError;
use indexmap::IndexSet;
use std::ops::Index;
use trellis_core::Coord;

/// Map from active coordinates to densely packed local indices.
///
/// Local indices are assigned in insertion order starting at zero, so the
/// local allocation count is simply [`len`](Self::len). A separate, explicit
/// `base_offset` turns local indices into batch-global ones: when several
/// samples are concatenated, sample `i`'s sites occupy
/// `base_offset .. base_offset + len`.
///
/// Each grid owns its coordinate map exclusively.
///
/// # Examples
///
/// ```
/// use trellis_grid::SparseGrid;
///
/// let mut grid = SparseGrid::new();
/// assert_eq!(grid.insert(vec![4, 1].into()).unwrap(), 0);
/// assert_eq!(grid.insert(vec![0, 2].into()).unwrap(), 1);
/// // Re-inserting returns the existing index.
/// assert_eq!(grid.insert(vec![4, 1].into()).unwrap(), 0);
/// assert_eq!(grid.len(), 2);
///
/// grid.set_base_offset(10);
/// assert_eq!(grid.global_index(&[0, 2]), Some(11));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SparseGrid {
    sites: IndexSet<Coord>,
    base_offset: u32,
}

impl SparseGrid {
    /// Create an empty grid with base offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty grid with the given base offset.
    pub fn with_base_offset(base_offset: u32) -> Self {
        Self {
            sites: IndexSet::new(),
            base_offset,
        }
    }

    /// Build a grid by inserting `coords` in order. Duplicates are ignored.
    pub fn from_coords<I>(coords: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut grid = Self::new();
        for coord in coords {
            grid.insert(coord)?;
        }
        Ok(grid)
    }

    /// Number of active sites (the local allocation count).
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Returns `true` if the grid has no active sites.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Offset added to local indices to form batch-global indices.
    pub fn base_offset(&self) -> u32 {
        self.base_offset
    }

    /// Replace the base offset. Local indices are unaffected.
    pub fn set_base_offset(&mut self, base_offset: u32) {
        self.base_offset = base_offset;
    }

    /// Local index of `coord`, if active.
    pub fn get(&self, coord: &[i32]) -> Option<u32> {
        // Insertion caps the set at u32::MAX + 1 entries.
        self.sites.get_index_of(coord).map(|i| i as u32)
    }

    /// Returns `true` if `coord` is active.
    pub fn contains(&self, coord: &[i32]) -> bool {
        self.sites.contains(coord)
    }

    /// Local index of `coord`, inserting it with the next free index if absent.
    ///
    /// Idempotent: an already-active coordinate keeps its index. Fails only
    /// when the next index would not fit in `u32`.
    pub fn insert(&mut self, coord: Coord) -> Result<u32, GridError> {
        if let Some(index) = self.get(&coord) {
            return Ok(index);
        }
        let next = self.sites.len();
        let index = u32::try_from(next).map_err(|_| GridError::IndexOverflow {
            local: next as u64,
            base_offset: 0,
        })?;
        self.sites.insert(coord);
        Ok(index)
    }

    /// Local index plus base offset.
    ///
    /// Returns `None` if `coord` is not active or the sum overflows `u32`.
    pub fn global_index(&self, coord: &[i32]) -> Option<u32> {
        self.get(coord)?.checked_add(self.base_offset)
    }

    /// Convert a local index to a batch-global one.
    pub fn globalize(&self, local: u32) -> Result<u32, GridError> {
        local
            .checked_add(self.base_offset)
            .ok_or(GridError::IndexOverflow {
                local: u64::from(local),
                base_offset: self.base_offset,
            })
    }

    /// Coordinate stored at `local`, if any.
    pub fn coord(&self, local: u32) -> Option<&Coord> {
        self.sites.get_index(local as usize)
    }

    /// Iterate `(coordinate, local index)` pairs in index order.
    ///
    /// The order is stable: it only changes when new sites are inserted,
    /// which append at the end.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Coord, u32)> + '_ {
        self.sites.iter().enumerate().map(|(i, c)| (c, i as u32))
    }

    /// Iterate active coordinates in index order.
    pub fn coords(&self) -> impl ExactSizeIterator<Item = &Coord> + '_ {
        self.sites.iter()
    }

    /// Remove every site. The base offset is kept.
    pub fn clear(&mut self) {
        self.sites.clear();
    }
}

// Order-sensitive: two grids are equal only if they assign the same index
// to every coordinate.
impl PartialEq for SparseGrid {
    fn eq(&self, other: &Self) -> bool {
        self.base_offset == other.base_offset && self.sites.iter().eq(other.sites.iter())
    }
}

impl Eq for SparseGrid {}

/// Ordered batch of sparse grids, one per sample.
///
/// # Examples
///
/// ```
/// use smallvec::smallvec;
/// use trellis_grid::{SparseGrid, SparseGrids};
///
/// let a = SparseGrid::from_coords(vec![smallvec![0], smallvec![1]]).unwrap();
/// let b = SparseGrid::from_coords(vec![smallvec![3]]).unwrap();
/// let mut batch = SparseGrids::from(vec![a, b]);
///
/// assert_eq!(batch.stage_input_offsets().unwrap(), 3);
/// assert_eq!(batch[1].base_offset(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseGrids {
    grids: Vec<SparseGrid>,
}

impl SparseGrids {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Returns `true` if the batch has no samples.
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Append a sample.
    pub fn push(&mut self, grid: SparseGrid) {
        self.grids.push(grid);
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        self.grids.clear();
    }

    /// Sum of active sites across all samples.
    pub fn total_active(&self) -> usize {
        self.grids.iter().map(SparseGrid::len).sum()
    }

    /// Set each sample's base offset to the number of sites in the samples
    /// before it, so that local indices concatenate into one global range.
    ///
    /// Returns the total number of sites.
    pub fn stage_input_offsets(&mut self) -> Result<u32, GridError> {
        let mut total = 0u32;
        for grid in &mut self.grids {
            grid.set_base_offset(total);
            total = u32::try_from(grid.len())
                .ok()
                .and_then(|n| total.checked_add(n))
                .ok_or(GridError::IndexOverflow {
                    local: grid.len() as u64,
                    base_offset: total,
                })?;
        }
        Ok(total)
    }

    /// The samples as a slice.
    pub fn as_slice(&self) -> &[SparseGrid] {
        &self.grids
    }

    /// Iterate the samples in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SparseGrid> {
        self.grids.iter()
    }

    /// Consume the batch, returning its samples.
    pub fn into_vec(self) -> Vec<SparseGrid> {
        self.grids
    }
}

impl From<Vec<SparseGrid>> for SparseGrids {
    fn from(grids: Vec<SparseGrid>) -> Self {
        Self { grids }
    }
}

impl FromIterator<SparseGrid> for SparseGrids {
    fn from_iter<I: IntoIterator<Item = SparseGrid>>(iter: I) -> Self {
        Self {
            grids: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for SparseGrids {
    type Output = SparseGrid;

    fn index(&self, sample: usize) -> &SparseGrid {
        &self.grids[sample]
    }
}

impl<'a> IntoIterator for &'a SparseGrids {
    type Item = &'a SparseGrid;
    type IntoIter = std::slice::Iter<'a, SparseGrid>;

    fn into_iter(self) -> Self::IntoIter {
        self.grids.iter()
    }
}

impl AsRef<[SparseGrid]> for SparseGrids {
    fn as_ref(&self) -> &[SparseGrid] {
        &self.grids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use smallvec::smallvec;

    fn c(x: i32, y: i32) -> Coord {
        smallvec![x, y]
    }

    #[test]
    fn indices_are_dense_in_insertion_order() {
        let mut g = SparseGrid::new();
        assert_eq!(g.insert(c(5, 5)), Ok(0));
        assert_eq!(g.insert(c(1, 0)), Ok(1));
        assert_eq!(g.insert(c(0, 0)), Ok(2));
        let order: Vec<(Coord, u32)> = g.iter().map(|(c, i)| (c.clone(), i)).collect();
        assert_eq!(order, vec![(c(5, 5), 0), (c(1, 0), 1), (c(0, 0), 2)]);
    }

    #[test]
    fn lookup_by_slice() {
        let g = SparseGrid::from_coords([c(2, 3)]).unwrap();
        assert_eq!(g.get(&[2, 3]), Some(0));
        assert_eq!(g.get(&[3, 2]), None);
        assert!(g.contains(&[2, 3]));
        assert_eq!(g.coord(0), Some(&c(2, 3)));
        assert_eq!(g.coord(1), None);
    }

    #[test]
    fn base_offset_does_not_touch_local_indices() {
        let mut g = SparseGrid::with_base_offset(7);
        g.insert(c(0, 0)).unwrap();
        assert_eq!(g.get(&[0, 0]), Some(0));
        assert_eq!(g.global_index(&[0, 0]), Some(7));
        g.set_base_offset(0);
        assert_eq!(g.global_index(&[0, 0]), Some(0));
    }

    #[test]
    fn globalize_reports_overflow() {
        let g = SparseGrid::with_base_offset(u32::MAX);
        assert_eq!(g.globalize(0), Ok(u32::MAX));
        assert_eq!(
            g.globalize(1),
            Err(GridError::IndexOverflow {
                local: 1,
                base_offset: u32::MAX,
            })
        );
        assert_eq!(g.global_index(&[0, 0]), None);
    }

    #[test]
    fn clear_keeps_base_offset() {
        let mut g = SparseGrid::with_base_offset(3);
        g.insert(c(1, 1)).unwrap();
        g.clear();
        assert!(g.is_empty());
        assert_eq!(g.base_offset(), 3);
        assert_eq!(g.insert(c(9, 9)), Ok(0));
    }

    #[test]
    fn stage_input_offsets_is_exclusive_prefix_sum() {
        let mut batch: SparseGrids = [
            SparseGrid::from_coords([c(0, 0), c(0, 1), c(0, 2)]).unwrap(),
            SparseGrid::new(),
            SparseGrid::from_coords([c(1, 1)]).unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(batch.stage_input_offsets(), Ok(4));
        let offsets: Vec<u32> = batch.iter().map(SparseGrid::base_offset).collect();
        assert_eq!(offsets, vec![0, 3, 3]);
        assert_eq!(batch.total_active(), 4);
    }

    proptest! {
        #[test]
        fn reinsertion_is_idempotent(
            coords in prop::collection::vec((-8i32..8, -8i32..8), 0..64),
        ) {
            let mut g = SparseGrid::new();
            let first: Vec<u32> = coords
                .iter()
                .map(|&(x, y)| g.insert(c(x, y)).unwrap())
                .collect();
            let len = g.len();
            for (k, &(x, y)) in coords.iter().enumerate() {
                prop_assert_eq!(g.insert(c(x, y)).unwrap(), first[k]);
                prop_assert_eq!(g.get(&[x, y]), Some(first[k]));
            }
            prop_assert_eq!(g.len(), len);
            // Indices are exactly 0..len.
            let mut seen: Vec<u32> = g.iter().map(|(_, i)| i).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..len as u32).collect::<Vec<_>>());
        }
    }
}
