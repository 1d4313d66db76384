//! Reusable grid fixtures.
//!
//! - [`line`] / [`grid`]: literal grids, sites in the order given.
//! - [`random_grid`]: distinct random sites from a seeded ChaCha8 stream.
//! - [`random_batch`]: several random samples with staged input offsets.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smallvec::smallvec;
use trellis_core::{volume, Coord};
use trellis_grid::{SparseGrid, SparseGrids};

/// One-dimensional grid with the given sites.
///
/// # Panics
///
/// Panics if a site repeats.
pub fn line(coords: &[i32]) -> SparseGrid {
    let grid = SparseGrid::from_coords(coords.iter().map(|&x| -> Coord { smallvec![x] }))
        .expect("line fixture overflowed u32");
    assert_eq!(grid.len(), coords.len(), "line fixture has repeated sites");
    grid
}

/// N-dimensional grid with the given sites.
///
/// # Panics
///
/// Panics if a site repeats.
pub fn grid(coords: &[&[i32]]) -> SparseGrid {
    let grid = SparseGrid::from_coords(coords.iter().map(|c| Coord::from_slice(c)))
        .expect("grid fixture overflowed u32");
    assert_eq!(grid.len(), coords.len(), "grid fixture has repeated sites");
    grid
}

/// Up to `count` distinct sites drawn uniformly from `[0, spatial)`.
///
/// The count is capped at the box volume. Same seed, same grid, including
/// insertion order.
pub fn random_grid(seed: u64, spatial: &[u32], count: usize) -> SparseGrid {
    let cap = volume(spatial).map_or(usize::MAX, |v| v as usize);
    let target = count.min(cap);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut grid = SparseGrid::new();
    while grid.len() < target {
        let coord: Coord = spatial
            .iter()
            .map(|&extent| (rng.next_u64() % u64::from(extent)) as i32)
            .collect();
        grid.insert(coord).expect("fixture grids stay far below u32::MAX");
    }
    grid
}

/// `samples` random grids of at most `max_active` sites each, input
/// offsets staged so the batch shares one input index space.
///
/// Sample sizes vary with the seed and may be zero.
pub fn random_batch(seed: u64, spatial: &[u32], samples: usize, max_active: usize) -> SparseGrids {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut batch: SparseGrids = (0..samples)
        .map(|_| {
            let count = (rng.next_u64() % (max_active as u64 + 1)) as usize;
            random_grid(rng.next_u64(), spatial, count)
        })
        .collect();
    batch
        .stage_input_offsets()
        .expect("fixture batches stay far below u32::MAX");
    batch
}
