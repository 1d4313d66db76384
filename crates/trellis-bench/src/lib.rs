//! Benchmark profiles for Trellis rule book construction.
//!
//! - [`reference_profile`]: 3D, 3x3x3 filter, stride 1, 16 samples of
//!   ~2K active sites in a 64^3 box (point-cloud-like density)
//! - [`strided_profile`]: 2D, 4x4 filter, stride 2, 32 samples of ~500
//!   sites in a 128^2 box

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use trellis_grid::{ConvGeometry, GeometryError, SparseGrids};
use trellis_test_utils::random_batch;

/// A geometry plus a staged input batch.
pub struct Profile {
    /// Filter and spatial geometry.
    pub geometry: ConvGeometry,
    /// Input grids with staged offsets.
    pub inputs: SparseGrids,
}

fn profile(
    size: &[u32],
    stride: &[u32],
    spatial: &[u32],
    samples: usize,
    max_active: usize,
    seed: u64,
) -> Result<Profile, GeometryError> {
    let geometry = ConvGeometry::full(size, stride, spatial)?;
    let inputs = random_batch(seed, spatial, samples, max_active);
    Ok(Profile { geometry, inputs })
}

/// 3D reference profile: 3x3x3 filter, stride 1, 16 samples in 64^3.
pub fn reference_profile(seed: u64) -> Result<Profile, GeometryError> {
    profile(&[3, 3, 3], &[1, 1, 1], &[64, 64, 64], 16, 4096, seed)
}

/// 2D upsampling profile: 4x4 filter, stride 2, 32 samples in 128^2.
pub fn strided_profile(seed: u64) -> Result<Profile, GeometryError> {
    profile(&[4, 4], &[2, 2], &[128, 128], 32, 1000, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_deterministic() {
        let a = reference_profile(42).unwrap();
        let b = reference_profile(42).unwrap();
        assert_eq!(a.inputs, b.inputs);
        assert_eq!(a.geometry.volume(), 27);
    }

    #[test]
    fn strided_profile_shape() {
        let p = strided_profile(1).unwrap();
        assert_eq!(p.inputs.len(), 32);
        assert_eq!(p.geometry.output_spatial_size(), &[258, 258]);
    }
}
