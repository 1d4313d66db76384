//! Region calculator compliance test helpers.
//!
//! These functions verify the invariants the rule builders rely on: offsets
//! are a bijection onto `0..volume`, enumeration is row-major, and the
//! forward/inverse calculators agree. Reused across the region and geometry
//! test modules.

use crate::region::{footprint, receptive_field, RectangularRegion};
use indexmap::IndexSet;

/// Assert that `offset` maps the region's coordinates onto `0..volume` exactly once each.
pub fn assert_offsets_bijective(region: &RectangularRegion) {
    let mut seen = IndexSet::new();
    for coord in region {
        let offset = region.offset(&coord);
        assert!(
            offset < region.volume(),
            "offset {offset} of {coord:?} exceeds volume {}",
            region.volume()
        );
        assert!(seen.insert(offset), "offset {offset} repeated at {coord:?}");
    }
    assert_eq!(
        seen.len(),
        region.volume(),
        "region enumerated {} coordinates, volume is {}",
        seen.len(),
        region.volume()
    );
}

/// Assert that enumeration is strictly increasing in lexicographic order.
pub fn assert_iteration_sorted(region: &RectangularRegion) {
    let coords: Vec<_> = region.iter().collect();
    for pair in coords.windows(2) {
        assert!(
            pair[0].as_slice() < pair[1].as_slice(),
            "enumeration not row-major: {:?} before {:?}",
            pair[0],
            pair[1]
        );
    }
}

/// Assert that every member of `receptive_field(o)` has `o` in its footprint,
/// for every output site `o` of an ordinary convolution over `spatial`.
pub fn assert_footprint_inverts_receptive_field(size: &[u32], stride: &[u32], spatial: &[u32]) {
    let bounds: Vec<i32> = spatial.iter().map(|&s| s as i32 - 1).collect();
    let all_outputs = RectangularRegion::new(
        smallvec::smallvec![0; spatial.len()],
        bounds.as_slice().into(),
    );
    for output in &all_outputs {
        let field = receptive_field(&output, size, stride);
        assert_offsets_bijective(&field);
        for input in &field {
            let fp = footprint(&input, size, stride, spatial);
            assert!(
                fp.contains(&output),
                "footprint({input:?}) = {:?}..={:?} misses {output:?}",
                fp.lower(),
                fp.upper()
            );
        }
    }
}
