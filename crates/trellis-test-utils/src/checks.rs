//! Whole-book consistency checks.
//!
//! These walk a finished rule book against the grids it was built from and
//! panic with a descriptive message on the first violation.

use trellis_core::{Coord, RuleBook};
use trellis_grid::{ConvGeometry, SparseGrid};

/// Map every batch-global index of `grids` to `(sample, coord)`.
///
/// # Panics
///
/// Panics if two samples claim the same global index.
fn global_sites(grids: &[SparseGrid]) -> Vec<Option<(usize, Coord)>> {
    let mut sites: Vec<Option<(usize, Coord)>> = Vec::new();
    for (sample, g) in grids.iter().enumerate() {
        for (coord, local) in g.iter() {
            let global = (g.base_offset() + local) as usize;
            if sites.len() <= global {
                sites.resize(global + 1, None);
            }
            assert!(
                sites[global].is_none(),
                "global index {global} claimed twice (sample {sample})"
            );
            sites[global] = Some((sample, coord.clone()));
        }
    }
    sites
}

/// Assert that `outputs` occupy disjoint, contiguous, ascending ranges
/// starting at 0, and return the total.
pub fn assert_contiguous_outputs(outputs: &[SparseGrid]) -> u32 {
    let mut next = 0u32;
    for (sample, g) in outputs.iter().enumerate() {
        assert_eq!(
            g.base_offset(),
            next,
            "sample {sample} output range does not follow sample {}",
            sample.wrapping_sub(1)
        );
        next += g.len() as u32;
    }
    next
}

/// Assert that every pair in `rules` is a genuine full-convolution edge.
///
/// For each pair `(i, o)` in bucket `k`: both indices resolve to sites of
/// the same sample, `o`'s site lies in `geometry.scatter_region(i's site)`
/// at offset `k`, and `o`'s site is inside the output extent. Also checks
/// that every input site contributes exactly `volume` pairs.
pub fn assert_rules_consistent(
    rules: &RuleBook,
    inputs: &[SparseGrid],
    outputs: &[SparseGrid],
    geometry: &ConvGeometry,
) {
    assert_eq!(inputs.len(), outputs.len(), "sample count mismatch");
    assert_eq!(rules.len(), geometry.volume() as usize, "bucket count");

    let input_sites = global_sites(inputs);
    let output_sites = global_sites(outputs);
    let mut contributions = vec![0usize; input_sites.len()];

    for offset in 0..rules.len() {
        for (i, o) in rules.pairs(offset) {
            let (in_sample, in_coord) = input_sites
                .get(i as usize)
                .and_then(Option::as_ref)
                .unwrap_or_else(|| panic!("bucket {offset}: unknown input index {i}"));
            let (out_sample, out_coord) = output_sites
                .get(o as usize)
                .and_then(Option::as_ref)
                .unwrap_or_else(|| panic!("bucket {offset}: unknown output index {o}"));
            assert_eq!(
                in_sample, out_sample,
                "bucket {offset}: pair ({i}, {o}) crosses samples"
            );
            let region = geometry.scatter_region(in_coord);
            assert!(
                region.contains(out_coord),
                "bucket {offset}: {out_coord:?} outside scatter region of {in_coord:?}"
            );
            assert_eq!(
                region.offset(out_coord),
                offset,
                "pair ({i}, {o}) filed under the wrong bucket"
            );
            assert!(
                geometry.check_output_coord(out_coord).is_ok(),
                "{out_coord:?} outside the output extent"
            );
            contributions[i as usize] += 1;
        }
    }

    let volume = geometry.volume() as usize;
    for (index, site) in input_sites.iter().enumerate() {
        if site.is_some() {
            assert_eq!(
                contributions[index], volume,
                "input {index} contributes {} pairs, expected {volume}",
                contributions[index]
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::line;

    #[test]
    fn accepts_hand_built_book() {
        let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
        let input = line(&[0, 2]);
        let output = line(&[0, 1, 2, 3]);
        let mut rules = RuleBook::with_volume(2);
        rules.push_pair(0, 0, 0);
        rules.push_pair(1, 0, 1);
        rules.push_pair(0, 1, 2);
        rules.push_pair(1, 1, 3);
        assert_rules_consistent(&rules, &[input], &[output], &geometry);
    }

    #[test]
    #[should_panic(expected = "wrong bucket")]
    fn rejects_swapped_buckets() {
        let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
        let mut rules = RuleBook::with_volume(2);
        rules.push_pair(1, 0, 0);
        rules.push_pair(0, 0, 1);
        assert_rules_consistent(&rules, &[line(&[0])], &[line(&[0, 1])], &geometry);
    }

    #[test]
    #[should_panic(expected = "contributes")]
    fn rejects_missing_pairs() {
        let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
        let mut rules = RuleBook::with_volume(2);
        rules.push_pair(0, 0, 0);
        assert_rules_consistent(&rules, &[line(&[0])], &[line(&[0, 1])], &geometry);
    }

    #[test]
    fn contiguous_outputs_total() {
        let mut a = line(&[0, 1]);
        let mut b = line(&[5]);
        a.set_base_offset(0);
        b.set_base_offset(2);
        assert_eq!(assert_contiguous_outputs(&[a, b]), 3);
    }
}
