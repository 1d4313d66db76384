//! Single-sample full-convolution rule builder.
//!
//! Every active input site `c` scatters to the output sites in
//! `scatter_region(c)`, the box an ordinary convolution would *read* for
//! output `c`. Swapping the two roles is what makes the operation a full
//! (transposed) convolution. Each scattered-to site is allocated lazily in
//! the output grid, and the pair is filed under the bucket given by the
//! site's position inside the box.

use trellis_core::RuleBook;
use trellis_grid::{ConvGeometry, GridError, SparseGrid};

/// Check that every site of `input` fits `geometry` and that its global
/// indices fit in `u32`. Performs no mutation.
pub fn validate_sample(input: &SparseGrid, geometry: &ConvGeometry) -> Result<(), GridError> {
    for coord in input.coords() {
        geometry.check_input_coord(coord)?;
    }
    if let Some(last) = input.len().checked_sub(1) {
        let last = u32::try_from(last).map_err(|_| GridError::IndexOverflow {
            local: last as u64,
            base_offset: input.base_offset(),
        })?;
        input.globalize(last)?;
    }
    Ok(())
}

/// Build one sample's rules, appending to `rules` and allocating into `output`.
///
/// `rules` is resized to the filter volume. Input indices are written as
/// `local + input.base_offset()` and output indices as
/// `local + output.base_offset()`, so a caller can concatenate samples by
/// staging both offsets beforehand.
///
/// The input grid is validated before anything is written. A later index
/// overflow can leave `output` and `rules` partially filled; the batch
/// aggregators never expose such state.
///
/// # Examples
///
/// ```
/// use smallvec::smallvec;
/// use trellis_core::RuleBook;
/// use trellis_grid::{ConvGeometry, SparseGrid};
/// use trellis_rules::build_sample_rules;
///
/// let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
/// let input = SparseGrid::from_coords(vec![smallvec![0], smallvec![2]]).unwrap();
/// let mut output = SparseGrid::new();
/// let mut rules = RuleBook::default();
///
/// build_sample_rules(&input, &mut output, &geometry, &mut rules).unwrap();
/// assert_eq!(output.len(), 4);
/// assert_eq!(rules.bucket(0), &[0, 0, 1, 2]);
/// assert_eq!(rules.bucket(1), &[0, 1, 1, 3]);
/// ```
pub fn build_sample_rules(
    input: &SparseGrid,
    output: &mut SparseGrid,
    geometry: &ConvGeometry,
    rules: &mut RuleBook,
) -> Result<(), GridError> {
    validate_sample(input, geometry)?;
    scatter_sample(input, output, geometry, rules)
}

/// [`build_sample_rules`] without the up-front validation.
///
/// Callers must have run [`validate_sample`] on `input`.
pub(crate) fn scatter_sample(
    input: &SparseGrid,
    output: &mut SparseGrid,
    geometry: &ConvGeometry,
    rules: &mut RuleBook,
) -> Result<(), GridError> {
    rules.resize(geometry.volume() as usize);

    for (coord, local) in input.iter() {
        let input_index = input.globalize(local)?;
        let region = geometry.scatter_region(coord);
        for site in &region {
            let offset = region.offset(&site);
            debug_assert!(
                geometry.gather_region(&site).contains(coord),
                "{site:?} is reached from {coord:?} but does not gather from it"
            );
            let output_local = output.insert(site)?;
            let output_index = output.globalize(output_local)?;
            rules.push_pair(offset, input_index, output_index);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use trellis_core::Coord;

    fn grid(coords: &[&[i32]]) -> SparseGrid {
        SparseGrid::from_coords(coords.iter().map(|c| Coord::from_slice(c))).unwrap()
    }

    #[test]
    fn one_dimensional_scenario() {
        let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
        let input = grid(&[&[0], &[2]]);
        let mut output = SparseGrid::new();
        let mut rules = RuleBook::default();
        build_sample_rules(&input, &mut output, &geometry, &mut rules).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.pairs(0).collect::<Vec<_>>(), vec![(0, 0), (1, 2)]);
        assert_eq!(rules.pairs(1).collect::<Vec<_>>(), vec![(0, 1), (1, 3)]);
        let sites: Vec<Coord> = output.coords().cloned().collect();
        let expected: Vec<Coord> = vec![smallvec![0], smallvec![1], smallvec![2], smallvec![3]];
        assert_eq!(sites, expected);
    }

    #[test]
    fn overlapping_windows_share_output_sites() {
        // Adjacent inputs with filter 3 overlap on two output sites each.
        let geometry = ConvGeometry::full(&[3], &[1], &[4]).unwrap();
        let input = grid(&[&[1], &[2]]);
        let mut output = SparseGrid::new();
        let mut rules = RuleBook::default();
        build_sample_rules(&input, &mut output, &geometry, &mut rules).unwrap();

        // Input 1 -> outputs 1,2,3; input 2 -> outputs 2,3,4.
        assert_eq!(output.len(), 4);
        assert_eq!(rules.total_pairs(), 6);
        assert_eq!(rules.pairs(0).collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);
        assert_eq!(rules.pairs(2).collect::<Vec<_>>(), vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn strided_two_dimensional_offsets() {
        // Filter 2x2, stride 2: windows never overlap, every bucket gets one pair.
        let geometry = ConvGeometry::full(&[2, 2], &[2, 2], &[3, 3]).unwrap();
        let input = grid(&[&[1, 2]]);
        let mut output = SparseGrid::new();
        let mut rules = RuleBook::default();
        build_sample_rules(&input, &mut output, &geometry, &mut rules).unwrap();

        assert_eq!(rules.len(), 4);
        for offset in 0..4 {
            assert_eq!(rules.pairs(offset).count(), 1);
        }
        // Bucket k holds the k-th row-major site of [2,3]x[4,5].
        let site_of = |offset: usize| {
            let (_, out) = rules.pairs(offset).next().unwrap();
            output.coord(out).unwrap().to_vec()
        };
        assert_eq!(site_of(0), vec![2, 4]);
        assert_eq!(site_of(1), vec![2, 5]);
        assert_eq!(site_of(2), vec![3, 4]);
        assert_eq!(site_of(3), vec![3, 5]);
    }

    #[test]
    fn base_offsets_shift_indices() {
        let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
        let mut input = grid(&[&[0], &[2]]);
        input.set_base_offset(10);
        let mut output = SparseGrid::with_base_offset(100);
        let mut rules = RuleBook::default();
        build_sample_rules(&input, &mut output, &geometry, &mut rules).unwrap();

        assert_eq!(rules.pairs(0).collect::<Vec<_>>(), vec![(10, 100), (11, 102)]);
        // The output grid itself stays local.
        assert_eq!(output.get(&[0]), Some(0));
    }

    #[test]
    fn existing_output_sites_are_reused() {
        let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
        let input = grid(&[&[1]]);
        let mut output = grid(&[&[2]]);
        let mut rules = RuleBook::default();
        build_sample_rules(&input, &mut output, &geometry, &mut rules).unwrap();

        assert_eq!(rules.pairs(0).collect::<Vec<_>>(), vec![(0, 1)]);
        assert_eq!(rules.pairs(1).collect::<Vec<_>>(), vec![(0, 0)]);
    }

    #[test]
    fn empty_input_only_sizes_the_book() {
        let geometry = ConvGeometry::full(&[3, 3, 3], &[1, 1, 1], &[4, 4, 4]).unwrap();
        let mut output = SparseGrid::new();
        let mut rules = RuleBook::default();
        build_sample_rules(&SparseGrid::new(), &mut output, &geometry, &mut rules).unwrap();
        assert_eq!(rules.len(), 27);
        assert_eq!(rules.total_pairs(), 0);
        assert!(output.is_empty());
    }

    #[test]
    fn out_of_bounds_input_fails_before_mutation() {
        let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
        let input = grid(&[&[0], &[4]]);
        let mut output = SparseGrid::new();
        let mut rules = RuleBook::default();
        let err = build_sample_rules(&input, &mut output, &geometry, &mut rules).unwrap_err();
        assert!(matches!(err, GridError::CoordOutOfBounds { .. }));
        assert!(output.is_empty());
        assert!(rules.is_empty());
    }

    #[test]
    fn wrong_dimension_input_is_rejected() {
        let geometry = ConvGeometry::full(&[2, 2], &[1, 1], &[4, 4]).unwrap();
        let input = grid(&[&[1]]);
        assert!(validate_sample(&input, &geometry).is_err());
    }

    #[test]
    fn input_offset_overflow_is_rejected() {
        let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
        let mut input = grid(&[&[0], &[1]]);
        input.set_base_offset(u32::MAX);
        assert!(matches!(
            validate_sample(&input, &geometry),
            Err(GridError::IndexOverflow { .. })
        ));
    }
}
