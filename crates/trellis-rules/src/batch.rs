//! Batch-level rule build result and shared validation.

use trellis_core::RuleBook;
use trellis_grid::{ConvGeometry, SparseGrid, SparseGrids};

use crate::error::RuleError;
use crate::sample::validate_sample;

/// Rules and output grids for a whole batch.
///
/// Output grid `i` holds sample `i`'s output sites under local indices;
/// its base offset is the first batch-global output index of that sample,
/// so `local + base_offset` is the index used in [`rules`](Self::rules).
/// Both execution modes produce equal values of this type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchRules {
    /// One bucket per filter offset.
    pub rules: RuleBook,
    /// Per-sample output grids, in sample order.
    pub output_grids: SparseGrids,
    /// Total output sites across the batch.
    pub output_active: u32,
}

impl BatchRules {
    /// Number of samples.
    pub fn samples(&self) -> usize {
        self.output_grids.len()
    }

    /// Batch-global output index range of sample `sample`.
    ///
    /// # Panics
    ///
    /// Panics if `sample` is out of range.
    pub fn output_range(&self, sample: usize) -> std::ops::Range<u32> {
        let grid = &self.output_grids[sample];
        // Construction guarantees base + len <= output_active.
        let start = grid.base_offset();
        start..start + grid.len() as u32
    }
}

/// Validate every sample before any sample is built.
pub(crate) fn validate_batch(
    inputs: &[SparseGrid],
    geometry: &ConvGeometry,
) -> Result<(), RuleError> {
    for (sample_index, input) in inputs.iter().enumerate() {
        validate_sample(input, geometry).map_err(|error| RuleError::Sample {
            sample_index,
            error,
        })?;
    }
    Ok(())
}

/// Add one sample's output count to the running total.
pub(crate) fn accumulate_outputs(
    total: u32,
    output: &SparseGrid,
    sample_index: usize,
) -> Result<u32, RuleError> {
    u32::try_from(output.len())
        .ok()
        .and_then(|n| total.checked_add(n))
        .ok_or(RuleError::OutputOverflow { sample_index })
}
