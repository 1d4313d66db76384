//! Sequential batch aggregator.
//!
//! Samples are built strictly in index order into one shared rule book.
//! Before sample `i` is built, its output grid's base offset is set to the
//! number of output sites allocated by samples `0..i`, so output indices
//! land in disjoint, contiguous per-sample ranges without a renumbering
//! pass.

use std::time::Instant;

use tracing::trace;
use trellis_core::RuleBook;
use trellis_grid::{ConvGeometry, SparseGrid, SparseGrids};

use crate::batch::{accumulate_outputs, validate_batch, BatchRules};
use crate::error::RuleError;
use crate::metrics::BuildMetrics;
use crate::sample::scatter_sample;

/// Build a batch's rules one sample at a time.
///
/// Every input grid is validated before anything is built. Input grids'
/// base offsets are used as-is; stage them with
/// [`SparseGrids::stage_input_offsets`](trellis_grid::SparseGrids::stage_input_offsets)
/// when samples should share one input index space.
///
/// # Errors
///
/// Returns [`RuleError::Sample`] naming the first invalid sample, or
/// [`RuleError::OutputOverflow`] if the output count exceeds `u32`.
pub fn aggregate_sequential(
    inputs: &[SparseGrid],
    geometry: &ConvGeometry,
) -> Result<BatchRules, RuleError> {
    run(inputs, geometry, &mut BuildMetrics::default())
}

pub(crate) fn run(
    inputs: &[SparseGrid],
    geometry: &ConvGeometry,
    metrics: &mut BuildMetrics,
) -> Result<BatchRules, RuleError> {
    validate_batch(inputs, geometry)?;

    let build_start = Instant::now();
    let mut rules = RuleBook::with_volume(geometry.volume() as usize);
    let mut output_grids = SparseGrids::new();
    let mut output_active = 0u32;

    for (sample_index, input) in inputs.iter().enumerate() {
        let mut output = SparseGrid::with_base_offset(output_active);
        scatter_sample(input, &mut output, geometry, &mut rules).map_err(|error| {
            RuleError::Sample {
                sample_index,
                error,
            }
        })?;
        output_active = accumulate_outputs(output_active, &output, sample_index)?;
        trace!(
            sample_index,
            inputs = input.len(),
            outputs = output.len(),
            base_offset = output.base_offset(),
            "sample rules built"
        );
        output_grids.push(output);
    }
    metrics.sample_build_us = build_start.elapsed().as_micros() as u64;

    Ok(BatchRules {
        rules,
        output_grids,
        output_active,
    })
}
