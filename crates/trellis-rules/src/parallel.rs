//! Parallel batch aggregator.
//!
//! Three phases, separated by hard barriers:
//!
//! 1. **Per-sample build** (data-parallel over samples): each sample gets its
//!    own scratch rule book and an output grid with base offset 0.
//! 2. **Offsets** (sequential): exclusive prefix sum of per-sample output
//!    counts, stored as each output grid's base offset.
//! 3. **Merge** (data-parallel over buckets): each bucket concatenates the
//!    samples' partial buckets in ascending sample order, shifting output
//!    indices by the sample's base offset.
//!
//! Phase 1 tasks own one sample each and phase 3 tasks own one bucket each,
//! so no locking is needed. The result equals [`aggregate_sequential`]'s.
//!
//! [`aggregate_sequential`]: crate::aggregate_sequential

use std::time::Instant;

use rayon::prelude::*;
use tracing::trace;
use trellis_core::rulebook::append_shifted;
use trellis_core::RuleBook;
use trellis_grid::{ConvGeometry, GridError, SparseGrid, SparseGrids};

use crate::batch::{accumulate_outputs, validate_batch, BatchRules};
use crate::error::RuleError;
use crate::metrics::BuildMetrics;
use crate::sample::scatter_sample;

/// Build a batch's rules with per-sample parallelism.
///
/// Runs on the current rayon pool; wrap the call in
/// [`ThreadPool::install`](rayon::ThreadPool::install) (or use
/// [`RuleBuilder`](crate::RuleBuilder)) to pick a dedicated pool.
///
/// # Errors
///
/// Same as [`aggregate_sequential`](crate::aggregate_sequential). When
/// several samples fail, the lowest sample index is reported.
pub fn aggregate_parallel(
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
    let volume = geometry.volume() as usize;

    // Phase 1: independent per-sample builds.
    let build_start = Instant::now();
    let partials: Vec<Result<(SparseGrid, RuleBook), RuleError>> = inputs
        .par_iter()
        .enumerate()
        .map(|(sample_index, input)| -> Result<(SparseGrid, RuleBook), RuleError> {
            let mut output = SparseGrid::new();
            let mut rules = RuleBook::with_volume(volume);
            scatter_sample(input, &mut output, geometry, &mut rules).map_err(|error| {
                RuleError::Sample {
                    sample_index,
                    error,
                }
            })?;
            trace!(
                sample_index,
                inputs = input.len(),
                outputs = output.len(),
                "sample rules built"
            );
            Ok((output, rules))
        })
        .collect();
    let partials = partials.into_iter().collect::<Result<Vec<_>, _>>()?;
    metrics.sample_build_us = build_start.elapsed().as_micros() as u64;

    // Phase 2: exclusive prefix sum of output counts.
    let offset_start = Instant::now();
    let mut output_active = 0u32;
    let mut output_grids = SparseGrids::new();
    let mut sample_rules = Vec::with_capacity(partials.len());
    for (sample_index, (mut output, rules)) in partials.into_iter().enumerate() {
        output.set_base_offset(output_active);
        output_active = accumulate_outputs(output_active, &output, sample_index)?;
        output_grids.push(output);
        sample_rules.push(rules);
    }
    metrics.offset_us = offset_start.elapsed().as_micros() as u64;

    // Phase 3: one task per bucket, samples appended in order.
    let merge_start = Instant::now();
    let shifts: Vec<u32> = output_grids.iter().map(SparseGrid::base_offset).collect();
    let mut rules = RuleBook::with_volume(volume);
    rules
        .buckets_mut()
        .par_iter_mut()
        .enumerate()
        .try_for_each(|(offset, bucket)| {
            let len = sample_rules.iter().map(|r| r.bucket(offset).len()).sum();
            bucket.reserve_exact(len);
            for (sample_index, (partial, &shift)) in sample_rules.iter().zip(&shifts).enumerate() {
                // Unreachable after phase 2: every shifted index is < output_active.
                append_shifted(bucket, partial.bucket(offset), shift).ok_or(
                    RuleError::Sample {
                        sample_index,
                        error: GridError::IndexOverflow {
                            local: partial.bucket(offset).len() as u64,
                            base_offset: shift,
                        },
                    },
                )?;
            }
            Ok::<(), RuleError>(())
        })?;
    metrics.merge_us = merge_start.elapsed().as_micros() as u64;

    Ok(BatchRules {
        rules,
        output_grids,
        output_active,
    })
}
