//! Configured rule builder.
//!
//! [`RuleBuilder`] is the primary entry point for repeated builds with a
//! fixed geometry. It validates its [`RuleConfig`] once, owns a dedicated
//! rayon pool when a parallel worker count is configured, and returns
//! [`BuildMetrics`] alongside every [`BatchRules`].

use std::time::Instant;

use tracing::debug;
use trellis_grid::{ConvGeometry, SparseGrid};

use crate::batch::BatchRules;
use crate::config::{ExecutionMode, RuleConfig};
use crate::error::RuleError;
use crate::metrics::BuildMetrics;
use crate::{parallel, sequential};

// ── BuildResult ────────────────────────────────────────────────────

/// Result of a successful [`RuleBuilder::build()`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildResult {
    /// Rules and output grids for the batch.
    pub batch: BatchRules,
    /// Timing and size metrics for this build.
    pub metrics: BuildMetrics,
}

// ── RuleBuilder ────────────────────────────────────────────────────

/// Builds full-convolution rule books for batches sharing one geometry.
///
/// # Example
///
/// ```
/// use smallvec::smallvec;
/// use trellis_grid::{ConvGeometry, SparseGrid};
/// use trellis_rules::{ExecutionMode, RuleBuilder, RuleConfig};
///
/// let geometry = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
/// let config = RuleConfig::new(geometry).with_mode(ExecutionMode::Parallel);
/// let builder = RuleBuilder::new(config).unwrap();
///
/// let input = SparseGrid::from_coords(vec![smallvec![0], smallvec![2]]).unwrap();
/// let result = builder.build(&[input]).unwrap();
/// assert_eq!(result.batch.output_active, 4);
/// assert_eq!(result.metrics.total_pairs, 4);
/// ```
#[derive(Debug)]
pub struct RuleBuilder {
    config: RuleConfig,
    pool: Option<rayon::ThreadPool>,
}

impl RuleBuilder {
    /// Validate `config` and set up the worker pool it asks for.
    ///
    /// A dedicated pool is created only for [`ExecutionMode::Parallel`] with
    /// an explicit worker count; otherwise parallel builds run on the
    /// global rayon pool.
    pub fn new(config: RuleConfig) -> Result<Self, RuleError> {
        config.validate()?;
        let pool = match (config.mode, config.worker_count) {
            (ExecutionMode::Parallel, Some(workers)) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("trellis-rules-{i}"))
                    .build()
                    .map_err(|e| RuleError::ThreadPool {
                        reason: e.to_string(),
                    })?,
            ),
            _ => None,
        };
        debug!(
            mode = ?config.mode,
            workers = config.resolved_worker_count(),
            volume = config.geometry.volume(),
            ndim = config.geometry.ndim(),
            "rule builder ready"
        );
        Ok(Self { config, pool })
    }

    /// The validated configuration.
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Shorthand for `self.config().geometry`.
    pub fn geometry(&self) -> &ConvGeometry {
        &self.config.geometry
    }

    /// Build rules for one batch of input grids.
    ///
    /// Input base offsets are used as-is; see
    /// [`SparseGrids::stage_input_offsets`](trellis_grid::SparseGrids::stage_input_offsets).
    /// On error nothing is returned and the inputs are untouched.
    pub fn build(&self, inputs: &[SparseGrid]) -> Result<BuildResult, RuleError> {
        let start = Instant::now();
        let mut metrics = BuildMetrics::default();
        let geometry = &self.config.geometry;

        let batch = match self.config.mode {
            ExecutionMode::Sequential => sequential::run(inputs, geometry, &mut metrics),
            ExecutionMode::Parallel => match &self.pool {
                Some(pool) => pool.install(|| parallel::run(inputs, geometry, &mut metrics)),
                None => parallel::run(inputs, geometry, &mut metrics),
            },
        }?;

        metrics.total_us = start.elapsed().as_micros() as u64;
        metrics.samples = inputs.len();
        metrics.input_active = inputs.iter().map(SparseGrid::len).sum();
        metrics.output_active = batch.output_active;
        metrics.total_pairs = batch.rules.total_pairs();
        metrics.max_bucket_pairs = batch.rules.max_bucket_pairs();

        debug!(
            mode = ?self.config.mode,
            samples = metrics.samples,
            input_active = metrics.input_active,
            output_active = metrics.output_active,
            total_pairs = metrics.total_pairs,
            total_us = metrics.total_us,
            "rule book built"
        );
        Ok(BuildResult { batch, metrics })
    }
}

/// One-shot build from raw per-dimension arrays.
///
/// Validates the arrays into a [`ConvGeometry`], then aggregates `inputs`
/// in the requested mode on the global rayon pool.
///
/// # Errors
///
/// [`RuleError::Geometry`] for malformed arrays, otherwise the errors of
/// [`aggregate_sequential`](crate::aggregate_sequential).
pub fn full_convolution_rules(
    inputs: &[SparseGrid],
    filter_size: &[u32],
    filter_stride: &[u32],
    input_spatial_size: &[u32],
    output_spatial_size: &[u32],
    mode: ExecutionMode,
) -> Result<BatchRules, RuleError> {
    let geometry = ConvGeometry::new(
        filter_size,
        filter_stride,
        input_spatial_size,
        output_spatial_size,
    )?;
    match mode {
        ExecutionMode::Sequential => sequential::aggregate_sequential(inputs, &geometry),
        ExecutionMode::Parallel => parallel::aggregate_parallel(inputs, &geometry),
    }
}
