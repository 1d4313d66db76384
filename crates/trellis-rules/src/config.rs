//! Rule builder configuration, validation, and error types.

use std::error::Error;
use std::fmt;

use trellis_grid::{ConvGeometry, GeometryError};

// ── ExecutionMode ──────────────────────────────────────────────────

/// How a batch is spread over threads.
///
/// Both modes produce bit-identical rule books; `Parallel` only trades
/// memory (one scratch rule book per sample) for throughput.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Single-threaded, samples in index order.
    #[default]
    Sequential,
    /// Fork-join over samples, prefix-sum barrier, fork-join over buckets.
    Parallel,
}

// ── RuleConfig ─────────────────────────────────────────────────────

/// Configuration for a [`RuleBuilder`](crate::RuleBuilder).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleConfig {
    /// Filter and spatial geometry shared by every sample.
    pub geometry: ConvGeometry,
    /// Execution mode. Default: [`ExecutionMode::Sequential`].
    pub mode: ExecutionMode,
    /// Worker threads for [`ExecutionMode::Parallel`]. `None` = use the
    /// global rayon pool. Ignored in sequential mode.
    pub worker_count: Option<usize>,
}

impl RuleConfig {
    /// Largest accepted explicit worker count.
    pub const MAX_WORKERS: usize = 64;

    /// Sequential config for the given geometry.
    pub fn new(geometry: ConvGeometry) -> Self {
        Self {
            geometry,
            mode: ExecutionMode::default(),
            worker_count: None,
        }
    }

    /// Validate raw per-dimension arrays and build a sequential config.
    pub fn from_raw(
        filter_size: &[u32],
        filter_stride: &[u32],
        input_spatial_size: &[u32],
        output_spatial_size: &[u32],
    ) -> Result<Self, ConfigError> {
        let geometry = ConvGeometry::new(
            filter_size,
            filter_stride,
            input_spatial_size,
            output_spatial_size,
        )
        .map_err(ConfigError::Geometry)?;
        Ok(Self::new(geometry))
    }

    /// Set the execution mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set an explicit worker count for parallel mode.
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = Some(workers);
        self
    }

    /// Number of threads a parallel build will use.
    ///
    /// Explicit values are returned as configured; `None` reports the size
    /// of the current rayon pool. Sequential mode always reports 1.
    pub fn resolved_worker_count(&self) -> usize {
        match (self.mode, self.worker_count) {
            (ExecutionMode::Sequential, _) => 1,
            (ExecutionMode::Parallel, Some(n)) => n,
            (ExecutionMode::Parallel, None) => rayon::current_num_threads(),
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(n) = self.worker_count {
            if n == 0 || n > Self::MAX_WORKERS {
                return Err(ConfigError::WorkerCountOutOfRange {
                    configured: n,
                    max: Self::MAX_WORKERS,
                });
            }
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building or validating a [`RuleConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The raw arrays do not form a valid geometry.
    Geometry(GeometryError),
    /// `worker_count` is zero or above [`RuleConfig::MAX_WORKERS`].
    WorkerCountOutOfRange {
        /// The configured value.
        configured: usize,
        /// Largest accepted value.
        max: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(e) => write!(f, "geometry: {e}"),
            Self::WorkerCountOutOfRange { configured, max } => {
                write!(f, "worker_count {configured} out of range [1, {max}]")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Geometry(e) => Some(e),
            Self::WorkerCountOutOfRange { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> ConvGeometry {
        ConvGeometry::full(&[3, 3], &[2, 2], &[8, 8]).unwrap()
    }

    #[test]
    fn default_mode_is_sequential() {
        let cfg = RuleConfig::new(geometry());
        assert_eq!(cfg.mode, ExecutionMode::Sequential);
        assert_eq!(cfg.worker_count, None);
        assert_eq!(cfg.resolved_worker_count(), 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn explicit_workers_resolve_in_parallel_mode() {
        let cfg = RuleConfig::new(geometry())
            .with_mode(ExecutionMode::Parallel)
            .with_worker_count(4);
        assert_eq!(cfg.resolved_worker_count(), 4);
    }

    #[test]
    fn implicit_workers_follow_rayon() {
        let cfg = RuleConfig::new(geometry()).with_mode(ExecutionMode::Parallel);
        assert!(cfg.resolved_worker_count() >= 1);
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = RuleConfig::new(geometry()).with_worker_count(0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::WorkerCountOutOfRange {
                configured: 0,
                max: RuleConfig::MAX_WORKERS,
            })
        );
    }

    #[test]
    fn too_many_workers_rejected() {
        let cfg = RuleConfig::new(geometry()).with_worker_count(65);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn from_raw_reports_geometry_errors() {
        let err = RuleConfig::from_raw(&[2, 2], &[1, 1], &[4], &[5, 5]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Geometry(GeometryError::DimensionMismatch { .. })
        ));
        assert!(err.source().is_some());
    }

    #[test]
    fn from_raw_accepts_valid_arrays() {
        let cfg = RuleConfig::from_raw(&[2], &[1], &[4], &[5]).unwrap();
        assert_eq!(cfg.geometry.volume(), 2);
    }
}
