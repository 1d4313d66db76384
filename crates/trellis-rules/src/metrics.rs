//! Per-build performance metrics.
//!
//! [`BuildMetrics`] captures timing and size data for a single rule build,
//! enabling telemetry and sequential/parallel comparisons.

/// Timing and size metrics collected during a single rule build.
///
/// All durations are in microseconds. Phase timings that do not apply to
/// the execution mode (the offset and merge phases in sequential mode) stay
/// at zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildMetrics {
    /// Wall-clock time for the entire build, in microseconds.
    pub total_us: u64,
    /// Time spent building per-sample rules, in microseconds.
    pub sample_build_us: u64,
    /// Time spent in the prefix-sum offset pass, in microseconds.
    pub offset_us: u64,
    /// Time spent merging per-sample buckets, in microseconds.
    pub merge_us: u64,
    /// Number of samples in the batch.
    pub samples: usize,
    /// Active input sites across the batch.
    pub input_active: usize,
    /// Active output sites allocated across the batch.
    pub output_active: u32,
    /// Rule pairs across all buckets.
    pub total_pairs: usize,
    /// Rule pairs in the fullest bucket.
    pub max_bucket_pairs: usize,
}

impl BuildMetrics {
    /// Average number of pairs per input site (0.0 for an empty batch).
    pub fn pairs_per_input(&self) -> f64 {
        if self.input_active == 0 {
            return 0.0;
        }
        self.total_pairs as f64 / self.input_active as f64
    }
}
