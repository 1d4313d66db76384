//! Full-convolution rule book construction for Trellis.
//!
//! Given a batch of sparse input grids and a [`ConvGeometry`], the builders
//! in this crate allocate each sample's output sites and record, per filter
//! offset, the `(input, output)` index pairs a gather-scatter kernel must
//! process.
//!
//! # Execution modes
//!
//! - [`aggregate_sequential`]: one sample after another, each sample's output
//!   indices starting where the previous sample's ended.
//! - [`aggregate_parallel`]: every sample built independently on the rayon
//!   pool, then renumbered with an exclusive prefix sum and merged one
//!   bucket per task. The result is identical to the sequential one.
//!
//! [`RuleBuilder`] wraps both behind a validated [`RuleConfig`], records
//! [`BuildMetrics`] and emits `tracing` events.
//!
//! [`ConvGeometry`]: trellis_grid::ConvGeometry

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod builder;
pub mod config;
pub mod error;
pub mod metrics;
pub mod parallel;
pub mod sample;
pub mod sequential;

pub use batch::BatchRules;
pub use builder::{full_convolution_rules, BuildResult, RuleBuilder};
pub use config::{ConfigError, ExecutionMode, RuleConfig};
pub use error::RuleError;
pub use metrics::BuildMetrics;
pub use parallel::aggregate_parallel;
pub use sample::build_sample_rules;
pub use sequential::aggregate_sequential;
