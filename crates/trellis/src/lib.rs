//! Trellis: rule book construction for sparse N-dimensional full
//! (transposed) convolution.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Trellis sub-crates. For most users, adding `trellis` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use smallvec::smallvec;
//! use trellis::prelude::*;
//!
//! // 2D, 3x3 filter, stride 2, 8x8 input grid.
//! let geometry = ConvGeometry::full(&[3, 3], &[2, 2], &[8, 8]).unwrap();
//! let builder = RuleBuilder::new(
//!     RuleConfig::new(geometry).with_mode(ExecutionMode::Parallel),
//! )
//! .unwrap();
//!
//! let mut inputs = SparseGrids::from(vec![
//!     SparseGrid::from_coords(vec![smallvec![0, 0], smallvec![4, 7]]).unwrap(),
//!     SparseGrid::from_coords(vec![smallvec![1, 1]]).unwrap(),
//! ]);
//! inputs.stage_input_offsets().unwrap();
//!
//! let result = builder.build(inputs.as_slice()).unwrap();
//! assert_eq!(result.batch.rules.len(), 9);
//! assert_eq!(result.metrics.total_pairs, 27);
//! // Sample 1's outputs follow sample 0's 18.
//! assert_eq!(result.batch.output_range(1), 18..27);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `trellis-core` | Coordinates and the rule book |
//! | [`grid`] | `trellis-grid` | Sparse grids, geometry, region calculators |
//! | [`rules`] | `trellis-rules` | Single-sample, sequential and parallel builders |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Coordinates and the rule book (`trellis-core`).
pub use trellis_core as types;

/// Sparse grids, convolution geometry and region calculators
/// (`trellis-grid`).
///
/// [`grid::receptive_field`] and [`grid::footprint`] are the two region
/// calculators; [`grid::ConvGeometry`] applies them in full-convolution
/// orientation.
pub use trellis_grid as grid;

/// Rule builders (`trellis-rules`).
///
/// [`rules::build_sample_rules`] for one sample,
/// [`rules::aggregate_sequential`] and [`rules::aggregate_parallel`] for a
/// batch, [`rules::RuleBuilder`] for configured repeated builds.
pub use trellis_rules as rules;

/// Common imports for typical Trellis usage.
///
/// ```rust
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use trellis_core::{Coord, RuleBook};

    // Grids and geometry
    pub use trellis_grid::{ConvGeometry, GeometryError, GridError, SparseGrid, SparseGrids};

    // Builders
    pub use trellis_rules::{
        aggregate_parallel, aggregate_sequential, build_sample_rules, BatchRules, BuildMetrics,
        BuildResult, ExecutionMode, RuleBuilder, RuleConfig, RuleError,
    };
}
