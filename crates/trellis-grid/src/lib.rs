//! Sparse grids and filter geometry for Trellis.
//!
//! This crate defines the [`SparseGrid`], the coordinate→index map every
//! rule builder reads from and allocates into, together with the validated
//! [`ConvGeometry`] and the rectangular region calculators that turn a
//! coordinate plus filter geometry into a box of neighbouring coordinates.
//!
//! # Region calculators
//!
//! - [`receptive_field`]: the input box an ordinary convolution output reads.
//! - [`footprint`]: the output sites whose receptive field covers an input
//!   site, clipped to the spatial extent.
//!
//! Both return a [`RectangularRegion`], which enumerates its coordinates in
//! row-major order and resolves any member to its linear offset in O(ndim).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod grid;
pub mod region;

#[cfg(test)]
pub(crate) mod compliance;

pub use error::{GeometryError, GridError};
pub use geometry::ConvGeometry;
pub use grid::{SparseGrid, SparseGrids};
pub use region::{footprint, receptive_field, RectangularRegion, RegionIter};
