//! Core types for the Trellis sparse-convolution framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! coordinate type shared by every grid and region calculator, and the
//! [`RuleBook`] table that the rule builders fill and the gather-scatter
//! kernels consume.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord;
pub mod rulebook;

pub use coord::{volume, Coord};
pub use rulebook::RuleBook;
