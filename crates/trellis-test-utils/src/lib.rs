//! Test utilities for Trellis development.
//!
//! Provides grid fixtures (hand-written and seeded-random) in [`fixtures`]
//! and whole-book consistency checks in [`checks`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod checks;
pub mod fixtures;

pub use checks::{assert_contiguous_outputs, assert_rules_consistent};
pub use fixtures::{grid, line, random_batch, random_grid};
