//! Error type for rule book construction.

use std::error::Error;
use std::fmt;

use trellis_grid::{GeometryError, GridError};

use crate::config::ConfigError;

/// Error from a rule build, annotated with the failing sample where known.
///
/// Any error aborts the whole batch: no partially merged rule book is ever
/// returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleError {
    /// The raw filter/spatial arrays do not form a valid geometry.
    Geometry(GeometryError),
    /// Builder configuration is invalid.
    Config(ConfigError),
    /// A sample's input grid violates the geometry, or its indices overflow.
    Sample {
        /// Index of the sample that failed (0-based).
        sample_index: usize,
        /// The underlying grid error.
        error: GridError,
    },
    /// The batch's total output count does not fit in `u32`.
    OutputOverflow {
        /// Index of the sample whose outputs pushed the total past `u32::MAX`.
        sample_index: usize,
    },
    /// The dedicated worker pool could not be created.
    ThreadPool {
        /// Reason reported by rayon.
        reason: String,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(e) => write!(f, "invalid geometry: {e}"),
            Self::Config(e) => write!(f, "invalid config: {e}"),
            Self::Sample {
                sample_index,
                error,
            } => write!(f, "sample {sample_index}: {error}"),
            Self::OutputOverflow { sample_index } => {
                write!(f, "sample {sample_index}: output active count overflows u32")
            }
            Self::ThreadPool { reason } => write!(f, "failed to build worker pool: {reason}"),
        }
    }
}

impl Error for RuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Geometry(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Sample { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<GeometryError> for RuleError {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

impl From<ConfigError> for RuleError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
