//! Error types for grid and geometry operations.

use std::error::Error;
use std::fmt;

use trellis_core::Coord;

/// Errors arising from [`ConvGeometry`](crate::ConvGeometry) construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GeometryError {
    /// The filter has no dimensions.
    ZeroDimensions,
    /// A per-dimension array does not have one entry per dimension.
    DimensionMismatch {
        /// Which array is wrong.
        name: &'static str,
        /// Expected length (the filter's dimension count).
        expected: usize,
        /// Actual length.
        actual: usize,
    },
    /// A filter size, stride or spatial extent is zero.
    ZeroExtent {
        /// Which array holds the zero.
        name: &'static str,
        /// Axis of the offending entry.
        axis: usize,
    },
    /// An extent does not fit the `i32` coordinate range.
    ExtentTooLarge {
        /// Which array holds the value.
        name: &'static str,
        /// Axis of the offending entry.
        axis: usize,
        /// The value that was supplied.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
    /// The output extent cannot hold every site a full convolution produces.
    OutputTooSmall {
        /// Axis of the offending entry.
        axis: usize,
        /// `(input - 1) * stride + size` for this axis.
        required: u64,
        /// The output extent that was supplied.
        actual: u32,
    },
    /// The filter volume overflows `u32`.
    VolumeOverflow,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimensions => write!(f, "filter must have at least one dimension"),
            Self::DimensionMismatch {
                name,
                expected,
                actual,
            } => write!(f, "{name} has {actual} entries, expected {expected}"),
            Self::ZeroExtent { name, axis } => write!(f, "{name}[{axis}] must be non-zero"),
            Self::ExtentTooLarge {
                name,
                axis,
                value,
                max,
            } => write!(f, "{name}[{axis}] = {value} exceeds maximum {max}"),
            Self::OutputTooSmall {
                axis,
                required,
                actual,
            } => write!(
                f,
                "output_spatial_size[{axis}] = {actual} is smaller than the full-convolution extent {required}"
            ),
            Self::VolumeOverflow => write!(f, "filter volume overflows u32"),
        }
    }
}

impl Error for GeometryError {}

/// Errors arising from sparse grid access and index allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// A coordinate is outside the declared spatial extent, or has the
    /// wrong number of dimensions.
    CoordOutOfBounds {
        /// The offending coordinate.
        coord: Coord,
        /// Human-readable description of the valid range.
        bounds: String,
    },
    /// A local or batch-global index does not fit in `u32`.
    IndexOverflow {
        /// Local index (or local count) being converted.
        local: u64,
        /// Base offset being added.
        base_offset: u32,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoordOutOfBounds { coord, bounds } => {
                write!(f, "coordinate {coord:?} out of bounds: {bounds}")
            }
            Self::IndexOverflow { local, base_offset } => {
                write!(
                    f,
                    "index overflow: local {local} + base offset {base_offset} exceeds u32"
                )
            }
        }
    }
}

impl Error for GridError {}
