//! Validated full-convolution geometry.

use crate::error::{GeometryError, GridError};
use crate::region::{footprint, receptive_field, RectangularRegion};
use smallvec::SmallVec;

/// Per-dimension extents (filter size, stride or spatial size).
pub type Extents = SmallVec<[u32; 4]>;

/// Filter size, stride and spatial extents of a full convolution.
///
/// Built from the raw per-dimension arrays a caller supplies and validated
/// once at construction, so rule builders never see mismatched lengths,
/// zero strides or extents that overflow the `i32` coordinate range.
///
/// # Examples
///
/// ```
/// use trellis_grid::ConvGeometry;
///
/// // 1D, filter 2, stride 1, 4 input sites -> 5 output sites.
/// let geom = ConvGeometry::full(&[2], &[1], &[4]).unwrap();
/// assert_eq!(geom.output_spatial_size(), &[5]);
/// assert_eq!(geom.volume(), 2);
///
/// // Output extents that cannot hold the upsampled grid are rejected.
/// assert!(ConvGeometry::new(&[2], &[1], &[4], &[4]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvGeometry {
    filter_size: Extents,
    filter_stride: Extents,
    input_spatial_size: Extents,
    output_spatial_size: Extents,
    volume: u32,
}

impl ConvGeometry {
    /// Largest accepted extent: coordinates use `i32`, so extents must fit.
    pub const MAX_EXTENT: u32 = i32::MAX as u32;

    /// Validate and build a geometry from raw per-dimension arrays.
    ///
    /// Returns an error if the arrays differ in length, any entry is zero or
    /// larger than [`MAX_EXTENT`](Self::MAX_EXTENT), the output extent is
    /// smaller than `(input - 1) * stride + size` on some axis, or the filter
    /// volume overflows `u32`.
    pub fn new(
        filter_size: &[u32],
        filter_stride: &[u32],
        input_spatial_size: &[u32],
        output_spatial_size: &[u32],
    ) -> Result<Self, GeometryError> {
        let ndim = filter_size.len();
        if ndim == 0 {
            return Err(GeometryError::ZeroDimensions);
        }
        let arrays: [(&'static str, &[u32]); 4] = [
            ("filter_size", filter_size),
            ("filter_stride", filter_stride),
            ("input_spatial_size", input_spatial_size),
            ("output_spatial_size", output_spatial_size),
        ];
        for (name, values) in arrays {
            if values.len() != ndim {
                return Err(GeometryError::DimensionMismatch {
                    name,
                    expected: ndim,
                    actual: values.len(),
                });
            }
            for (axis, &value) in values.iter().enumerate() {
                if value == 0 {
                    return Err(GeometryError::ZeroExtent { name, axis });
                }
                if value > Self::MAX_EXTENT {
                    return Err(GeometryError::ExtentTooLarge {
                        name,
                        axis,
                        value,
                        max: Self::MAX_EXTENT,
                    });
                }
            }
        }

        for axis in 0..ndim {
            let required = Self::full_extent(
                filter_size[axis],
                filter_stride[axis],
                input_spatial_size[axis],
            );
            if u64::from(output_spatial_size[axis]) < required {
                return Err(GeometryError::OutputTooSmall {
                    axis,
                    required,
                    actual: output_spatial_size[axis],
                });
            }
        }

        let volume = trellis_core::volume(filter_size).ok_or(GeometryError::VolumeOverflow)?;

        Ok(Self {
            filter_size: SmallVec::from_slice(filter_size),
            filter_stride: SmallVec::from_slice(filter_stride),
            input_spatial_size: SmallVec::from_slice(input_spatial_size),
            output_spatial_size: SmallVec::from_slice(output_spatial_size),
            volume,
        })
    }

    /// Build a geometry whose output extent is exactly
    /// `(input - 1) * stride + size` on every axis.
    pub fn full(
        filter_size: &[u32],
        filter_stride: &[u32],
        input_spatial_size: &[u32],
    ) -> Result<Self, GeometryError> {
        if filter_size.len() != filter_stride.len() || filter_size.len() != input_spatial_size.len()
        {
            // Let `new` report which array is wrong.
            return Self::new(filter_size, filter_stride, input_spatial_size, filter_size);
        }
        let mut output: Extents = SmallVec::with_capacity(filter_size.len());
        for axis in 0..filter_size.len() {
            let extent = Self::full_extent(
                filter_size[axis],
                filter_stride[axis],
                input_spatial_size[axis],
            );
            let extent = u32::try_from(extent).map_err(|_| GeometryError::ExtentTooLarge {
                name: "output_spatial_size",
                axis,
                value: u32::MAX,
                max: Self::MAX_EXTENT,
            })?;
            output.push(extent);
        }
        Self::new(filter_size, filter_stride, input_spatial_size, &output)
    }

    fn full_extent(size: u32, stride: u32, input: u32) -> u64 {
        u64::from(input.saturating_sub(1)) * u64::from(stride) + u64::from(size)
    }

    /// Number of spatial dimensions.
    pub fn ndim(&self) -> usize {
        self.filter_size.len()
    }

    /// Filter extent per dimension.
    pub fn filter_size(&self) -> &[u32] {
        &self.filter_size
    }

    /// Filter stride per dimension.
    pub fn filter_stride(&self) -> &[u32] {
        &self.filter_stride
    }

    /// Input grid extent per dimension.
    pub fn input_spatial_size(&self) -> &[u32] {
        &self.input_spatial_size
    }

    /// Output grid extent per dimension.
    pub fn output_spatial_size(&self) -> &[u32] {
        &self.output_spatial_size
    }

    /// Filter volume: the number of rule book buckets.
    pub fn volume(&self) -> u32 {
        self.volume
    }

    /// Output sites an input site scatters to under full convolution.
    ///
    /// This is the ordinary receptive-field box of `input`, read in the
    /// output grid. Its offsets select rule book buckets.
    pub fn scatter_region(&self, input: &[i32]) -> RectangularRegion {
        receptive_field(input, &self.filter_size, &self.filter_stride)
    }

    /// Input sites that scatter to `output` under full convolution.
    ///
    /// The ordinary footprint of `output`, clipped to the input extent.
    pub fn gather_region(&self, output: &[i32]) -> RectangularRegion {
        footprint(
            output,
            &self.filter_size,
            &self.filter_stride,
            &self.input_spatial_size,
        )
    }

    /// Check that `coord` is a valid input-grid coordinate.
    pub fn check_input_coord(&self, coord: &[i32]) -> Result<(), GridError> {
        check_bounds(coord, &self.input_spatial_size)
    }

    /// Check that `coord` is a valid output-grid coordinate.
    pub fn check_output_coord(&self, coord: &[i32]) -> Result<(), GridError> {
        check_bounds(coord, &self.output_spatial_size)
    }
}

fn check_bounds(coord: &[i32], extent: &[u32]) -> Result<(), GridError> {
    if coord.len() != extent.len() {
        return Err(GridError::CoordOutOfBounds {
            coord: SmallVec::from_slice(coord),
            bounds: format!(
                "expected {}D coordinate, got {}D",
                extent.len(),
                coord.len()
            ),
        });
    }
    let inside = coord
        .iter()
        .zip(extent)
        .all(|(&c, &e)| c >= 0 && (c as u32) < e);
    if !inside {
        return Err(GridError::CoordOutOfBounds {
            coord: SmallVec::from_slice(coord),
            bounds: format!("[0, {extent:?})"),
        });
    }
    Ok(())
}
