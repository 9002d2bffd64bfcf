//! Transform parameters: everything that determines which plan an engine builds

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;

/// Inline storage for per-axis values of a rank 1-3 transform
pub type AxisVec = SmallVec<[usize; 3]>;

/// Data layout of a transform's input or output buffer
///
/// Discriminants match the conventional FFT library enumeration and are
/// stable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FftLayout {
    /// Complex values, real and imaginary parts interleaved
    ComplexInterleaved = 1,
    /// Complex values, real and imaginary parts in separate buffers
    ComplexPlanar = 2,
    /// Conjugate-symmetric half spectrum, interleaved
    HermitianInterleaved = 3,
    /// Conjugate-symmetric half spectrum, planar
    HermitianPlanar = 4,
    /// Real values
    Real = 5,
}

impl FftLayout {
    /// True for layouts storing complex values (full or half spectrum)
    #[inline]
    pub const fn is_complex(self) -> bool {
        !matches!(self, Self::Real)
    }

    /// True for the conjugate-symmetric half-spectrum layouts
    #[inline]
    pub const fn is_hermitian(self) -> bool {
        matches!(self, Self::HermitianInterleaved | Self::HermitianPlanar)
    }

    /// True for layouts split across two buffers
    #[inline]
    pub const fn is_planar(self) -> bool {
        matches!(self, Self::ComplexPlanar | Self::HermitianPlanar)
    }
}

/// Numeric precision of a transform
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FftPrecision {
    /// 32-bit floats
    Single = 1,
    /// 64-bit floats
    Double = 2,
}

impl FftPrecision {
    /// Size in bytes of one real scalar at this precision
    #[inline]
    pub const fn scalar_bytes(self) -> usize {
        match self {
            Self::Single => 4,
            Self::Double => 8,
        }
    }
}

/// Number of axes a transform runs over
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Rank {
    /// 1D transform
    One = 1,
    /// 2D transform
    Two = 2,
    /// 3D transform
    Three = 3,
}

impl Rank {
    /// Convert from an axis count
    pub fn new(rank: usize) -> Result<Self> {
        match rank {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(Error::invalid_argument(
                "rank",
                format!("transform rank must be 1, 2 or 3, got {}", rank),
            )),
        }
    }

    /// Axis count
    #[inline]
    pub const fn get(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Where a plan writes its result
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResultLocation {
    /// Output overwrites the input buffer
    InPlace,
    /// Output goes to a separate buffer
    OutOfPlace,
}

/// Per-axis strides plus the distance between consecutive batch entries
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StrideGroup {
    strides: AxisVec,
    distance: usize,
}

impl StrideGroup {
    /// Per-axis element strides
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Element distance between batch entries
    #[inline]
    pub fn distance(&self) -> usize {
        self.distance
    }
}

/// Immutable description of a transform
///
/// Two parameter sets that compare equal are interchangeable: an engine
/// builds the same plan for both.
///
/// # Example
///
/// ```
/// use planr::fft::{FftLayout, FftPrecision, TransformParams};
///
/// let params = TransformParams::new(
///     FftLayout::ComplexInterleaved,
///     FftLayout::ComplexInterleaved,
///     &[8, 4],
///     FftPrecision::Single,
/// )?
/// .with_input_strides(&[1, 8], 32)?
/// .with_batch(3)?;
///
/// assert_eq!(params.rank().get(), 2);
/// assert_eq!(params.batch(), 3);
/// # Ok::<(), planr::error::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransformParams {
    input_layout: FftLayout,
    output_layout: FftLayout,
    rank: Rank,
    lengths: AxisVec,
    input_strides: Option<StrideGroup>,
    output_strides: Option<StrideGroup>,
    precision: FftPrecision,
    batch: usize,
}

impl TransformParams {
    /// Describe an unbatched transform over `lengths` (1 to 3 axes)
    pub fn new(
        input_layout: FftLayout,
        output_layout: FftLayout,
        lengths: &[usize],
        precision: FftPrecision,
    ) -> Result<Self> {
        let rank = Rank::new(lengths.len())?;
        if let Some(axis) = lengths.iter().position(|&n| n == 0) {
            return Err(Error::invalid_argument(
                "lengths",
                format!("axis {} has zero length", axis),
            ));
        }
        Ok(Self {
            input_layout,
            output_layout,
            rank,
            lengths: lengths.iter().copied().collect(),
            input_strides: None,
            output_strides: None,
            precision,
            batch: 1,
        })
    }

    /// Attach input strides (one per axis) and batch distance
    pub fn with_input_strides(mut self, strides: &[usize], distance: usize) -> Result<Self> {
        self.input_strides = Some(self.stride_group("input_strides", strides, distance)?);
        Ok(self)
    }

    /// Attach output strides (one per axis) and batch distance
    pub fn with_output_strides(mut self, strides: &[usize], distance: usize) -> Result<Self> {
        self.output_strides = Some(self.stride_group("output_strides", strides, distance)?);
        Ok(self)
    }

    /// Set the number of transforms computed per submission
    pub fn with_batch(mut self, batch: usize) -> Result<Self> {
        if batch == 0 {
            return Err(Error::invalid_argument("batch", "batch must be at least 1"));
        }
        self.batch = batch;
        Ok(self)
    }

    fn stride_group(
        &self,
        arg: &'static str,
        strides: &[usize],
        distance: usize,
    ) -> Result<StrideGroup> {
        if strides.len() != self.rank.get() {
            return Err(Error::invalid_argument(
                arg,
                format!(
                    "expected {} strides for a rank-{} transform, got {}",
                    self.rank.get(),
                    self.rank,
                    strides.len()
                ),
            ));
        }
        Ok(StrideGroup {
            strides: strides.iter().copied().collect(),
            distance,
        })
    }

    /// Input buffer layout
    #[inline]
    pub fn input_layout(&self) -> FftLayout {
        self.input_layout
    }

    /// Output buffer layout
    #[inline]
    pub fn output_layout(&self) -> FftLayout {
        self.output_layout
    }

    /// Number of transformed axes
    #[inline]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Logical transform length along each axis
    #[inline]
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Input strides, if supplied
    #[inline]
    pub fn input_strides(&self) -> Option<&StrideGroup> {
        self.input_strides.as_ref()
    }

    /// Output strides, if supplied
    #[inline]
    pub fn output_strides(&self) -> Option<&StrideGroup> {
        self.output_strides.as_ref()
    }

    /// Numeric precision
    #[inline]
    pub fn precision(&self) -> FftPrecision {
        self.precision
    }

    /// Number of transforms per submission
    #[inline]
    pub fn batch(&self) -> usize {
        self.batch
    }

    /// Identical layouts run in place, differing layouts out of place
    #[inline]
    pub fn result_location(&self) -> ResultLocation {
        if self.input_layout == self.output_layout {
            ResultLocation::InPlace
        } else {
            ResultLocation::OutOfPlace
        }
    }

    /// Number of points in one transform
    #[inline]
    pub fn transform_size(&self) -> usize {
        self.lengths.iter().product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c2c(lengths: &[usize]) -> Result<TransformParams> {
        TransformParams::new(
            FftLayout::ComplexInterleaved,
            FftLayout::ComplexInterleaved,
            lengths,
            FftPrecision::Double,
        )
    }

    #[test]
    fn test_rank_bounds() {
        assert!(c2c(&[]).is_err());
        assert!(c2c(&[2, 2, 2, 2]).is_err());
        assert_eq!(c2c(&[4, 4, 4]).unwrap().rank(), Rank::Three);
        assert!(Rank::new(0).is_err());
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(c2c(&[8, 0]).is_err());
    }

    #[test]
    fn test_stride_count_must_match_rank() {
        let params = c2c(&[8, 4]).unwrap();
        assert!(params.clone().with_input_strides(&[1], 8).is_err());
        let params = params.with_output_strides(&[1, 8], 32).unwrap();
        assert_eq!(params.output_strides().unwrap().strides(), &[1, 8]);
        assert_eq!(params.output_strides().unwrap().distance(), 32);
        assert!(params.input_strides().is_none());
    }

    #[test]
    fn test_batch_must_be_positive() {
        assert!(c2c(&[8]).unwrap().with_batch(0).is_err());
        assert_eq!(c2c(&[8]).unwrap().with_batch(6).unwrap().batch(), 6);
    }

    #[test]
    fn test_result_location() {
        let inplace = c2c(&[8]).unwrap();
        assert_eq!(inplace.result_location(), ResultLocation::InPlace);

        let r2c = TransformParams::new(
            FftLayout::Real,
            FftLayout::HermitianInterleaved,
            &[8],
            FftPrecision::Single,
        )
        .unwrap();
        assert_eq!(r2c.result_location(), ResultLocation::OutOfPlace);
        assert_eq!(r2c.transform_size(), 8);
    }

    #[test]
    fn test_layout_predicates() {
        assert!(!FftLayout::Real.is_complex());
        assert!(FftLayout::HermitianPlanar.is_hermitian());
        assert!(FftLayout::HermitianPlanar.is_planar());
        assert!(!FftLayout::ComplexInterleaved.is_planar());
    }
}
