//! Element traits mapping Rust types to DType

use super::{Complex64, Complex128, DType};
use crate::fft::FftPrecision;
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// Trait for types that can be elements of an array
///
/// # Bounds
/// - `Pod + Zeroable` - buffers are viewed as raw bytes when handed to an
///   external engine
/// - `Send + Sync + 'static` - arrays move across threads with their client
pub trait Element:
    Copy + Clone + Send + Sync + Pod + Zeroable + PartialEq + fmt::Debug + 'static
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Zero value
    fn zero() -> Self;

    /// Multiply by a real factor (used for FFT normalization)
    fn scale(self, factor: f64) -> Self;
}

/// Real floating point element (`f32`, `f64`)
pub trait RealElement:
    Element
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + PartialOrd
{
    /// Complex type with this type as its components
    type Complex: ComplexElement<Real = Self>;

    /// One value
    fn one() -> Self;

    /// Convert to f64
    fn to_f64(self) -> f64;

    /// Convert from f64
    fn from_f64(v: f64) -> Self;
}

/// Complex interleaved element (`Complex64`, `Complex128`)
pub trait ComplexElement:
    Element + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
{
    /// Component type
    type Real: RealElement<Complex = Self>;

    /// FFT precision tag for transforms over this type
    const PRECISION: FftPrecision;

    /// Build from real and imaginary parts
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;

    /// Real part
    fn real(self) -> Self::Real;

    /// Imaginary part
    fn imag(self) -> Self::Real;
}

macro_rules! impl_real {
    ($float:ty, $dtype:expr, $complex:ty) => {
        impl Element for $float {
            const DTYPE: DType = $dtype;

            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn scale(self, factor: f64) -> Self {
                self * factor as $float
            }
        }

        impl RealElement for $float {
            type Complex = $complex;

            #[inline]
            fn one() -> Self {
                1.0
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $float
            }
        }
    };
}

macro_rules! impl_complex_element {
    ($complex:ty, $float:ty, $dtype:expr, $precision:expr) => {
        impl Element for $complex {
            const DTYPE: DType = $dtype;

            #[inline]
            fn zero() -> Self {
                <$complex>::ZERO
            }

            #[inline]
            fn scale(self, factor: f64) -> Self {
                <$complex>::scale(self, factor as $float)
            }
        }

        impl ComplexElement for $complex {
            type Real = $float;

            const PRECISION: FftPrecision = $precision;

            #[inline]
            fn from_parts(re: $float, im: $float) -> Self {
                <$complex>::new(re, im)
            }

            #[inline]
            fn real(self) -> $float {
                self.re
            }

            #[inline]
            fn imag(self) -> $float {
                self.im
            }
        }
    };
}

impl_real!(f32, DType::F32, Complex64);
impl_real!(f64, DType::F64, Complex128);
impl_complex_element!(Complex64, f32, DType::Complex64, FftPrecision::Single);
impl_complex_element!(Complex128, f64, DType::Complex128, FftPrecision::Double);
