//! FFT plan management and transform invocation
//!
//! An external FFT library ([`FftEngine`]) turns a transform description
//! into a *plan*: an expensive, device-bound object that can be executed
//! many times. This module decides when plans are created, reused and
//! destroyed.
//!
//! ```text
//! FftClient::fft_inplace(array, rank, direction, norm)
//!   1. every active axis length factors into {2, 3, 5, 7, 11, 13}?
//!   2. TransformParams (layouts, lengths, strides, batch, precision)
//!   3. PlanKey::encode(params)
//!   4. PlanRegistry slot for the device -> PlanCache::get_or_create
//!        miss: create_plan + bake_plan, insert (evicting the oldest plan)
//!   5. enqueue plan on the array buffers
//!   6. apply FftNormalization
//! ```
//!
//! [`ReferenceEngine`] is a portable mixed-radix engine that implements
//! the same contract on the host.

mod cache;
mod client;
mod engine;
mod key;
mod params;
mod reference;
mod registry;

pub use cache::{CacheStats, PlanCache};
pub use client::FftClient;
pub use engine::{EngineResult, FftEngine, StatusCode, check};
pub use key::PlanKey;
pub use params::{
    AxisVec, FftLayout, FftPrecision, Rank, ResultLocation, StrideGroup, TransformParams,
};
pub use reference::{ReferenceEngine, ReferencePlan};
pub use registry::PlanRegistry;

use crate::error::{Error, Result};
use crate::tensor::Dim4;

// ============================================================================
// Direction and normalization
// ============================================================================

/// Direction of FFT computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FftDirection {
    /// Time domain to frequency domain, twiddle `e^(-2πi k/N)`
    Forward,
    /// Frequency domain to time domain, twiddle `e^(+2πi k/N)`
    Inverse,
}

/// Normalization applied after the engine runs
///
/// Engine plans are always unscaled; the client multiplies the output by
/// [`factor`](Self::factor).
///
/// | Mode     | Forward | Inverse | Roundtrip           |
/// |----------|---------|---------|---------------------|
/// | None     | 1       | 1       | ifft(fft(x)) = N*x  |
/// | Backward | 1       | 1/N     | ifft(fft(x)) = x    |
/// | Ortho    | 1/√N    | 1/√N    | ifft(fft(x)) = x    |
/// | Forward  | 1/N     | 1       | ifft(fft(x)) = x    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FftNormalization {
    /// No scaling in either direction
    None,
    /// Scale the inverse by 1/N
    #[default]
    Backward,
    /// Scale both directions by 1/√N
    Ortho,
    /// Scale the forward by 1/N
    Forward,
}

impl FftNormalization {
    /// Scaling factor for a transform of `n` points
    #[inline]
    pub fn factor(self, direction: FftDirection, n: usize) -> f64 {
        let n_f = n as f64;
        match (self, direction) {
            (Self::None, _) => 1.0,
            (Self::Backward, FftDirection::Forward) => 1.0,
            (Self::Backward, FftDirection::Inverse) => 1.0 / n_f,
            (Self::Ortho, _) => 1.0 / n_f.sqrt(),
            (Self::Forward, FftDirection::Forward) => 1.0 / n_f,
            (Self::Forward, FftDirection::Inverse) => 1.0,
        }
    }
}

// ============================================================================
// Supported lengths
// ============================================================================

/// Prime factors an FFT engine can decompose a length into
pub const SUPPORTED_RADICES: [usize; 6] = [2, 3, 5, 7, 11, 13];

/// True if `n` factors entirely into [`SUPPORTED_RADICES`]
///
/// Zero is never supported; one is (the empty factorization).
pub fn is_supported_length(n: usize) -> bool {
    if n == 0 {
        return false;
    }
    let mut rest = n;
    for &p in &SUPPORTED_RADICES {
        while rest % p == 0 {
            rest /= p;
        }
    }
    rest == 1
}

/// Check the first `rank` axes of `dims`
///
/// Fails with [`Error::UnsupportedLength`] naming the first offending axis.
pub fn verify_supported(dims: &Dim4, rank: Rank) -> Result<()> {
    for axis in 0..rank.get() {
        let length = dims[axis];
        if !is_supported_length(length) {
            return Err(Error::UnsupportedLength { length, axis });
        }
    }
    Ok(())
}
