//! # planr
//!
//! **FFT plan caching and host LAPACK fallbacks for device arrays.**
//!
//! Creating an FFT plan is expensive: the library has to factor the
//! transform, pick kernels and compile them for a device. planr keeps
//! recently used plans in a small per-device cache and hands them back
//! whenever an identical transform is requested again.
//!
//! ## Features
//!
//! - **Plan keys**: every parameter that affects a plan (layouts, rank,
//!   lengths, strides, distances, precision, batch) is part of its key
//! - **Bounded caches**: one cache per device, oldest plan evicted first,
//!   every plan destroyed exactly once
//! - **Transforms**: in-place and out-of-place complex, real-to-complex and
//!   complex-to-real, rank 1 to 3, batched over the remaining axes
//! - **Pluggable engines**: any FFT library behind the [`fft::FftEngine`]
//!   trait; [`fft::ReferenceEngine`] runs on the host
//! - **Decompositions**: QR and SVD through [`linalg::LapackFallback`]
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use planr::prelude::*;
//!
//! let registry = Arc::new(PlanRegistry::new(Arc::new(ReferenceEngine::new()), FftConfig::default())?);
//! let client = FftClient::new(registry, Device::new(0))?;
//!
//! let signal = Array::from_slice(&[1.0f64, 0.0, -1.0, 0.0], Dim4::vector(4), client.device())?;
//! let spectrum = client.fft_r2c(&signal, Rank::One, FftNormalization::Backward)?;
//! assert_eq!(spectrum.dims(), Dim4::vector(3));
//!
//! // A second identical request reuses the cached plan.
//! client.fft_r2c(&signal, Rank::One, FftNormalization::Backward)?;
//! assert_eq!(client.plan_cache_stats()?.hits, 1);
//! # Ok::<(), planr::error::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dtype;
pub mod error;
pub mod fft;
pub mod linalg;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::FftConfig;
    pub use crate::dtype::{Complex64, Complex128, DType};
    pub use crate::error::{Error, Result};
    pub use crate::fft::{
        FftClient, FftDirection, FftEngine, FftNormalization, PlanRegistry, Rank, ReferenceEngine,
    };
    pub use crate::linalg::{LapackFallback, NativeLapack};
    pub use crate::runtime::Device;
    pub use crate::tensor::{Array, Dim4};
}
