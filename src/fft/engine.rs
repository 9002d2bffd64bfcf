//! The FFT engine seam
//!
//! An [`FftEngine`] is the external transform library: it turns
//! [`TransformParams`] into opaque plans, bakes them against a device,
//! executes them and destroys them. planr never looks inside a plan; it
//! only decides when plans are created, reused and destroyed.
//!
//! Every engine entry point reports failure through a raw [`StatusCode`].
//! [`check`] wraps a status into [`Error::Engine`] so callers see one error
//! type.

use super::FftDirection;
use super::params::TransformParams;
use crate::error::{Error, Result};
use crate::runtime::Device;
use std::fmt;

/// Raw status code returned by an external library
///
/// The named constants follow OpenCL numbering so statuses from a real
/// binding and from [`ReferenceEngine`](super::ReferenceEngine) read the
/// same in logs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// Device is not available
    pub const DEVICE_NOT_AVAILABLE: Self = Self(-2);
    /// Host or device allocation failed
    pub const OUT_OF_RESOURCES: Self = Self(-5);
    /// An argument had an invalid value
    pub const INVALID_VALUE: Self = Self(-30);
    /// Operation not valid in the current state (e.g. plan not baked)
    pub const INVALID_OPERATION: Self = Self(-59);
    /// A buffer is too small for the requested transform
    pub const INVALID_BUFFER_SIZE: Self = Self(-61);
    /// The engine does not implement the requested configuration
    pub const NOT_IMPLEMENTED: Self = Self(4098);

    /// Raw value
    #[inline]
    pub const fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of an engine call
pub type EngineResult<T> = std::result::Result<T, StatusCode>;

/// Wrap an external status into planr's error type
#[inline]
pub fn check<T>(library: &'static str, operation: &'static str, result: EngineResult<T>) -> Result<T> {
    result.map_err(|status| Error::engine(library, operation, status.code()))
}

/// External FFT library
///
/// Implementations must be shareable across threads: one engine instance
/// serves every device of a [`PlanRegistry`](super::PlanRegistry).
///
/// Plans are consumed by [`destroy_plan`](FftEngine::destroy_plan), so a
/// plan can only ever be destroyed once.
pub trait FftEngine: Send + Sync + 'static {
    /// Opaque prepared plan
    type Plan: Send + 'static;

    /// Library name used in error reports
    fn name(&self) -> &'static str {
        "fft"
    }

    /// Process-wide initialization, called once when a registry is built
    fn setup(&self) -> EngineResult<()>;

    /// Process-wide teardown, called at most once per registry
    fn teardown(&self) -> EngineResult<()>;

    /// Create and configure a plan for `params` on `device`
    ///
    /// Configuration covers result location, layouts, batch, distances,
    /// strides and precision. The backward scale is always 1: normalization
    /// is applied by the caller.
    fn create_plan(&self, device: &Device, params: &TransformParams) -> EngineResult<Self::Plan>;

    /// Compile a configured plan against the device's queue
    ///
    /// May block for a noticeable time.
    fn bake_plan(&self, plan: &mut Self::Plan, device: &Device) -> EngineResult<()>;

    /// Release a plan
    fn destroy_plan(&self, plan: Self::Plan) -> EngineResult<()>;

    /// Execute an out-of-place plan
    fn enqueue(
        &self,
        plan: &Self::Plan,
        device: &Device,
        direction: FftDirection,
        input: &[u8],
        output: &mut [u8],
    ) -> EngineResult<()>;

    /// Execute an in-place plan
    fn enqueue_inplace(
        &self,
        plan: &Self::Plan,
        device: &Device,
        direction: FftDirection,
        data: &mut [u8],
    ) -> EngineResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_maps_status() {
        let ok: EngineResult<u32> = Ok(7);
        assert_eq!(check("fft", "create_plan", ok).unwrap(), 7);

        let err: EngineResult<u32> = Err(StatusCode::INVALID_OPERATION);
        match check("fft", "enqueue", err) {
            Err(Error::Engine {
                library,
                operation,
                code,
            }) => {
                assert_eq!(library, "fft");
                assert_eq!(operation, "enqueue");
                assert_eq!(code, -59);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
