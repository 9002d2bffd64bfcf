//! Transform entry points bound to one device

use super::cache::CacheStats;
use super::engine::{EngineResult, FftEngine, check};
use super::key::PlanKey;
use super::params::{FftLayout, FftPrecision, Rank, TransformParams};
use super::registry::PlanRegistry;
use super::{FftDirection, FftNormalization, verify_supported};
use crate::dtype::{ComplexElement, RealElement};
use crate::error::{Error, Result};
use crate::runtime::Device;
use crate::tensor::{Array, Dim4};
use std::sync::Arc;

/// Runs FFTs on one device, reusing plans through a shared [`PlanRegistry`]
///
/// Arrays always carry four axes. A rank-`r` transform runs over the first
/// `r` axes; the product of the remaining axes is the batch count, so a
/// `[8, 4, 1, 1]` array transformed at rank 1 is a batch of four length-8
/// transforms.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use planr::config::FftConfig;
/// use planr::dtype::Complex64;
/// use planr::fft::{FftClient, FftDirection, FftNormalization, PlanRegistry, Rank, ReferenceEngine};
/// use planr::runtime::Device;
/// use planr::tensor::{Array, Dim4};
///
/// let registry = Arc::new(PlanRegistry::new(Arc::new(ReferenceEngine::new()), FftConfig::default())?);
/// let client = FftClient::new(registry, Device::new(0))?;
///
/// let data: Vec<Complex64> = (0..8).map(|i| Complex64::new(i as f32, 0.0)).collect();
/// let mut signal = Array::from_slice(&data, Dim4::vector(8), client.device())?;
///
/// client.fft_inplace(&mut signal, Rank::One, FftDirection::Forward, FftNormalization::Backward)?;
/// client.fft_inplace(&mut signal, Rank::One, FftDirection::Inverse, FftNormalization::Backward)?;
///
/// assert!((signal.as_slice()[3].re - 3.0).abs() < 1e-4);
/// # Ok::<(), planr::error::Error>(())
/// ```
pub struct FftClient<E: FftEngine> {
    registry: Arc<PlanRegistry<E>>,
    device: Device,
}

impl<E: FftEngine> Clone for FftClient<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            device: self.device,
        }
    }
}

impl<E: FftEngine> FftClient<E> {
    /// Bind a client to `device`
    pub fn new(registry: Arc<PlanRegistry<E>>, device: Device) -> Result<Self> {
        let max = registry.config().max_devices();
        if device.index() >= max {
            return Err(Error::InvalidDevice {
                index: device.index(),
                max,
            });
        }
        Ok(Self { registry, device })
    }

    /// Device this client runs on
    #[inline]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Registry shared with other clients
    #[inline]
    pub fn registry(&self) -> &Arc<PlanRegistry<E>> {
        &self.registry
    }

    // ========================================================================
    // Plan cache control
    // ========================================================================

    /// Set how many plans this device retains
    ///
    /// Shrinking never evicts immediately; each later plan creation evicts
    /// one old plan until the cache fits.
    pub fn set_plan_cache_capacity(&self, capacity: usize) -> Result<()> {
        self.registry
            .with_cache(&self.device, |cache| cache.set_capacity(capacity))
    }

    /// Current plan cache capacity of this device
    pub fn plan_cache_capacity(&self) -> Result<usize> {
        self.registry
            .with_cache(&self.device, |cache| Ok(cache.capacity()))
    }

    /// Plan cache counters of this device
    pub fn plan_cache_stats(&self) -> Result<CacheStats> {
        self.registry.with_cache(&self.device, |cache| Ok(cache.stats()))
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Complex-to-complex transform, overwriting `data`
    pub fn fft_inplace<T: ComplexElement>(
        &self,
        data: &mut Array<T>,
        rank: Rank,
        direction: FftDirection,
        norm: FftNormalization,
    ) -> Result<()> {
        self.check_device(data.device())?;
        let dims = data.dims();
        verify_supported(&dims, rank)?;

        let strides = data.strides();
        let params = transform_params(
            FftLayout::ComplexInterleaved,
            FftLayout::ComplexInterleaved,
            &dims,
            &strides,
            &strides,
            rank,
            T::PRECISION,
        )?;

        self.execute(&params, |engine, plan, device| {
            engine.enqueue_inplace(plan, device, direction, data.as_bytes_mut())
        })?;

        data.scale_inplace(norm.factor(direction, params.transform_size()));
        Ok(())
    }

    /// Complex-to-complex transform into a new array
    pub fn fft<T: ComplexElement>(
        &self,
        input: &Array<T>,
        rank: Rank,
        direction: FftDirection,
        norm: FftNormalization,
    ) -> Result<Array<T>> {
        let mut output = input.clone();
        self.fft_inplace(&mut output, rank, direction, norm)?;
        Ok(output)
    }

    /// Forward real-to-complex transform
    ///
    /// Only the non-redundant half of the spectrum is returned: the output
    /// has `dims[0] / 2 + 1` entries along axis 0 and the input's extent on
    /// every other axis.
    pub fn fft_r2c<T: RealElement>(
        &self,
        input: &Array<T>,
        rank: Rank,
        norm: FftNormalization,
    ) -> Result<Array<T::Complex>> {
        self.check_device(input.device())?;
        let dims = input.dims();
        verify_supported(&dims, rank)?;

        let mut output = Array::<T::Complex>::empty(hermitian_dims(&dims), &self.device);
        let params = transform_params(
            FftLayout::Real,
            FftLayout::HermitianInterleaved,
            &dims,
            &input.strides(),
            &output.strides(),
            rank,
            <T::Complex as ComplexElement>::PRECISION,
        )?;

        self.execute(&params, |engine, plan, device| {
            engine.enqueue(
                plan,
                device,
                FftDirection::Forward,
                input.as_bytes(),
                output.as_bytes_mut(),
            )
        })?;

        output.scale_inplace(norm.factor(FftDirection::Forward, params.transform_size()));
        Ok(output)
    }

    /// Inverse complex-to-real transform
    ///
    /// `odims` is the shape of the real result. `input` must hold the half
    /// spectrum for it: `odims[0] / 2 + 1` entries along axis 0 and the same
    /// extent as `odims` on every other axis.
    pub fn fft_c2r<T: ComplexElement>(
        &self,
        input: &Array<T>,
        odims: Dim4,
        rank: Rank,
        norm: FftNormalization,
    ) -> Result<Array<T::Real>> {
        self.check_device(input.device())?;
        verify_supported(&odims, rank)?;

        let expected = hermitian_dims(&odims);
        if input.dims() != expected {
            return Err(Error::shape_mismatch(
                expected.as_slice(),
                input.dims().as_slice(),
            ));
        }

        let mut output = Array::<T::Real>::empty(odims, &self.device);
        let params = transform_params(
            FftLayout::HermitianInterleaved,
            FftLayout::Real,
            &odims,
            &input.strides(),
            &output.strides(),
            rank,
            T::PRECISION,
        )?;

        self.execute(&params, |engine, plan, device| {
            engine.enqueue(
                plan,
                device,
                FftDirection::Inverse,
                input.as_bytes(),
                output.as_bytes_mut(),
            )
        })?;

        output.scale_inplace(norm.factor(FftDirection::Inverse, params.transform_size()));
        Ok(output)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn check_device(&self, device: &Device) -> Result<()> {
        if !device.is_same(&self.device) {
            return Err(Error::DeviceMismatch {
                array: device.index(),
                client: self.device.index(),
            });
        }
        Ok(())
    }

    /// Resolve the plan for `params` and run `enqueue` with it, all under the
    /// device's slot lock
    fn execute<F>(&self, params: &TransformParams, enqueue: F) -> Result<()>
    where
        F: FnOnce(&E, &E::Plan, &Device) -> EngineResult<()>,
    {
        let engine = self.registry.engine();
        let device = &self.device;
        let key = PlanKey::encode(params);

        self.registry.with_cache(device, |cache| {
            let plan = cache.get_or_create(key, || create_baked_plan(engine.as_ref(), device, params))?;
            check(engine.name(), "enqueue", enqueue(engine.as_ref(), plan, device))
        })
    }
}

/// Create and bake a plan, releasing it if baking fails
fn create_baked_plan<E: FftEngine>(
    engine: &E,
    device: &Device,
    params: &TransformParams,
) -> Result<E::Plan> {
    let mut plan = check(engine.name(), "create_plan", engine.create_plan(device, params))?;
    if let Err(status) = engine.bake_plan(&mut plan, device) {
        if let Err(destroy_status) = engine.destroy_plan(plan) {
            tracing::warn!(
                status = %destroy_status,
                "failed to release FFT plan after bake failure"
            );
        }
        return Err(Error::engine(engine.name(), "bake_plan", status.code()));
    }
    tracing::debug!(
        device = %device,
        rank = %params.rank(),
        lengths = ?params.lengths(),
        batch = params.batch(),
        "baked FFT plan"
    );
    Ok(plan)
}

/// Shape of the half spectrum produced by a real transform of `dims`
fn hermitian_dims(dims: &Dim4) -> Dim4 {
    let mut out = *dims;
    out[0] = dims[0] / 2 + 1;
    out
}

/// Build parameters for a transform whose logical shape is `lengths`
///
/// Only the first `rank` axes are transform axes; the element stride of
/// axis `rank` is the distance between consecutive batch entries.
fn transform_params(
    input_layout: FftLayout,
    output_layout: FftLayout,
    lengths: &Dim4,
    input_strides: &Dim4,
    output_strides: &Dim4,
    rank: Rank,
    precision: FftPrecision,
) -> Result<TransformParams> {
    let r = rank.get();
    TransformParams::new(input_layout, output_layout, &lengths.as_slice()[..r], precision)?
        .with_input_strides(&input_strides.as_slice()[..r], input_strides[r])?
        .with_output_strides(&output_strides.as_slice()[..r], output_strides[r])?
        .with_batch(lengths.trailing_product(r))
}
