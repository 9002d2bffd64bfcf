//! Host reference engine
//!
//! A portable implementation of [`FftEngine`] used when no accelerator
//! library is bound, and as the ground truth in tests.
//!
//! # Algorithm: recursive mixed-radix decimation in time
//!
//! ```text
//! N = p * m, p = smallest remaining radix from {2, 3, 5, 7, 11, 13}
//!
//! Y_q = DFT_m( x[q], x[q + p], x[q + 2p], ... )          q = 0..p
//! X[k + s*m] = Σ_q  w_N^(q * (k + s*m)) * Y_q[k]         k = 0..m, s = 0..p
//!
//! w_N = e^(-2πi/N)  (forward), e^(+2πi/N)  (inverse)
//! ```
//!
//! Roots of unity are computed once per axis when a plan is baked.
//! Multi-axis transforms apply the 1-D transform along each axis in turn.
//! All arithmetic runs in double precision; single-precision buffers are
//! widened on load and narrowed on store.
//!
//! Real transforms compute the full complex spectrum and keep the
//! non-redundant half (`n0 / 2 + 1` bins along axis 0). The inverse
//! rebuilds the full spectrum from Hermitian symmetry first:
//!
//! ```text
//! X[k0, k1, k2] = conj( X[n0 - k0, (n1 - k1) % n1, (n2 - k2) % n2] )    for k0 > n0 / 2
//! ```

use super::engine::{EngineResult, FftEngine, StatusCode};
use super::params::{FftLayout, FftPrecision, ResultLocation, StrideGroup, TransformParams};
use super::{FftDirection, SUPPORTED_RADICES, is_supported_length};
use crate::dtype::{Complex64, Complex128};
use crate::runtime::Device;
use bytemuck::Pod;
use smallvec::SmallVec;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};

/// Host FFT engine
#[derive(Debug, Default)]
pub struct ReferenceEngine {
    ready: AtomicBool,
}

impl ReferenceEngine {
    /// Create an engine; it becomes usable after [`FftEngine::setup`]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TransformKind {
    ComplexToComplex,
    RealToHermitian,
    HermitianToReal,
}

/// Buffer geometry of one side of a transform, padded to three axes
#[derive(Clone, Copy, Debug)]
struct Geometry {
    lens: [usize; 3],
    strides: [usize; 3],
    dist: usize,
}

impl Geometry {
    fn new(lens: [usize; 3], group: Option<&StrideGroup>) -> Self {
        match group {
            Some(group) => {
                let mut strides = [0usize; 3];
                strides[..group.strides().len()].copy_from_slice(group.strides());
                Self {
                    lens,
                    strides,
                    dist: group.distance(),
                }
            }
            None => Self {
                lens,
                strides: [1, lens[0], lens[0] * lens[1]],
                dist: lens.iter().product(),
            },
        }
    }

    /// Smallest buffer (in elements) that covers `batch` entries
    fn required(&self, batch: usize) -> usize {
        let last: usize = (0..3).map(|i| (self.lens[i] - 1) * self.strides[i]).sum();
        (batch - 1) * self.dist + last + 1
    }

    /// Multi-index and buffer offset of every point of batch entry `b`, axis 0 fastest
    fn positions(&self, b: usize) -> impl Iterator<Item = ([usize; 3], usize)> {
        let base = b * self.dist;
        let [l0, l1, l2] = self.lens;
        let [s0, s1, s2] = self.strides;
        (0..l2).flat_map(move |k2| {
            (0..l1).flat_map(move |k1| {
                (0..l0).map(move |k0| ([k0, k1, k2], base + k0 * s0 + k1 * s1 + k2 * s2))
            })
        })
    }
}

#[inline]
fn dense_index(lens: &[usize; 3], k: [usize; 3]) -> usize {
    k[0] + lens[0] * (k[1] + lens[1] * k[2])
}

/// Precomputed data for the 1-D transform along one axis
#[derive(Debug)]
struct AxisPlan {
    n: usize,
    factors: SmallVec<[usize; 16]>,
    roots: Vec<Complex128>,
}

impl AxisPlan {
    fn new(n: usize) -> Self {
        let mut factors = SmallVec::new();
        let mut rest = n;
        for &p in &SUPPORTED_RADICES {
            while rest % p == 0 {
                factors.push(p);
                rest /= p;
            }
        }
        let roots = (0..n)
            .map(|k| Complex128::from_polar(1.0, -2.0 * PI * k as f64 / n as f64))
            .collect();
        Self { n, factors, roots }
    }

    fn run(&self, input: &[Complex128], out: &mut [Complex128], inverse: bool) {
        dft(input, 0, 1, self.n, &self.factors, &self.roots, 1, inverse, out);
    }
}

/// Transform `n` points of `input` starting at `offset` with `stride` into `out`
#[allow(clippy::too_many_arguments)]
fn dft(
    input: &[Complex128],
    offset: usize,
    stride: usize,
    n: usize,
    factors: &[usize],
    roots: &[Complex128],
    root_stride: usize,
    inverse: bool,
    out: &mut [Complex128],
) {
    if n == 1 {
        out[0] = input[offset];
        return;
    }

    let p = factors[0];
    let m = n / p;
    for q in 0..p {
        dft(
            input,
            offset + q * stride,
            stride * p,
            m,
            &factors[1..],
            roots,
            root_stride * p,
            inverse,
            &mut out[q * m..(q + 1) * m],
        );
    }

    let mut combined = vec![Complex128::ZERO; n];
    for s in 0..p {
        for k in 0..m {
            let bin = k + s * m;
            let mut acc = Complex128::ZERO;
            for q in 0..p {
                let w = roots[((q * bin) % n) * root_stride];
                let w = if inverse { w.conj() } else { w };
                acc = acc + w * out[q * m + k];
            }
            combined[bin] = acc;
        }
    }
    out.copy_from_slice(&combined);
}

/// Plan produced by [`ReferenceEngine`]
#[derive(Debug)]
pub struct ReferencePlan {
    params: TransformParams,
    kind: TransformKind,
    lens: [usize; 3],
    input: Geometry,
    output: Geometry,
    axes: Vec<AxisPlan>,
    baked_on: Option<Device>,
}

impl ReferencePlan {
    /// Parameters the plan was created from
    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    /// True once [`FftEngine::bake_plan`] has succeeded
    pub fn is_baked(&self) -> bool {
        self.baked_on.is_some()
    }

    fn check_ready(&self, device: &Device, direction: FftDirection) -> EngineResult<()> {
        match self.baked_on {
            None => return Err(StatusCode::INVALID_OPERATION),
            Some(baked) if !baked.is_same(device) => return Err(StatusCode::DEVICE_NOT_AVAILABLE),
            Some(_) => {}
        }
        match (self.kind, direction) {
            (TransformKind::RealToHermitian, FftDirection::Inverse)
            | (TransformKind::HermitianToReal, FftDirection::Forward) => {
                Err(StatusCode::INVALID_OPERATION)
            }
            _ => Ok(()),
        }
    }

    /// Multi-axis transform of a dense column-major buffer of `self.lens`
    fn transform(&self, data: &mut [Complex128], inverse: bool) {
        let mut line = Vec::new();
        let mut out = Vec::new();
        let mut stride = 1;
        for axis in &self.axes {
            let n = axis.n;
            if n > 1 {
                line.resize(n, Complex128::ZERO);
                out.resize(n, Complex128::ZERO);
                let block = n * stride;
                for outer in (0..data.len()).step_by(block) {
                    for inner in 0..stride {
                        let start = outer + inner;
                        for (j, v) in line.iter_mut().enumerate() {
                            *v = data[start + j * stride];
                        }
                        axis.run(&line, &mut out, inverse);
                        for (j, v) in out.iter().enumerate() {
                            data[start + j * stride] = *v;
                        }
                    }
                }
            }
            stride *= n;
        }
    }

    fn execute(&self, direction: FftDirection, input: &[u8], output: &mut [u8]) -> EngineResult<()> {
        let batch = self.params.batch();
        let precision = self.params.precision();
        let inverse = direction == FftDirection::Inverse;
        let points: usize = self.lens.iter().product();
        let mut work = vec![Complex128::ZERO; points];

        match self.kind {
            TransformKind::ComplexToComplex => {
                let src = load_complex(input, precision, self.input.required(batch))?;
                let mut dst = load_complex(output, precision, self.output.required(batch))?;
                for b in 0..batch {
                    for (i, (_, off)) in self.input.positions(b).enumerate() {
                        work[i] = src[off];
                    }
                    self.transform(&mut work, inverse);
                    for (i, (_, off)) in self.output.positions(b).enumerate() {
                        dst[off] = work[i];
                    }
                }
                store_complex(&dst, output, precision)
            }
            TransformKind::RealToHermitian => {
                let src = load_real(input, precision, self.input.required(batch))?;
                let mut dst = load_complex(output, precision, self.output.required(batch))?;
                for b in 0..batch {
                    for (i, (_, off)) in self.input.positions(b).enumerate() {
                        work[i] = Complex128::new(src[off], 0.0);
                    }
                    self.transform(&mut work, false);
                    for (k, off) in self.output.positions(b) {
                        dst[off] = work[dense_index(&self.lens, k)];
                    }
                }
                store_complex(&dst, output, precision)
            }
            TransformKind::HermitianToReal => {
                let src = load_complex(input, precision, self.input.required(batch))?;
                let mut dst = load_real(output, precision, self.output.required(batch))?;
                let half_lens = self.input.lens;
                let mut half = vec![Complex128::ZERO; half_lens.iter().product()];
                let [n0, n1, n2] = self.lens;
                for b in 0..batch {
                    for (i, (_, off)) in self.input.positions(b).enumerate() {
                        half[i] = src[off];
                    }
                    for k2 in 0..n2 {
                        for k1 in 0..n1 {
                            for k0 in 0..n0 {
                                let value = if k0 < half_lens[0] {
                                    half[dense_index(&half_lens, [k0, k1, k2])]
                                } else {
                                    let mirror = [n0 - k0, (n1 - k1) % n1, (n2 - k2) % n2];
                                    half[dense_index(&half_lens, mirror)].conj()
                                };
                                work[dense_index(&self.lens, [k0, k1, k2])] = value;
                            }
                        }
                    }
                    self.transform(&mut work, true);
                    for (i, (_, off)) in self.output.positions(b).enumerate() {
                        dst[off] = work[i].re;
                    }
                }
                store_real(&dst, output, precision)
            }
        }
    }
}

// ============================================================================
// Buffer conversion
// ============================================================================

fn read<T: Pod>(bytes: &[u8], required: usize) -> EngineResult<Vec<T>> {
    let size = std::mem::size_of::<T>();
    if bytes.len() % size != 0 || bytes.len() / size < required {
        return Err(StatusCode::INVALID_BUFFER_SIZE);
    }
    Ok(bytes.chunks_exact(size).map(bytemuck::pod_read_unaligned).collect())
}

fn write<T: Pod>(values: impl IntoIterator<Item = T>, bytes: &mut [u8]) {
    let size = std::mem::size_of::<T>();
    for (chunk, value) in bytes.chunks_exact_mut(size).zip(values) {
        chunk.copy_from_slice(bytemuck::bytes_of(&value));
    }
}

fn load_complex(bytes: &[u8], precision: FftPrecision, required: usize) -> EngineResult<Vec<Complex128>> {
    Ok(match precision {
        FftPrecision::Single => read::<Complex64>(bytes, required)?
            .into_iter()
            .map(Complex128::from)
            .collect(),
        FftPrecision::Double => read::<Complex128>(bytes, required)?,
    })
}

fn load_real(bytes: &[u8], precision: FftPrecision, required: usize) -> EngineResult<Vec<f64>> {
    Ok(match precision {
        FftPrecision::Single => read::<f32>(bytes, required)?
            .into_iter()
            .map(f64::from)
            .collect(),
        FftPrecision::Double => read::<f64>(bytes, required)?,
    })
}

fn store_complex(values: &[Complex128], bytes: &mut [u8], precision: FftPrecision) -> EngineResult<()> {
    match precision {
        FftPrecision::Single => write(values.iter().map(|&c| Complex64::from(c)), bytes),
        FftPrecision::Double => write(values.iter().copied(), bytes),
    }
    Ok(())
}

fn store_real(values: &[f64], bytes: &mut [u8], precision: FftPrecision) -> EngineResult<()> {
    match precision {
        FftPrecision::Single => write(values.iter().map(|&v| v as f32), bytes),
        FftPrecision::Double => write(values.iter().copied(), bytes),
    }
    Ok(())
}

// ============================================================================
// Engine
// ============================================================================

impl FftEngine for ReferenceEngine {
    type Plan = ReferencePlan;

    fn name(&self) -> &'static str {
        "reference-fft"
    }

    fn setup(&self) -> EngineResult<()> {
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    fn teardown(&self) -> EngineResult<()> {
        self.ready.store(false, Ordering::Release);
        Ok(())
    }

    fn create_plan(&self, _device: &Device, params: &TransformParams) -> EngineResult<ReferencePlan> {
        if !self.ready.load(Ordering::Acquire) {
            return Err(StatusCode::INVALID_OPERATION);
        }

        let kind = match (params.input_layout(), params.output_layout()) {
            (FftLayout::ComplexInterleaved, FftLayout::ComplexInterleaved) => {
                TransformKind::ComplexToComplex
            }
            (FftLayout::Real, FftLayout::HermitianInterleaved) => TransformKind::RealToHermitian,
            (FftLayout::HermitianInterleaved, FftLayout::Real) => TransformKind::HermitianToReal,
            _ => return Err(StatusCode::NOT_IMPLEMENTED),
        };
        if params.lengths().iter().any(|&n| !is_supported_length(n)) {
            return Err(StatusCode::INVALID_VALUE);
        }

        let mut lens = [1usize; 3];
        lens[..params.lengths().len()].copy_from_slice(params.lengths());
        let mut half = lens;
        half[0] = lens[0] / 2 + 1;

        let (input_lens, output_lens) = match kind {
            TransformKind::ComplexToComplex => (lens, lens),
            TransformKind::RealToHermitian => (lens, half),
            TransformKind::HermitianToReal => (half, lens),
        };

        // In-place plans read and write through the same geometry.
        let input = Geometry::new(input_lens, params.input_strides());
        let output = match params.result_location() {
            ResultLocation::InPlace => {
                Geometry::new(output_lens, params.input_strides().or(params.output_strides()))
            }
            ResultLocation::OutOfPlace => Geometry::new(output_lens, params.output_strides()),
        };

        Ok(ReferencePlan {
            params: params.clone(),
            kind,
            lens,
            input,
            output,
            axes: Vec::new(),
            baked_on: None,
        })
    }

    fn bake_plan(&self, plan: &mut ReferencePlan, device: &Device) -> EngineResult<()> {
        if plan.baked_on.is_none() {
            plan.axes = plan.params.lengths().iter().map(|&n| AxisPlan::new(n)).collect();
        }
        plan.baked_on = Some(*device);
        Ok(())
    }

    fn destroy_plan(&self, plan: ReferencePlan) -> EngineResult<()> {
        drop(plan);
        Ok(())
    }

    fn enqueue(
        &self,
        plan: &ReferencePlan,
        device: &Device,
        direction: FftDirection,
        input: &[u8],
        output: &mut [u8],
    ) -> EngineResult<()> {
        plan.check_ready(device, direction)?;
        if plan.params.result_location() != ResultLocation::OutOfPlace {
            return Err(StatusCode::INVALID_OPERATION);
        }
        plan.execute(direction, input, output)
    }

    fn enqueue_inplace(
        &self,
        plan: &ReferencePlan,
        device: &Device,
        direction: FftDirection,
        data: &mut [u8],
    ) -> EngineResult<()> {
        plan.check_ready(device, direction)?;
        if plan.params.result_location() != ResultLocation::InPlace {
            return Err(StatusCode::INVALID_OPERATION);
        }
        let input = data.to_vec();
        plan.execute(direction, &input, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_dft(x: &[Complex128], inverse: bool) -> Vec<Complex128> {
        let n = x.len();
        let sign = if inverse { 1.0 } else { -1.0 };
        (0..n)
            .map(|k| {
                x.iter().enumerate().fold(Complex128::ZERO, |acc, (j, &v)| {
                    let theta = sign * 2.0 * PI * (j * k) as f64 / n as f64;
                    acc + v * Complex128::from_polar(1.0, theta)
                })
            })
            .collect()
    }

    fn signal(n: usize) -> Vec<Complex128> {
        (0..n)
            .map(|i| Complex128::new((i as f64 * 0.7).sin() + 0.1 * i as f64, (i as f64 * 1.3).cos()))
            .collect()
    }

    fn assert_close(a: &[Complex128], b: &[Complex128], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!(
                (*x - *y).magnitude() < tol,
                "index {}: {} vs {}",
                i,
                x,
                y
            );
        }
    }

    fn engine() -> ReferenceEngine {
        let engine = ReferenceEngine::new();
        engine.setup().unwrap();
        engine
    }

    fn c2c(lengths: &[usize], precision: FftPrecision) -> TransformParams {
        TransformParams::new(
            FftLayout::ComplexInterleaved,
            FftLayout::ComplexInterleaved,
            lengths,
            precision,
        )
        .unwrap()
    }

    #[test]
    fn test_mixed_radix_matches_naive_dft() {
        for n in [1, 2, 3, 6, 8, 12, 13, 30, 49, 143] {
            let axis = AxisPlan::new(n);
            let x = signal(n);
            for inverse in [false, true] {
                let mut out = vec![Complex128::ZERO; n];
                axis.run(&x, &mut out, inverse);
                assert_close(&out, &naive_dft(&x, inverse), 1e-9 * n as f64);
            }
        }
    }

    #[test]
    fn test_inplace_2d_matches_separable_naive() {
        let engine = engine();
        let device = Device::new(0);
        let (n0, n1) = (4, 3);
        let mut plan = engine.create_plan(&device, &c2c(&[n0, n1], FftPrecision::Double)).unwrap();
        engine.bake_plan(&mut plan, &device).unwrap();

        let x = signal(n0 * n1);
        let mut data = x.clone();
        engine
            .enqueue_inplace(&plan, &device, FftDirection::Forward, bytemuck::cast_slice_mut(&mut data))
            .unwrap();

        // rows along axis 0, then columns along axis 1
        let mut expected = x;
        for c in 0..n1 {
            let col = naive_dft(&expected[c * n0..(c + 1) * n0], false);
            expected[c * n0..(c + 1) * n0].copy_from_slice(&col);
        }
        for r in 0..n0 {
            let line: Vec<_> = (0..n1).map(|c| expected[c * n0 + r]).collect();
            for (c, v) in naive_dft(&line, false).into_iter().enumerate() {
                expected[c * n0 + r] = v;
            }
        }
        assert_close(&data, &expected, 1e-9);
    }

    #[test]
    fn test_batched_single_precision() {
        let engine = engine();
        let device = Device::new(0);
        let params = c2c(&[6], FftPrecision::Single)
            .with_input_strides(&[1], 6)
            .unwrap()
            .with_output_strides(&[1], 6)
            .unwrap()
            .with_batch(2)
            .unwrap();
        let mut plan = engine.create_plan(&device, &params).unwrap();
        engine.bake_plan(&mut plan, &device).unwrap();

        let x = signal(12);
        let mut data: Vec<Complex64> = x.iter().map(|&c| Complex64::from(c)).collect();
        engine
            .enqueue_inplace(&plan, &device, FftDirection::Forward, bytemuck::cast_slice_mut(&mut data))
            .unwrap();

        let got: Vec<Complex128> = data.iter().map(|&c| Complex128::from(c)).collect();
        let mut expected = naive_dft(&x[..6], false);
        expected.extend(naive_dft(&x[6..], false));
        assert_close(&got, &expected, 1e-4);
    }

    #[test]
    fn test_real_to_hermitian_keeps_half_spectrum() {
        let engine = engine();
        let device = Device::new(0);
        let params = TransformParams::new(
            FftLayout::Real,
            FftLayout::HermitianInterleaved,
            &[8],
            FftPrecision::Double,
        )
        .unwrap();
        let mut plan = engine.create_plan(&device, &params).unwrap();
        engine.bake_plan(&mut plan, &device).unwrap();

        let x: Vec<f64> = (0..8).map(|i| (i as f64).powi(2) - 3.0).collect();
        let mut half = vec![Complex128::ZERO; 5];
        engine
            .enqueue(
                &plan,
                &device,
                FftDirection::Forward,
                bytemuck::cast_slice(&x),
                bytemuck::cast_slice_mut(&mut half),
            )
            .unwrap();

        let full: Vec<_> = x.iter().map(|&v| Complex128::new(v, 0.0)).collect();
        assert_close(&half, &naive_dft(&full, false)[..5], 1e-9);
    }

    #[test]
    fn test_hermitian_to_real_inverts_2d() {
        let engine = engine();
        let device = Device::new(0);
        let (n0, n1) = (6, 4);
        let x: Vec<f64> = (0..n0 * n1).map(|i| ((i * 7) % 5) as f64 - 1.5).collect();

        let r2c = TransformParams::new(FftLayout::Real, FftLayout::HermitianInterleaved, &[n0, n1], FftPrecision::Double)
            .unwrap();
        let c2r = TransformParams::new(FftLayout::HermitianInterleaved, FftLayout::Real, &[n0, n1], FftPrecision::Double)
            .unwrap();
        let mut forward = engine.create_plan(&device, &r2c).unwrap();
        let mut inverse = engine.create_plan(&device, &c2r).unwrap();
        engine.bake_plan(&mut forward, &device).unwrap();
        engine.bake_plan(&mut inverse, &device).unwrap();

        let mut half = vec![Complex128::ZERO; (n0 / 2 + 1) * n1];
        engine
            .enqueue(&forward, &device, FftDirection::Forward, bytemuck::cast_slice(&x), bytemuck::cast_slice_mut(&mut half))
            .unwrap();
        let mut back = vec![0.0f64; n0 * n1];
        engine
            .enqueue(&inverse, &device, FftDirection::Inverse, bytemuck::cast_slice(&half), bytemuck::cast_slice_mut(&mut back))
            .unwrap();

        // Unnormalized: inverse(forward(x)) = N * x
        let n = (n0 * n1) as f64;
        for (got, want) in back.iter().zip(&x) {
            assert!((got / n - want).abs() < 1e-9, "{} vs {}", got / n, want);
        }
    }

    #[test]
    fn test_unbaked_plan_is_rejected() {
        let engine = engine();
        let device = Device::new(0);
        let plan = engine.create_plan(&device, &c2c(&[4], FftPrecision::Double)).unwrap();
        assert!(!plan.is_baked());
        let mut data = vec![Complex128::ZERO; 4];
        let status = engine
            .enqueue_inplace(&plan, &device, FftDirection::Forward, bytemuck::cast_slice_mut(&mut data))
            .unwrap_err();
        assert_eq!(status, StatusCode::INVALID_OPERATION);
    }

    #[test]
    fn test_create_plan_rejections() {
        let device = Device::new(0);
        let cold = ReferenceEngine::new();
        assert_eq!(
            cold.create_plan(&device, &c2c(&[4], FftPrecision::Double)).unwrap_err(),
            StatusCode::INVALID_OPERATION
        );

        let engine = engine();
        assert_eq!(
            engine.create_plan(&device, &c2c(&[17], FftPrecision::Double)).unwrap_err(),
            StatusCode::INVALID_VALUE
        );
        let planar = TransformParams::new(
            FftLayout::ComplexPlanar,
            FftLayout::ComplexPlanar,
            &[8],
            FftPrecision::Double,
        )
        .unwrap();
        assert_eq!(
            engine.create_plan(&device, &planar).unwrap_err(),
            StatusCode::NOT_IMPLEMENTED
        );
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let engine = engine();
        let device = Device::new(0);
        let mut plan = engine.create_plan(&device, &c2c(&[8], FftPrecision::Double)).unwrap();
        engine.bake_plan(&mut plan, &device).unwrap();
        let mut data = vec![Complex128::ZERO; 4];
        assert_eq!(
            engine
                .enqueue_inplace(&plan, &device, FftDirection::Forward, bytemuck::cast_slice_mut(&mut data))
                .unwrap_err(),
            StatusCode::INVALID_BUFFER_SIZE
        );
    }

    #[test]
    fn test_direction_must_match_real_plan() {
        let engine = engine();
        let device = Device::new(0);
        let params = TransformParams::new(
            FftLayout::Real,
            FftLayout::HermitianInterleaved,
            &[4],
            FftPrecision::Double,
        )
        .unwrap();
        let mut plan = engine.create_plan(&device, &params).unwrap();
        engine.bake_plan(&mut plan, &device).unwrap();
        let x = vec![0.0f64; 4];
        let mut out = vec![Complex128::ZERO; 3];
        assert_eq!(
            engine
                .enqueue(&plan, &device, FftDirection::Inverse, bytemuck::cast_slice(&x), bytemuck::cast_slice_mut(&mut out))
                .unwrap_err(),
            StatusCode::INVALID_OPERATION
        );
    }
}
