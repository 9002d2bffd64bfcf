//! Common test utilities
#![allow(dead_code)]

use planr::config::FftConfig;
use planr::fft::{
    EngineResult, FftClient, FftDirection, FftEngine, PlanRegistry, ReferenceEngine,
    ReferencePlan, StatusCode, TransformParams,
};
use planr::runtime::Device;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Route `tracing` output through the test harness (`RUST_LOG=planr=debug`)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Reference engine that counts every lifecycle call
#[derive(Default)]
pub struct CountingEngine {
    inner: ReferenceEngine,
    pub setups: AtomicUsize,
    pub teardowns: AtomicUsize,
    pub creates: AtomicUsize,
    pub bakes: AtomicUsize,
    pub destroys: AtomicUsize,
    pub enqueues: AtomicUsize,
    pub fail_teardown: AtomicBool,
    pub fail_bake: AtomicBool,
}

impl CountingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    pub fn teardowns(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    /// Plans created and not yet destroyed
    pub fn live_plans(&self) -> usize {
        self.creates() - self.destroys()
    }
}

impl FftEngine for CountingEngine {
    type Plan = ReferencePlan;

    fn name(&self) -> &'static str {
        "counting-fft"
    }

    fn setup(&self) -> EngineResult<()> {
        self.setups.fetch_add(1, Ordering::SeqCst);
        self.inner.setup()
    }

    fn teardown(&self) -> EngineResult<()> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        self.inner.teardown()?;
        if self.fail_teardown.load(Ordering::SeqCst) {
            return Err(StatusCode::INVALID_OPERATION);
        }
        Ok(())
    }

    fn create_plan(&self, device: &Device, params: &TransformParams) -> EngineResult<ReferencePlan> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_plan(device, params)
    }

    fn bake_plan(&self, plan: &mut ReferencePlan, device: &Device) -> EngineResult<()> {
        self.bakes.fetch_add(1, Ordering::SeqCst);
        if self.fail_bake.load(Ordering::SeqCst) {
            return Err(StatusCode::OUT_OF_RESOURCES);
        }
        self.inner.bake_plan(plan, device)
    }

    fn destroy_plan(&self, plan: ReferencePlan) -> EngineResult<()> {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        self.inner.destroy_plan(plan)
    }

    fn enqueue(
        &self,
        plan: &ReferencePlan,
        device: &Device,
        direction: FftDirection,
        input: &[u8],
        output: &mut [u8],
    ) -> EngineResult<()> {
        self.enqueues.fetch_add(1, Ordering::SeqCst);
        self.inner.enqueue(plan, device, direction, input, output)
    }

    fn enqueue_inplace(
        &self,
        plan: &ReferencePlan,
        device: &Device,
        direction: FftDirection,
        data: &mut [u8],
    ) -> EngineResult<()> {
        self.enqueues.fetch_add(1, Ordering::SeqCst);
        self.inner.enqueue_inplace(plan, device, direction, data)
    }
}

/// Counting engine, a registry around it and a client on device 0
pub fn counting_client(config: FftConfig) -> (Arc<CountingEngine>, FftClient<CountingEngine>) {
    init_tracing();
    let engine = Arc::new(CountingEngine::new());
    let registry = Arc::new(PlanRegistry::new(engine.clone(), config).unwrap());
    let client = FftClient::new(registry, Device::new(0)).unwrap();
    (engine, client)
}

/// Reference engine client on device 0 with the default configuration
pub fn reference_client() -> FftClient<ReferenceEngine> {
    init_tracing();
    let registry =
        Arc::new(PlanRegistry::new(Arc::new(ReferenceEngine::new()), FftConfig::default()).unwrap());
    FftClient::new(registry, Device::new(0)).unwrap()
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f32 slices are close within tolerance
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}
