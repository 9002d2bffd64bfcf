//! Per-device plan caches with one-time engine setup and teardown

use super::cache::PlanCache;
use super::engine::{FftEngine, check};
use crate::config::FftConfig;
use crate::error::{Error, Result};
use crate::runtime::Device;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Owns the engine lifecycle and one lazily created [`PlanCache`] per device
///
/// A registry is built explicitly and shared through `Arc` by every
/// [`FftClient`](super::FftClient) that uses it. Construction runs
/// [`FftEngine::setup`] once; [`shutdown`](Self::shutdown) (or dropping the
/// last reference) destroys every cached plan and runs
/// [`FftEngine::teardown`] once.
///
/// Each device slot has its own mutex, so transforms on different devices
/// never contend, while transforms on the same device are serialized from
/// plan lookup through enqueue.
pub struct PlanRegistry<E: FftEngine> {
    engine: Arc<E>,
    config: FftConfig,
    slots: Box<[Mutex<Option<PlanCache<E>>>]>,
    shut_down: AtomicBool,
}

impl<E: FftEngine> PlanRegistry<E> {
    /// Initialize the engine and reserve `config.max_devices()` empty slots
    pub fn new(engine: Arc<E>, config: FftConfig) -> Result<Self> {
        check(engine.name(), "setup", engine.setup())?;
        tracing::debug!(
            engine = engine.name(),
            max_devices = config.max_devices(),
            plan_cache_capacity = config.plan_cache_capacity(),
            "FFT plan registry initialized"
        );

        let slots = (0..config.max_devices())
            .map(|_| Mutex::new(None))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            engine,
            config,
            slots,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Shared engine
    #[inline]
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Configuration the registry was built with
    #[inline]
    pub fn config(&self) -> &FftConfig {
        &self.config
    }

    /// True once [`shutdown`](Self::shutdown) has started
    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Run `f` on the device's cache while holding the device's slot lock
    ///
    /// The cache is created on first use with the configured capacity.
    pub fn with_cache<R, F>(&self, device: &Device, f: F) -> Result<R>
    where
        F: FnOnce(&mut PlanCache<E>) -> Result<R>,
    {
        if self.is_shut_down() {
            return Err(Error::ShutDown);
        }
        let slot = self.slots.get(device.index()).ok_or(Error::InvalidDevice {
            index: device.index(),
            max: self.slots.len(),
        })?;

        let mut guard = slot.lock();
        // Shutdown may have emptied this slot while we waited for the lock.
        if self.is_shut_down() {
            return Err(Error::ShutDown);
        }
        if guard.is_none() {
            let capacity = self.config.plan_cache_capacity();
            tracing::debug!(device = %device, capacity, "creating FFT plan cache");
            *guard = Some(PlanCache::new(Arc::clone(&self.engine), capacity)?);
        }
        match guard.as_mut() {
            Some(cache) => f(cache),
            None => Err(Error::Internal(format!("plan cache for {} missing", device))),
        }
    }

    /// Destroy every cached plan and tear the engine down
    ///
    /// Only the first call does anything. Failures are logged and otherwise
    /// ignored: every slot is cleared and teardown runs even if some plan
    /// destroys fail.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        for (index, slot) in self.slots.iter().enumerate() {
            let cache = slot.lock().take();
            if let Some(mut cache) = cache {
                let plans = cache.len();
                if let Err(err) = cache.clear() {
                    tracing::warn!(device = index, error = %err, "failed to release cached FFT plans");
                } else {
                    tracing::debug!(device = index, plans, "released cached FFT plans");
                }
            }
        }

        if let Err(status) = self.engine.teardown() {
            tracing::warn!(engine = self.engine.name(), status = %status, "FFT engine teardown failed");
        } else {
            tracing::debug!(engine = self.engine.name(), "FFT engine torn down");
        }
    }
}

impl<E: FftEngine> Drop for PlanRegistry<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<E: FftEngine> fmt::Debug for PlanRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanRegistry")
            .field("engine", &self.engine.name())
            .field("config", &self.config)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
