//! Configuration for plan registries

/// Default number of plans retained per device
pub const DEFAULT_PLAN_CACHE_CAPACITY: usize = 5;

/// Default number of device slots a registry manages
pub const DEFAULT_MAX_DEVICES: usize = 32;

/// Configuration for a [`PlanRegistry`](crate::fft::PlanRegistry)
///
/// # Example
///
/// ```
/// use planr::config::FftConfig;
///
/// let config = FftConfig::default()
///     .with_plan_cache_capacity(8)
///     .with_max_devices(4);
/// assert_eq!(config.plan_cache_capacity(), 8);
/// assert_eq!(config.max_devices(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FftConfig {
    plan_cache_capacity: usize,
    max_devices: usize,
}

impl FftConfig {
    /// Capacity given to each device's plan cache when it is first created
    ///
    /// Values below 1 are raised to 1.
    pub fn with_plan_cache_capacity(mut self, capacity: usize) -> Self {
        self.plan_cache_capacity = capacity.max(1);
        self
    }

    /// Number of device slots
    ///
    /// Values below 1 are raised to 1.
    pub fn with_max_devices(mut self, max_devices: usize) -> Self {
        self.max_devices = max_devices.max(1);
        self
    }

    /// Initial plan cache capacity
    #[inline]
    pub fn plan_cache_capacity(&self) -> usize {
        self.plan_cache_capacity
    }

    /// Number of device slots
    #[inline]
    pub fn max_devices(&self) -> usize {
        self.max_devices
    }
}

impl Default for FftConfig {
    fn default() -> Self {
        Self {
            plan_cache_capacity: DEFAULT_PLAN_CACHE_CAPACITY,
            max_devices: DEFAULT_MAX_DEVICES,
        }
    }
}
