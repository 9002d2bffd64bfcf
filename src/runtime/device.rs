//! Device identification

use std::fmt;

/// Identifies one execution context (a device slot)
///
/// Devices are lightweight handles: copying one never touches the
/// underlying hardware. Each device owns its own FFT plan cache inside a
/// [`PlanRegistry`](crate::fft::PlanRegistry).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Device {
    index: usize,
}

impl Device {
    /// Create a handle for the device at `index`
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self { index }
    }

    /// Slot index of this device
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Check if two handles refer to the same device
    #[inline]
    pub fn is_same(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device({})", self.index)
    }
}
