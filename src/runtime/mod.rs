//! Execution contexts and host staging memory
//!
//! ```text
//! Device (identifies one execution context / plan cache slot)
//! PinnedBuffer (host staging memory, released on drop)
//! ```

mod device;
mod staging;

pub use device::Device;
pub use staging::PinnedBuffer;
