//! Error types for planr

use thiserror::Error;

/// Result type alias using planr's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in planr operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transform length cannot be handled by the FFT engine
    ///
    /// Raised before any plan is requested, so no engine call is wasted
    /// on a length the engine would reject.
    #[error("Unsupported FFT length {length} on axis {axis}: only factors of 2, 3, 5, 7, 11, 13 are supported")]
    UnsupportedLength {
        /// The offending axis length
        length: usize,
        /// Axis index (0-based)
        axis: usize,
    },

    /// An external library returned a non-success status code
    #[error("{library} call '{operation}' failed with status {code}")]
    Engine {
        /// External library that produced the status
        library: &'static str,
        /// Entry point that failed
        operation: &'static str,
        /// Raw status code
        code: i32,
    },

    /// The plan registry has been shut down
    #[error("Plan registry has been shut down")]
    ShutDown,

    /// Device index outside the configured slot range
    #[error("Invalid device {index}: registry supports {max} devices")]
    InvalidDevice {
        /// Requested device index
        index: usize,
        /// Number of device slots
        max: usize,
    },

    /// Array lives on a different device than the client operating on it
    #[error("Device mismatch: array is on device {array}, client is bound to device {client}")]
    DeviceMismatch {
        /// Device index of the array
        array: usize,
        /// Device index of the client
        client: usize,
    },

    /// Shape mismatch between an array and what an operation expects
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an external library status error
    pub fn engine(library: &'static str, operation: &'static str, code: i32) -> Self {
        Self::Engine {
            library,
            operation,
            code,
        }
    }

    /// Status code carried by an external library error, if any
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }
}
