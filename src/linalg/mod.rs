//! Host fallback for dense matrix decompositions
//!
//! When a device has no native QR or SVD, [`LapackFallback`] stages the
//! matrix on the host, calls a [`Lapack`] implementation and copies the
//! factors back. [`NativeLapack`] provides the routines without an
//! external library.
//!
//! Matrices are [`Array`](crate::tensor::Array)s whose first two axes are
//! rows and columns (column-major); axes 2 and 3 must have length 1.

mod fallback;
mod lapack;
mod native;

pub use fallback::{LapackFallback, QrFactors, SvdFactors};
pub use lapack::{Lapack, LapackResult, MatrixOrder, SvdJob};
pub use native::NativeLapack;
