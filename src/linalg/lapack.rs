//! The LAPACK seam
//!
//! Signatures follow the LAPACKE conventions: every routine takes the
//! matrix storage order first, dimensions and leading dimensions are
//! explicit, and failure is reported as LAPACK's `info` value (`-i` for an
//! illegal `i`-th argument, counting the order argument as the first;
//! positive for a numerical failure).

use crate::dtype::RealElement;
use crate::fft::StatusCode;

/// Result of a LAPACK call; the error carries `info`
pub type LapackResult = std::result::Result<(), StatusCode>;

/// Storage order of a matrix buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum MatrixOrder {
    /// Columns are contiguous; element (i, j) lives at `i + j * ld`
    #[default]
    ColMajor,
    /// Rows are contiguous; element (i, j) lives at `i * ld + j`
    RowMajor,
}

impl MatrixOrder {
    /// Offset of element (`row`, `col`) for leading dimension `ld`
    #[inline]
    pub const fn index(self, row: usize, col: usize, ld: usize) -> usize {
        match self {
            Self::ColMajor => row + col * ld,
            Self::RowMajor => row * ld + col,
        }
    }

    /// Smallest legal leading dimension for a `rows x cols` matrix
    #[inline]
    pub fn min_ld(self, rows: usize, cols: usize) -> usize {
        match self {
            Self::ColMajor => rows.max(1),
            Self::RowMajor => cols.max(1),
        }
    }

    /// Number of elements a `rows x cols` matrix with leading dimension `ld` spans
    #[inline]
    pub fn span(self, rows: usize, cols: usize, ld: usize) -> usize {
        if rows == 0 || cols == 0 {
            0
        } else {
            self.index(rows - 1, cols - 1, ld) + 1
        }
    }
}

/// Which singular vectors `gesvd` computes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SvdJob {
    /// All columns of U (or all rows of Vᵀ), LAPACK `'A'`
    All,
    /// None, LAPACK `'N'`; the output buffer is not referenced
    None,
}

/// Host linear algebra routines over a real element type
pub trait Lapack<T: RealElement>: Send + Sync {
    /// Library name used in error reports
    fn name(&self) -> &'static str {
        "lapack"
    }

    /// QR factorization of the `m x n` matrix in `a`
    ///
    /// On return R occupies the upper triangle and the Householder vectors
    /// the part below it; `tau` receives `min(m, n)` reflector scales.
    fn geqrf(
        &self,
        order: MatrixOrder,
        m: usize,
        n: usize,
        a: &mut [T],
        lda: usize,
        tau: &mut [T],
    ) -> LapackResult;

    /// Overwrite `a` with the first `n` columns of Q = H(0) ... H(k-1)
    ///
    /// Requires `m >= n >= k`; the reflectors are the output of `geqrf`.
    #[allow(clippy::too_many_arguments)]
    fn orgqr(
        &self,
        order: MatrixOrder,
        m: usize,
        n: usize,
        k: usize,
        a: &mut [T],
        lda: usize,
        tau: &[T],
    ) -> LapackResult;

    /// Singular value decomposition `A = U * diag(s) * Vᵀ`
    ///
    /// `s` receives `min(m, n)` values in descending order. With
    /// [`SvdJob::All`], `u` receives the full `m x m` U and `vt` the full
    /// `n x n` Vᵀ. The contents of `a` are destroyed.
    #[allow(clippy::too_many_arguments)]
    fn gesvd(
        &self,
        order: MatrixOrder,
        jobu: SvdJob,
        jobvt: SvdJob,
        m: usize,
        n: usize,
        a: &mut [T],
        lda: usize,
        s: &mut [T],
        u: &mut [T],
        ldu: usize,
        vt: &mut [T],
        ldvt: usize,
    ) -> LapackResult;
}
