//! Host LAPACK fallback for device arrays
//!
//! Each decomposition stages the device array into a [`PinnedBuffer`],
//! runs the LAPACK routine on the host and writes the results back into
//! device arrays. Staging buffers are released when they go out of scope,
//! including on early error returns.

use super::lapack::{Lapack, MatrixOrder, SvdJob};
use super::native::NativeLapack;
use crate::dtype::{Element, RealElement};
use crate::error::{Error, Result};
use crate::fft::check;
use crate::runtime::{Device, PinnedBuffer};
use crate::tensor::{Array, Dim4};

/// Result of [`LapackFallback::qr`]: `A = Q * R`
#[derive(Clone, Debug)]
pub struct QrFactors<T: Element> {
    /// Orthogonal factor, `m x m`
    pub q: Array<T>,
    /// Upper triangular factor, `m x n`
    pub r: Array<T>,
    /// Householder reflector scales, `min(m, n)`
    pub tau: Array<T>,
}

/// Result of [`LapackFallback::svd`]: `A = U * diag(S) * Vᵀ`
#[derive(Clone, Debug)]
pub struct SvdFactors<T: Element> {
    /// Singular values in descending order, `min(m, n)`
    pub s: Array<T>,
    /// Left singular vectors, `m x m`
    pub u: Array<T>,
    /// Right singular vectors (transposed), `n x n`
    pub vt: Array<T>,
}

/// Runs QR and SVD on the host through a [`Lapack`] implementation
#[derive(Debug, Clone, Default)]
pub struct LapackFallback<L = NativeLapack> {
    lapack: L,
}

impl<L> LapackFallback<L> {
    /// Wrap a LAPACK implementation
    pub fn new(lapack: L) -> Self {
        Self { lapack }
    }

    /// Underlying LAPACK implementation
    pub fn lapack(&self) -> &L {
        &self.lapack
    }

    /// Full QR decomposition
    ///
    /// The factorization runs in a staging buffer padded with zero columns
    /// to `m x max(m, n)`, which is large enough to hold R's source and
    /// the generated `m x m` Q.
    pub fn qr<T: RealElement>(&self, input: &Array<T>) -> Result<QrFactors<T>>
    where
        L: Lapack<T>,
    {
        let (m, n) = matrix_dims(input)?;
        let k = m.min(n);
        let ld = m.max(1);
        let name = self.lapack.name();
        tracing::debug!(m, n, lapack = name, "QR via host LAPACK fallback");

        let mut staged = PinnedBuffer::<T>::new(m * m.max(n))?;
        input.copy_to_host(&mut staged[..])?;
        let mut tau = PinnedBuffer::<T>::new(k)?;

        check(name, "geqrf", self.lapack.geqrf(MatrixOrder::ColMajor, m, n, &mut staged[..], ld, &mut tau[..]))?;

        let device = input.device();
        let mut r = Array::<T>::empty(Dim4::matrix(m, n), device);
        {
            let dst = r.as_mut_slice();
            for j in 0..n {
                for i in 0..m.min(j + 1) {
                    dst[i + j * m] = staged[i + j * m];
                }
            }
        }

        check(name, "orgqr", self.lapack.orgqr(MatrixOrder::ColMajor, m, m, k, &mut staged[..], ld, &tau[..]))?;

        let mut q = Array::<T>::empty(Dim4::matrix(m, m), device);
        q.write_host_data(&staged[..])?;
        let tau = Array::from_slice(&tau[..], Dim4::vector(k), device)?;

        Ok(QrFactors { q, r, tau })
    }

    /// Packed QR factorization in place
    ///
    /// `input` is overwritten with R (upper triangle) and the Householder
    /// vectors (below the diagonal); the reflector scales are returned.
    pub fn qr_inplace<T: RealElement>(&self, input: &mut Array<T>) -> Result<Array<T>>
    where
        L: Lapack<T>,
    {
        let (m, n) = matrix_dims(input)?;
        let k = m.min(n);
        let name = self.lapack.name();
        tracing::debug!(m, n, lapack = name, "in-place QR via host LAPACK fallback");

        let mut staged = PinnedBuffer::<T>::new(input.elements())?;
        input.copy_to_host(&mut staged[..])?;
        let mut tau = PinnedBuffer::<T>::new(k)?;

        let ld = input.strides()[1].max(1);
        check(name, "geqrf", self.lapack.geqrf(MatrixOrder::ColMajor, m, n, &mut staged[..], ld, &mut tau[..]))?;

        input.write_host_data(&staged[..])?;
        Array::from_slice(&tau[..], Dim4::vector(k), input.device())
    }

    /// SVD into caller-supplied outputs
    ///
    /// `s` must be a `min(m, n)` vector, `u` an `m x m` matrix and `vt` an
    /// `n x n` matrix, all on the input's device.
    pub fn svd_into<T: RealElement>(
        &self,
        s: &mut Array<T>,
        u: &mut Array<T>,
        vt: &mut Array<T>,
        input: &Array<T>,
    ) -> Result<()>
    where
        L: Lapack<T>,
    {
        let (m, n) = matrix_dims(input)?;
        check_outputs(s, u, vt, m, n, input.device())?;

        let mut staged = PinnedBuffer::<T>::new(input.elements())?;
        input.copy_to_host(&mut staged[..])?;
        self.gesvd_staged(m, n, &mut staged[..], s, u, vt)
    }

    /// SVD into caller-supplied outputs, using `input` as workspace
    ///
    /// Same as [`svd_into`](Self::svd_into), except that `input` receives
    /// whatever the LAPACK routine leaves in its workspace.
    pub fn svd_inplace<T: RealElement>(
        &self,
        s: &mut Array<T>,
        u: &mut Array<T>,
        vt: &mut Array<T>,
        input: &mut Array<T>,
    ) -> Result<()>
    where
        L: Lapack<T>,
    {
        let (m, n) = matrix_dims(input)?;
        check_outputs(s, u, vt, m, n, input.device())?;

        let mut staged = PinnedBuffer::<T>::new(input.elements())?;
        input.copy_to_host(&mut staged[..])?;
        self.gesvd_staged(m, n, &mut staged[..], s, u, vt)?;
        input.write_host_data(&staged[..])
    }

    /// SVD with freshly allocated outputs
    pub fn svd<T: RealElement>(&self, input: &Array<T>) -> Result<SvdFactors<T>>
    where
        L: Lapack<T>,
    {
        let (m, n) = matrix_dims(input)?;
        let device = input.device();
        let mut s = Array::empty(Dim4::vector(m.min(n)), device);
        let mut u = Array::empty(Dim4::matrix(m, m), device);
        let mut vt = Array::empty(Dim4::matrix(n, n), device);
        self.svd_into(&mut s, &mut u, &mut vt, input)?;
        Ok(SvdFactors { s, u, vt })
    }

    fn gesvd_staged<T: RealElement>(
        &self,
        m: usize,
        n: usize,
        a: &mut [T],
        s: &mut Array<T>,
        u: &mut Array<T>,
        vt: &mut Array<T>,
    ) -> Result<()>
    where
        L: Lapack<T>,
    {
        let name = self.lapack.name();
        tracing::debug!(m, n, lapack = name, "SVD via host LAPACK fallback");

        let mut s_host = PinnedBuffer::<T>::new(s.elements())?;
        let mut u_host = PinnedBuffer::<T>::new(u.elements())?;
        let mut vt_host = PinnedBuffer::<T>::new(vt.elements())?;

        let result = self.lapack.gesvd(
            MatrixOrder::ColMajor,
            SvdJob::All,
            SvdJob::All,
            m,
            n,
            a,
            m.max(1),
            &mut s_host[..],
            &mut u_host[..],
            m.max(1),
            &mut vt_host[..],
            n.max(1),
        );
        check(name, "gesvd", result)?;

        s.write_host_data(&s_host[..])?;
        u.write_host_data(&u_host[..])?;
        vt.write_host_data(&vt_host[..])
    }
}

/// Rows and columns of a 2-D array
fn matrix_dims<T: Element>(array: &Array<T>) -> Result<(usize, usize)> {
    let dims = array.dims();
    if dims[2] != 1 || dims[3] != 1 {
        return Err(Error::invalid_argument(
            "input",
            format!("expected a matrix, got dims {}", dims),
        ));
    }
    Ok((dims[0], dims[1]))
}

fn check_outputs<T: Element>(
    s: &Array<T>,
    u: &Array<T>,
    vt: &Array<T>,
    m: usize,
    n: usize,
    device: &Device,
) -> Result<()> {
    let expected = [
        (s, Dim4::vector(m.min(n))),
        (u, Dim4::matrix(m, m)),
        (vt, Dim4::matrix(n, n)),
    ];
    for (array, dims) in expected {
        if !array.device().is_same(device) {
            return Err(Error::DeviceMismatch {
                array: array.device().index(),
                client: device.index(),
            });
        }
        if array.dims() != dims {
            return Err(Error::shape_mismatch(dims.as_slice(), array.dims().as_slice()));
        }
    }
    Ok(())
}
