//! Portable implementations of the LAPACK routines planr uses
//!
//! All routines copy their operands into a column-major `f64` workspace,
//! compute there and convert back, so `f32` inputs are factorized in
//! double precision.

use super::lapack::{Lapack, LapackResult, MatrixOrder, SvdJob};
use crate::dtype::RealElement;
use crate::fft::StatusCode;

/// Sweep limit for one-sided Jacobi; exceeding it reports `info = 1`
const MAX_SWEEPS: usize = 60;

/// Off-diagonal tolerance, in units of `rows * f64::EPSILON`
const TOL_FACTOR: f64 = 8.0;

/// LAPACK routines implemented in Rust
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLapack;

impl NativeLapack {
    /// Create a handle
    pub fn new() -> Self {
        Self
    }
}

// ============================================================================
// Workspace
// ============================================================================

/// Dense column-major `f64` matrix, leading dimension = `rows`
#[derive(Clone, Debug)]
struct Work {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Work {
    fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    fn identity(n: usize) -> Self {
        let mut out = Self::zeros(n, n);
        for i in 0..n {
            *out.at_mut(i, i) = 1.0;
        }
        out
    }

    fn load<T: RealElement>(order: MatrixOrder, rows: usize, cols: usize, src: &[T], ld: usize) -> Self {
        let mut out = Self::zeros(rows, cols);
        for j in 0..cols {
            for i in 0..rows {
                *out.at_mut(i, j) = src[order.index(i, j, ld)].to_f64();
            }
        }
        out
    }

    fn store<T: RealElement>(&self, order: MatrixOrder, dst: &mut [T], ld: usize) {
        for j in 0..self.cols {
            for i in 0..self.rows {
                dst[order.index(i, j, ld)] = T::from_f64(self.at(i, j));
            }
        }
    }

    #[inline]
    fn at(&self, i: usize, j: usize) -> f64 {
        self.data[i + j * self.rows]
    }

    #[inline]
    fn at_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        &mut self.data[i + j * self.rows]
    }

    #[inline]
    fn column(&self, j: usize) -> &[f64] {
        &self.data[j * self.rows..(j + 1) * self.rows]
    }

    #[inline]
    fn column_mut(&mut self, j: usize) -> &mut [f64] {
        &mut self.data[j * self.rows..(j + 1) * self.rows]
    }

    fn transposed(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for j in 0..self.cols {
            for i in 0..self.rows {
                *out.at_mut(j, i) = self.at(i, j);
            }
        }
        out
    }

    /// `[col_p, col_q] = [col_p, col_q] @ [[c, s], [-s, c]]`
    fn rotate_columns(&mut self, p: usize, q: usize, rot: &JacobiRotation) {
        for i in 0..self.rows {
            let vp = self.at(i, p);
            let vq = self.at(i, q);
            *self.at_mut(i, p) = rot.c * vp - rot.s * vq;
            *self.at_mut(i, q) = rot.s * vp + rot.c * vq;
        }
    }

    /// `(col_p · col_p, col_q · col_q, col_p · col_q)`
    fn gram(&self, p: usize, q: usize) -> (f64, f64, f64) {
        let (mut a_pp, mut a_qq, mut a_pq) = (0.0, 0.0, 0.0);
        for (&bp, &bq) in self.column(p).iter().zip(self.column(q)) {
            a_pp += bp * bp;
            a_qq += bq * bq;
            a_pq += bp * bq;
        }
        (a_pp, a_qq, a_pq)
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Leading dimension and buffer length checks; `ld_arg`/`buf_arg` are the
/// 1-based argument positions reported as `-info`
fn check_matrix(
    order: MatrixOrder,
    rows: usize,
    cols: usize,
    len: usize,
    ld: usize,
    buf_arg: i32,
    ld_arg: i32,
) -> LapackResult {
    if ld < order.min_ld(rows, cols) {
        return Err(StatusCode(-ld_arg));
    }
    if len < order.span(rows, cols, ld) {
        return Err(StatusCode(-buf_arg));
    }
    Ok(())
}

// ============================================================================
// Householder QR
// ============================================================================

/// Factor `a` in place: R on and above the diagonal, reflector tails below
///
/// Reflector `j` is `H = I - tau[j] * v * vᵀ` with `v[j] = 1` and
/// `v[j+1..]` stored in column `j` below the diagonal.
fn householder_qr(a: &mut Work, tau: &mut [f64]) {
    let (m, n) = (a.rows, a.cols);
    for j in 0..m.min(n) {
        let alpha = a.at(j, j);
        let xnorm = norm(&a.column(j)[j + 1..]);
        if xnorm == 0.0 {
            tau[j] = 0.0;
            continue;
        }

        // beta = -sign(alpha) * ||[alpha, x]||
        let beta = -alpha.signum() * alpha.hypot(xnorm);
        tau[j] = (beta - alpha) / beta;
        let scale = 1.0 / (alpha - beta);
        for v in &mut a.column_mut(j)[j + 1..] {
            *v *= scale;
        }
        *a.at_mut(j, j) = beta;

        for c in (j + 1)..n {
            let mut w = a.at(j, c);
            for i in (j + 1)..m {
                w += a.at(i, j) * a.at(i, c);
            }
            w *= tau[j];
            *a.at_mut(j, c) -= w;
            for i in (j + 1)..m {
                let v = a.at(i, j);
                *a.at_mut(i, c) -= v * w;
            }
        }
    }
}

/// Replace the reflectors in `a` with the first `a.cols` columns of Q
fn householder_q(a: &mut Work, k: usize, tau: &[f64]) {
    let (m, n) = (a.rows, a.cols);

    for j in k..n {
        a.column_mut(j).fill(0.0);
        *a.at_mut(j, j) = 1.0;
    }

    for i in (0..k).rev() {
        if i + 1 < n {
            *a.at_mut(i, i) = 1.0;
            for c in (i + 1)..n {
                let mut w = 0.0;
                for l in i..m {
                    w += a.at(l, i) * a.at(l, c);
                }
                w *= tau[i];
                for l in i..m {
                    let v = a.at(l, i);
                    *a.at_mut(l, c) -= v * w;
                }
            }
        }
        for l in (i + 1)..m {
            *a.at_mut(l, i) *= -tau[i];
        }
        *a.at_mut(i, i) = 1.0 - tau[i];
        for l in 0..i {
            *a.at_mut(l, i) = 0.0;
        }
    }
}

// ============================================================================
// One-sided Jacobi SVD
// ============================================================================

/// Givens rotation `[[c, -s], [s, c]]`
#[derive(Debug, Clone, Copy)]
struct JacobiRotation {
    c: f64,
    s: f64,
}

impl JacobiRotation {
    /// Rotation that zeroes `a_pq` of the 2x2 symmetric block
    ///
    /// ```text
    /// τ = (a_qq - a_pp) / (2 * a_pq)
    /// t = sign(τ) / (|τ| + sqrt(1 + τ²))
    /// c = 1 / sqrt(1 + t²)
    /// s = t * c
    /// ```
    fn compute(a_pp: f64, a_qq: f64, a_pq: f64) -> Self {
        let tau_den = 2.0 * a_pq;
        if tau_den.abs() < 1e-300 {
            return Self { c: 1.0, s: 0.0 };
        }

        let tau = (a_qq - a_pp) / tau_den;
        let t = if tau >= 0.0 {
            1.0 / (tau + (1.0 + tau * tau).sqrt())
        } else {
            -1.0 / (-tau + (1.0 + tau * tau).sqrt())
        };
        let c = 1.0 / (1.0 + t * t).sqrt();
        Self { c, s: t * c }
    }
}

/// Full SVD of a `rows >= cols` matrix
///
/// Returns singular values (descending, `cols` of them), the full
/// `rows x rows` U and the `cols x cols` V whose columns are the right
/// singular vectors.
fn jacobi_svd(mut b: Work) -> Result<(Vec<f64>, Work, Work), StatusCode> {
    let (rows, cols) = (b.rows, b.cols);
    let mut v = Work::identity(cols);
    let tol = TOL_FACTOR * rows.max(1) as f64 * f64::EPSILON;

    let mut converged = false;
    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..cols {
            for q in (p + 1)..cols {
                let (a_pp, a_qq, a_pq) = b.gram(p, q);
                if a_pq.abs() <= tol * (a_pp * a_qq).sqrt() {
                    continue;
                }
                let rot = JacobiRotation::compute(a_pp, a_qq, a_pq);
                b.rotate_columns(p, q, &rot);
                v.rotate_columns(p, q, &rot);
                rotated = true;
            }
        }
        if !rotated {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(StatusCode(1));
    }

    // S[j] = ||B[:, j]||, sorted descending
    let norms: Vec<f64> = (0..cols).map(|j| norm(b.column(j))).collect();
    let mut order: Vec<usize> = (0..cols).collect();
    order.sort_by(|&i, &j| norms[j].partial_cmp(&norms[i]).unwrap_or(std::cmp::Ordering::Equal));

    let largest = order.first().map(|&j| norms[j]).unwrap_or(0.0);
    let negligible = largest * tol;

    let mut u = Work::zeros(rows, rows);
    let mut filled = vec![false; rows];
    let mut sigma = Vec::with_capacity(cols);
    let mut v_sorted = Work::zeros(cols, cols);
    for (new, &old) in order.iter().enumerate() {
        let s = norms[old];
        sigma.push(s);
        v_sorted.column_mut(new).copy_from_slice(v.column(old));
        if s > negligible && s > 0.0 {
            for (dst, &src) in u.column_mut(new).iter_mut().zip(b.column(old)) {
                *dst = src / s;
            }
            filled[new] = true;
        }
    }

    complete_basis(&mut u, &mut filled)?;
    Ok((sigma, u, v_sorted))
}

/// Fill the unset columns of `u` so that all columns are orthonormal
///
/// Candidates are the unit vectors in order; each is orthogonalized twice
/// against the columns set so far and kept if enough of it survives.
fn complete_basis(u: &mut Work, filled: &mut [bool]) -> Result<(), StatusCode> {
    let n = u.rows;
    let threshold = 0.5 / (n.max(1) as f64).sqrt();
    let mut candidate = 0;

    for j in 0..n {
        if filled[j] {
            continue;
        }
        loop {
            if candidate == n {
                return Err(StatusCode(1));
            }
            let mut r = vec![0.0; n];
            r[candidate] = 1.0;
            candidate += 1;

            for _ in 0..2 {
                for (col, _) in filled.iter().enumerate().filter(|&(_, &set)| set) {
                    let proj = dot(&r, u.column(col));
                    for (ri, &ui) in r.iter_mut().zip(u.column(col)) {
                        *ri -= proj * ui;
                    }
                }
            }

            let len = norm(&r);
            if len > threshold {
                for (dst, ri) in u.column_mut(j).iter_mut().zip(&r) {
                    *dst = ri / len;
                }
                filled[j] = true;
                break;
            }
        }
    }
    Ok(())
}

// ============================================================================
// Lapack
// ============================================================================

impl<T: RealElement> Lapack<T> for NativeLapack {
    fn name(&self) -> &'static str {
        "native-lapack"
    }

    fn geqrf(
        &self,
        order: MatrixOrder,
        m: usize,
        n: usize,
        a: &mut [T],
        lda: usize,
        tau: &mut [T],
    ) -> LapackResult {
        check_matrix(order, m, n, a.len(), lda, 4, 5)?;
        let k = m.min(n);
        if tau.len() < k {
            return Err(StatusCode(-6));
        }

        let mut work = Work::load(order, m, n, a, lda);
        let mut t = vec![0.0; k];
        householder_qr(&mut work, &mut t);

        work.store(order, a, lda);
        for (dst, &v) in tau.iter_mut().zip(&t) {
            *dst = T::from_f64(v);
        }
        Ok(())
    }

    fn orgqr(
        &self,
        order: MatrixOrder,
        m: usize,
        n: usize,
        k: usize,
        a: &mut [T],
        lda: usize,
        tau: &[T],
    ) -> LapackResult {
        if n > m {
            return Err(StatusCode(-3));
        }
        if k > n {
            return Err(StatusCode(-4));
        }
        check_matrix(order, m, n, a.len(), lda, 5, 6)?;
        if tau.len() < k {
            return Err(StatusCode(-7));
        }

        let mut work = Work::load(order, m, n, a, lda);
        let t: Vec<f64> = tau[..k].iter().map(|v| v.to_f64()).collect();
        householder_q(&mut work, k, &t);
        work.store(order, a, lda);
        Ok(())
    }

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
    ) -> LapackResult {
        check_matrix(order, m, n, a.len(), lda, 6, 7)?;
        let k = m.min(n);
        if s.len() < k {
            return Err(StatusCode(-8));
        }
        if jobu == SvdJob::All {
            check_matrix(order, m, m, u.len(), ldu, 9, 10)?;
        }
        if jobvt == SvdJob::All {
            check_matrix(order, n, n, vt.len(), ldvt, 11, 12)?;
        }

        let work = Work::load(order, m, n, a, lda);
        // A = U S Vᵀ  <=>  Aᵀ = V S Uᵀ; Jacobi needs at least as many rows as columns
        let transpose = m < n;
        let (sigma, left, right) = if transpose {
            let (sigma, u_t, v_t) = jacobi_svd(work.transposed())?;
            (sigma, v_t, u_t)
        } else {
            jacobi_svd(work)?
        };

        for (dst, &v) in s.iter_mut().zip(&sigma[..k]) {
            *dst = T::from_f64(v);
        }
        if jobu == SvdJob::All {
            left.store(order, u, ldu);
        }
        if jobvt == SvdJob::All {
            right.transposed().store(order, vt, ldvt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matmul(a: &Work, b: &Work) -> Work {
        let mut out = Work::zeros(a.rows, b.cols);
        for j in 0..b.cols {
            for l in 0..a.cols {
                let blj = b.at(l, j);
                for i in 0..a.rows {
                    *out.at_mut(i, j) += a.at(i, l) * blj;
                }
            }
        }
        out
    }

    fn assert_orthonormal(q: &Work) {
        let qtq = matmul(&q.transposed(), q);
        for i in 0..q.cols {
            for j in 0..q.cols {
                let want = if i == j { 1.0 } else { 0.0 };
                assert!((qtq.at(i, j) - want).abs() < 1e-10, "QᵀQ[{},{}] = {}", i, j, qtq.at(i, j));
            }
        }
    }

    #[test]
    fn test_jacobi_rotation_zero_offdiag() {
        let rot = JacobiRotation::compute(1.0, 2.0, 0.0);
        assert!((rot.c - 1.0).abs() < 1e-10);
        assert!(rot.s.abs() < 1e-10);
    }

    #[test]
    fn test_geqrf_orgqr_reconstruct() {
        let lapack = NativeLapack::new();
        let (m, n) = (4usize, 3usize);
        let a: Vec<f64> = vec![2.0, 1.0, 0.0, 4.0, -1.0, 3.0, 2.0, 0.5, 0.0, 1.0, 5.0, -2.0];
        let mut packed = a.clone();
        let mut tau = vec![0.0; 3];
        lapack.geqrf(MatrixOrder::ColMajor, m, n, &mut packed, m, &mut tau).unwrap();

        let mut r = Work::zeros(m, n);
        for j in 0..n {
            for i in 0..=j.min(m - 1) {
                *r.at_mut(i, j) = packed[i + j * m];
            }
        }

        let mut q = vec![0.0; m * m];
        q[..m * n].copy_from_slice(&packed);
        lapack.orgqr(MatrixOrder::ColMajor, m, m, n, &mut q, m, &tau).unwrap();
        let q = Work::load(MatrixOrder::ColMajor, m, m, &q, m);

        assert_orthonormal(&q);
        let qr = matmul(&q, &r);
        let a = Work::load(MatrixOrder::ColMajor, m, n, &a, m);
        for (x, y) in qr.data.iter().zip(&a.data) {
            assert!((x - y).abs() < 1e-10);
        }
    }

    #[test]
    fn test_row_major_matches_col_major() {
        let lapack = NativeLapack::new();
        let col = vec![1.0f64, 3.0, 2.0, 4.0];
        let row = vec![1.0f64, 2.0, 3.0, 4.0];
        let (mut c, mut r) = (col.clone(), row.clone());
        let (mut tc, mut tr) = (vec![0.0; 2], vec![0.0; 2]);
        lapack.geqrf(MatrixOrder::ColMajor, 2, 2, &mut c, 2, &mut tc).unwrap();
        lapack.geqrf(MatrixOrder::RowMajor, 2, 2, &mut r, 2, &mut tr).unwrap();
        assert_eq!(tc, tr);
        assert!((c[0] - r[0]).abs() < 1e-12);
        assert!((c[2] - r[1]).abs() < 1e-12);
        assert!((c[3] - r[3]).abs() < 1e-12);
    }

    #[test]
    fn test_gesvd_diagonal() {
        let lapack = NativeLapack::new();
        let mut a = vec![3.0f64, 0.0, 0.0, 4.0];
        let mut s = vec![0.0; 2];
        let mut u = vec![0.0; 4];
        let mut vt = vec![0.0; 4];
        lapack
            .gesvd(MatrixOrder::ColMajor, SvdJob::All, SvdJob::All, 2, 2, &mut a, 2, &mut s, &mut u, 2, &mut vt, 2)
            .unwrap();
        assert!((s[0] - 4.0).abs() < 1e-12);
        assert!((s[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_gesvd_rank_deficient_completes_u() {
        let lapack = NativeLapack::new();
        // 3x2, rank 1: both columns equal
        let mut a = vec![1.0f64, 2.0, 2.0, 1.0, 2.0, 2.0];
        let mut s = vec![0.0; 2];
        let mut u = vec![0.0; 9];
        let mut vt = vec![0.0; 4];
        lapack
            .gesvd(MatrixOrder::ColMajor, SvdJob::All, SvdJob::All, 3, 2, &mut a, 3, &mut s, &mut u, 3, &mut vt, 2)
            .unwrap();
        assert!((s[0] - 18.0f64.sqrt()).abs() < 1e-10);
        assert!(s[1].abs() < 1e-10);
        assert_orthonormal(&Work::load(MatrixOrder::ColMajor, 3, 3, &u, 3));
        assert_orthonormal(&Work::load(MatrixOrder::ColMajor, 2, 2, &vt, 2));
    }

    #[test]
    fn test_argument_errors() {
        let lapack = NativeLapack::new();
        let mut a = vec![0.0f32; 6];
        let mut tau = vec![0.0f32; 2];
        assert_eq!(
            lapack.geqrf(MatrixOrder::ColMajor, 3, 2, &mut a, 2, &mut tau),
            Err(StatusCode(-5))
        );
        assert_eq!(
            lapack.geqrf(MatrixOrder::ColMajor, 3, 2, &mut a, 3, &mut tau[..1]),
            Err(StatusCode(-6))
        );
        assert_eq!(
            lapack.orgqr(MatrixOrder::ColMajor, 2, 3, 1, &mut a, 2, &tau),
            Err(StatusCode(-3))
        );
    }
}
