//! QR and SVD through the host LAPACK fallback
//!
//! Matrices are column-major; every factorization is checked by
//! reconstruction and by orthonormality of its orthogonal factors.

mod common;

use common::{assert_allclose_f32, assert_allclose_f64, init_tracing};
use planr::error::Error;
use planr::linalg::{LapackFallback, NativeLapack};
use planr::runtime::Device;
use planr::tensor::{Array, Dim4};

fn fallback() -> LapackFallback {
    init_tracing();
    LapackFallback::new(NativeLapack::new())
}

/// Deterministic, well-conditioned test matrix
fn test_matrix(m: usize, n: usize) -> Vec<f64> {
    (0..m * n)
        .map(|idx| {
            let (i, j) = (idx % m, idx / m);
            ((i * 3 + j * 5) % 7) as f64 - 3.0 + if i == j { 4.0 } else { 0.0 }
        })
        .collect()
}

/// `a (m x k) * b (k x n)`, column-major
fn matmul(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * n];
    for j in 0..n {
        for p in 0..k {
            let bpj = b[p + j * k];
            for i in 0..m {
                c[i + j * m] += a[i + p * m] * bpj;
            }
        }
    }
    c
}

fn transpose(a: &[f64], m: usize, n: usize) -> Vec<f64> {
    let mut t = vec![0.0; m * n];
    for j in 0..n {
        for i in 0..m {
            t[j + i * n] = a[i + j * m];
        }
    }
    t
}

fn identity(n: usize) -> Vec<f64> {
    let mut eye = vec![0.0; n * n];
    for i in 0..n {
        eye[i + i * n] = 1.0;
    }
    eye
}

fn assert_orthonormal(q: &[f64], n: usize, msg: &str) {
    let qtq = matmul(&transpose(q, n, n), q, n, n, n);
    assert_allclose_f64(&qtq, &identity(n), 0.0, 1e-10, msg);
}

// ============================================================================
// QR
// ============================================================================

#[test]
fn test_qr_reconstructs() {
    let device = Device::new(0);
    let fallback = fallback();

    for (m, n) in [(4, 4), (6, 3), (3, 5), (1, 1)] {
        let data = test_matrix(m, n);
        let a = Array::from_slice(&data, Dim4::matrix(m, n), &device).unwrap();
        let qr = fallback.qr(&a).unwrap();

        assert_eq!(qr.q.dims(), Dim4::matrix(m, m));
        assert_eq!(qr.r.dims(), Dim4::matrix(m, n));
        assert_eq!(qr.tau.dims(), Dim4::vector(m.min(n)));

        let q = qr.q.to_vec();
        let r = qr.r.to_vec();
        for j in 0..n {
            for i in j + 1..m {
                assert_eq!(r[i + j * m], 0.0, "R not upper triangular at ({}, {})", i, j);
            }
        }

        assert_orthonormal(&q, m, &format!("QᵀQ for {}x{}", m, n));
        assert_allclose_f64(&matmul(&q, &r, m, m, n), &data, 1e-10, 1e-10, &format!("QR {}x{}", m, n));
    }
}

#[test]
fn test_qr_f32() {
    let device = Device::new(0);
    let data: Vec<f32> = test_matrix(5, 3).into_iter().map(|x| x as f32).collect();
    let a = Array::from_slice(&data, Dim4::matrix(5, 3), &device).unwrap();
    let qr = fallback().qr(&a).unwrap();

    let q: Vec<f64> = qr.q.to_vec().into_iter().map(f64::from).collect();
    let r: Vec<f64> = qr.r.to_vec().into_iter().map(f64::from).collect();
    let qr_product: Vec<f32> = matmul(&q, &r, 5, 5, 3).into_iter().map(|x| x as f32).collect();
    assert_allclose_f32(&qr_product, &data, 1e-4, 1e-4, "f32 QR");
}

#[test]
fn test_qr_rejects_batched_input() {
    let device = Device::new(0);
    let a = Array::<f64>::empty(Dim4::new(3, 3, 2, 1), &device);
    assert!(matches!(
        fallback().qr(&a),
        Err(Error::InvalidArgument { arg: "input", .. })
    ));
}

// ============================================================================
// SVD
// ============================================================================

fn check_svd(m: usize, n: usize) {
    let device = Device::new(0);
    let data = test_matrix(m, n);
    let a = Array::from_slice(&data, Dim4::matrix(m, n), &device).unwrap();
    let svd = fallback().svd(&a).unwrap();
    let k = m.min(n);

    let s = svd.s.to_vec();
    let u = svd.u.to_vec();
    let vt = svd.vt.to_vec();
    assert_eq!(s.len(), k);
    assert!(s.windows(2).all(|w| w[0] >= w[1]), "singular values not sorted: {:?}", s);
    assert!(s.iter().all(|&x| x >= 0.0));

    assert_orthonormal(&u, m, &format!("UᵀU for {}x{}", m, n));
    assert_orthonormal(&transpose(&vt, n, n), n, &format!("VᵀV for {}x{}", m, n));

    let mut sigma = vec![0.0; m * n];
    for i in 0..k {
        sigma[i + i * m] = s[i];
    }
    let recon = matmul(&matmul(&u, &sigma, m, m, n), &vt, m, n, n);
    assert_allclose_f64(&recon, &data, 1e-9, 1e-9, &format!("SVD {}x{}", m, n));

    // Input is left untouched
    assert_eq!(a.to_vec(), data);
}

#[test]
fn test_svd_square() {
    check_svd(4, 4);
}

#[test]
fn test_svd_tall() {
    check_svd(6, 3);
}

#[test]
fn test_svd_wide() {
    check_svd(2, 5);
}

#[test]
fn test_svd_known_values() {
    let device = Device::new(0);
    // diag(3, 2) padded with a zero row
    let a = Array::from_slice(&[3.0f64, 0.0, 0.0, 0.0, -2.0, 0.0], Dim4::matrix(3, 2), &device).unwrap();
    let svd = fallback().svd(&a).unwrap();
    assert_allclose_f64(&svd.s.to_vec(), &[3.0, 2.0], 0.0, 1e-12, "singular values");
}

#[test]
fn test_svd_inplace_matches_svd() {
    let device = Device::new(0);
    let fallback = fallback();
    let (m, n) = (5, 4);
    let data = test_matrix(m, n);
    let a = Array::from_slice(&data, Dim4::matrix(m, n), &device).unwrap();
    let expected = fallback.svd(&a).unwrap();

    let mut work = a.clone();
    let mut s = Array::<f64>::empty(Dim4::vector(4), &device);
    let mut u = Array::<f64>::empty(Dim4::matrix(m, m), &device);
    let mut vt = Array::<f64>::empty(Dim4::matrix(n, n), &device);
    fallback.svd_inplace(&mut s, &mut u, &mut vt, &mut work).unwrap();

    assert_allclose_f64(&s.to_vec(), &expected.s.to_vec(), 1e-12, 1e-12, "in-place singular values");
}

#[test]
fn test_svd_into_rejects_bad_outputs() {
    let device = Device::new(0);
    let fallback = fallback();
    let a = Array::from_slice(&test_matrix(4, 2), Dim4::matrix(4, 2), &device).unwrap();

    let mut s = Array::<f64>::empty(Dim4::vector(4), &device);
    let mut u = Array::<f64>::empty(Dim4::matrix(4, 4), &device);
    let mut vt = Array::<f64>::empty(Dim4::matrix(2, 2), &device);
    assert!(matches!(
        fallback.svd_into(&mut s, &mut u, &mut vt, &a),
        Err(Error::ShapeMismatch { .. })
    ));

    let mut s = Array::<f64>::empty(Dim4::vector(2), &device);
    fallback.svd_into(&mut s, &mut u, &mut vt, &a).unwrap();
    assert!(s.to_vec()[0] >= s.to_vec()[1]);
}
