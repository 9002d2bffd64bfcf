//! Dim4: the four logical axes every array carries
//!
//! Arrays always have exactly four axes; unused trailing axes have length 1.
//! Storage is column-major: axis 0 is contiguous, so the stride of axis `i`
//! is the product of the lengths of axes `0..i`.

use crate::error::{Error, Result};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of logical axes
pub const MAX_DIMS: usize = 4;

/// Lengths (or strides) along the four logical axes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dim4([usize; MAX_DIMS]);

impl Dim4 {
    /// Create from four explicit axis lengths
    #[inline]
    pub const fn new(d0: usize, d1: usize, d2: usize, d3: usize) -> Self {
        Self([d0, d1, d2, d3])
    }

    /// 1D vector of length `n`
    #[inline]
    pub const fn vector(n: usize) -> Self {
        Self([n, 1, 1, 1])
    }

    /// Matrix with `rows` rows and `cols` columns
    #[inline]
    pub const fn matrix(rows: usize, cols: usize) -> Self {
        Self([rows, cols, 1, 1])
    }

    /// Create from up to four lengths, padding trailing axes with 1
    pub fn from_slice(dims: &[usize]) -> Result<Self> {
        if dims.len() > MAX_DIMS {
            return Err(Error::invalid_argument(
                "dims",
                format!("at most {} axes supported, got {}", MAX_DIMS, dims.len()),
            ));
        }
        let mut out = [1usize; MAX_DIMS];
        out[..dims.len()].copy_from_slice(dims);
        Ok(Self(out))
    }

    /// Total number of elements
    #[inline]
    pub fn elements(&self) -> usize {
        self.0.iter().product()
    }

    /// Number of significant axes (index of the last axis longer than 1, plus one)
    pub fn ndims(&self) -> usize {
        if self.elements() == 0 {
            return 0;
        }
        self.0
            .iter()
            .rposition(|&d| d != 1)
            .map(|i| i + 1)
            .unwrap_or(1)
    }

    /// Column-major element strides for a dense array of these lengths
    pub fn contiguous_strides(&self) -> Dim4 {
        let mut strides = [1usize; MAX_DIMS];
        for i in 1..MAX_DIMS {
            strides[i] = strides[i - 1] * self.0[i - 1];
        }
        Dim4(strides)
    }

    /// Product of axis lengths from `start` to the last axis
    ///
    /// With `start = rank` this is the batch count of a rank-`rank` transform.
    #[inline]
    pub fn trailing_product(&self, start: usize) -> usize {
        self.0[start.min(MAX_DIMS)..].iter().product()
    }

    /// View as a slice
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Copy out as a vector (for error reporting)
    pub fn to_vec(&self) -> Vec<usize> {
        self.0.to_vec()
    }
}

impl Default for Dim4 {
    fn default() -> Self {
        Self([1; MAX_DIMS])
    }
}

impl Index<usize> for Dim4 {
    type Output = usize;

    #[inline]
    fn index(&self, index: usize) -> &usize {
        &self.0[index]
    }
}

impl IndexMut<usize> for Dim4 {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut usize {
        &mut self.0[index]
    }
}

impl fmt::Debug for Dim4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Dim4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {} {}]", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}
