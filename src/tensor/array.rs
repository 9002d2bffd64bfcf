//! Array: a dense, device-resident buffer with four logical axes

use super::Dim4;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::runtime::Device;

/// Dense column-major array of `T` resident on a device
///
/// The buffer is always contiguous: strides are derived from the dims.
/// Operations that hand the buffer to an external engine use
/// [`Array::as_bytes`] / [`Array::as_bytes_mut`], which are zero-copy views.
#[derive(Clone, Debug, PartialEq)]
pub struct Array<T: Element> {
    dims: Dim4,
    device: Device,
    data: Vec<T>,
}

impl<T: Element> Array<T> {
    /// Allocate a zero-filled array
    pub fn empty(dims: Dim4, device: &Device) -> Self {
        Self {
            dims,
            device: *device,
            data: vec![T::zero(); dims.elements()],
        }
    }

    /// Create an array by copying `data`, which must hold exactly `dims.elements()` values
    pub fn from_slice(data: &[T], dims: Dim4, device: &Device) -> Result<Self> {
        if data.len() != dims.elements() {
            return Err(Error::shape_mismatch(&[dims.elements()], &[data.len()]));
        }
        Ok(Self {
            dims,
            device: *device,
            data: data.to_vec(),
        })
    }

    /// Axis lengths
    #[inline]
    pub fn dims(&self) -> Dim4 {
        self.dims
    }

    /// Element strides along each axis
    #[inline]
    pub fn strides(&self) -> Dim4 {
        self.dims.contiguous_strides()
    }

    /// Total number of elements
    #[inline]
    pub fn elements(&self) -> usize {
        self.data.len()
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Device the buffer lives on
    #[inline]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Copy the contents into a new host vector
    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }

    /// Borrow the buffer as elements
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutably borrow the buffer as elements
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Borrow the buffer as raw bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Mutably borrow the buffer as raw bytes
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// Copy device contents into host staging memory
    ///
    /// `dst` must be at least `elements()` long; extra space is left untouched.
    pub fn copy_to_host(&self, dst: &mut [T]) -> Result<()> {
        let n = self.data.len();
        if dst.len() < n {
            return Err(Error::invalid_argument(
                "dst",
                format!("host buffer holds {} elements, array has {}", dst.len(), n),
            ));
        }
        dst[..n].copy_from_slice(&self.data);
        Ok(())
    }

    /// Overwrite device contents from host staging memory
    ///
    /// Reads the first `elements()` values of `src`.
    pub fn write_host_data(&mut self, src: &[T]) -> Result<()> {
        let n = self.data.len();
        if src.len() < n {
            return Err(Error::invalid_argument(
                "src",
                format!("host buffer holds {} elements, array needs {}", src.len(), n),
            ));
        }
        self.data.copy_from_slice(&src[..n]);
        Ok(())
    }

    /// Multiply every element by a real factor
    pub fn scale_inplace(&mut self, factor: f64) {
        if factor == 1.0 {
            return;
        }
        for v in &mut self.data {
            *v = v.scale(factor);
        }
    }
}
