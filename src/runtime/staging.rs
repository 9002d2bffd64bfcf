//! Host staging buffers
//!
//! Decomposition fallbacks copy device arrays into host memory, run the
//! external routine there and copy the results back. `PinnedBuffer` owns
//! that host memory and releases it when dropped, so an early return
//! through `?` can never leak a staging allocation.

use crate::dtype::Element;
use crate::error::{Error, Result};
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// Alignment of staging allocations (page-friendly, AVX-512 compatible)
const STAGING_ALIGN: usize = 64;

/// Zero-initialized, aligned host buffer of `len` elements
pub struct PinnedBuffer<T: Element> {
    ptr: NonNull<T>,
    len: usize,
}

// SAFETY: PinnedBuffer uniquely owns its allocation, like Vec<T>.
unsafe impl<T: Element> Send for PinnedBuffer<T> {}
// SAFETY: shared access only hands out &[T].
unsafe impl<T: Element> Sync for PinnedBuffer<T> {}

impl<T: Element> PinnedBuffer<T> {
    /// Allocate `len` zeroed elements
    pub fn new(len: usize) -> Result<Self> {
        let Some(layout) = Self::layout(len)? else {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len,
            });
        };

        // SAFETY: layout has non-zero size (checked by `layout`).
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw as *mut T).ok_or(Error::OutOfMemory {
            size: layout.size(),
        })?;
        Ok(Self { ptr, len })
    }

    /// Allocate and fill from a slice
    pub fn from_slice(data: &[T]) -> Result<Self> {
        let mut buf = Self::new(data.len())?;
        buf.copy_from_slice(data);
        Ok(buf)
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocation layout, or `None` for zero-sized buffers
    fn layout(len: usize) -> Result<Option<AllocLayout>> {
        let elem = std::mem::size_of::<T>();
        if len == 0 || elem == 0 {
            return Ok(None);
        }
        let size = len.checked_mul(elem).ok_or(Error::OutOfMemory {
            size: usize::MAX,
        })?;
        let align = STAGING_ALIGN.max(std::mem::align_of::<T>());
        AllocLayout::from_size_align(size, align)
            .map(Some)
            .map_err(|_| Error::OutOfMemory { size })
    }
}

impl<T: Element> Deref for PinnedBuffer<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        // SAFETY: ptr is valid for len zero-initialized Pod elements (or dangling with len 0
        // or a zero-sized T, both of which are valid for slices).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Element> DerefMut for PinnedBuffer<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: as in `deref`, and &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Element> Drop for PinnedBuffer<T> {
    fn drop(&mut self) {
        // Layout computation succeeded at construction, so it succeeds again here.
        if let Ok(Some(layout)) = Self::layout(self.len) {
            // SAFETY: ptr was returned by alloc_zeroed with this exact layout.
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}

impl<T: Element> std::fmt::Debug for PinnedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinnedBuffer")
            .field("len", &self.len)
            .finish()
    }
}
