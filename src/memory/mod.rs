//! Aligned buffers for benchmark kernels
//!
//! [`AlignedBuffer`] owns an aligned heap allocation and releases it on drop,
//! so every exit path (including `?` on a later allocation) frees memory.
//! Allocation failure is reported as [`AllocError`] instead of aborting.

use std::alloc::{self, Layout};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use thiserror::Error;

/// Default alignment: one cache line, also enough for AVX-512 loads.
pub const CACHE_LINE_BYTES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("out of memory allocating {bytes} bytes aligned to {align}")]
    OutOfMemory { bytes: usize, align: usize },
    #[error("invalid layout for {elements} elements aligned to {align}")]
    InvalidLayout { elements: usize, align: usize },
}

pub struct AlignedBuffer<T: Copy> {
    ptr: NonNull<T>,
    len: usize,
    layout: Option<Layout>,
}

impl<T: Copy> AlignedBuffer<T> {
    /// Allocates `len` elements at `align` bytes and writes `value` into each.
    ///
    /// `align` is raised to `align_of::<T>()` if smaller and must be a power of two.
    pub fn filled(len: usize, align: usize, value: T) -> Result<Self, AllocError> {
        let align = align.max(std::mem::align_of::<T>());
        let invalid = || AllocError::InvalidLayout { elements: len, align };

        let bytes = len.checked_mul(std::mem::size_of::<T>()).ok_or_else(invalid)?;
        let layout = Layout::from_size_align(bytes, align).map_err(|_| invalid())?;

        if bytes == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len,
                layout: None,
            });
        }

        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc(layout) } as *mut T;
        let ptr = NonNull::new(raw).ok_or(AllocError::OutOfMemory { bytes, align })?;

        for i in 0..len {
            // SAFETY: i < len and the allocation holds len elements.
            unsafe { ptr.as_ptr().add(i).write(value) };
        }

        Ok(Self {
            ptr,
            len,
            layout: Some(layout),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn alignment(&self) -> usize {
        self.layout.map_or(std::mem::align_of::<T>(), |l| l.align())
    }

    pub fn size_bytes(&self) -> usize {
        self.len * std::mem::size_of::<T>()
    }

    /// Asks the kernel to back this buffer with transparent huge pages.
    ///
    /// Only the page-aligned interior is advised. Returns whether the hint was
    /// accepted; refusal is harmless.
    pub fn advise_huge_pages(&self) -> bool {
        advise_huge_pages(self.ptr.as_ptr() as *mut u8, self.size_bytes())
    }
}

impl<T: Copy + Default> AlignedBuffer<T> {
    pub fn new(len: usize, align: usize) -> Result<Self, AllocError> {
        Self::filled(len, align, T::default())
    }
}

impl<T: Copy> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: ptr is valid for len initialised elements (or dangling with len 0).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: as in deref, and &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        if let Some(layout) = self.layout {
            // SAFETY: allocated in `filled` with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}

impl<T: Copy> fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("align", &self.alignment())
            .finish()
    }
}

// SAFETY: the buffer uniquely owns its allocation, like Vec<T>.
unsafe impl<T: Copy + Send> Send for AlignedBuffer<T> {}
unsafe impl<T: Copy + Sync> Sync for AlignedBuffer<T> {}

#[cfg(target_os = "linux")]
fn advise_huge_pages(ptr: *mut u8, len: usize) -> bool {
    // SAFETY: sysconf has no preconditions.
    let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    let page = if page > 0 { page as usize } else { 4096 };

    let start = ptr as usize;
    let end = start + len;
    let aligned_start = (start + page - 1) & !(page - 1);
    let aligned_end = end & !(page - 1);
    if aligned_end <= aligned_start {
        return false;
    }

    // SAFETY: the range lies inside a live allocation owned by the caller.
    let rc = unsafe {
        libc::madvise(
            aligned_start as *mut libc::c_void,
            aligned_end - aligned_start,
            libc::MADV_HUGEPAGE,
        )
    };
    if rc != 0 {
        log::debug!("madvise(MADV_HUGEPAGE) refused: {}", std::io::Error::last_os_error());
    }
    rc == 0
}

#[cfg(not(target_os = "linux"))]
fn advise_huge_pages(_ptr: *mut u8, _len: usize) -> bool {
    false
}
