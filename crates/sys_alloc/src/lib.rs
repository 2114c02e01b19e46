//! Anonymous page mappings.
//!
//! A thin, platform neutral wrapper over `mmap`/`munmap` and
//! `VirtualAlloc`/`VirtualFree`. `rudo-rc` uses it to give every control block
//! its own mapping when the page allocator is selected.

use std::io;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as os;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as os;

pub use os::page_size;

/// An owned anonymous memory mapping, unmapped on drop.
pub struct Mmap {
    inner: os::MmapInner,
}

impl Mmap {
    /// Pointer to the start of the mapping.
    #[must_use]
    pub fn ptr(&self) -> *mut u8 {
        self.inner.ptr()
    }

    /// Length of the mapping in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` for a zero-length mapping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Give up ownership without unmapping. Returns the start and length,
    /// which must eventually go back through [`Mmap::from_raw`].
    #[must_use]
    pub fn into_raw(self) -> (*mut u8, usize) {
        let raw = (self.ptr(), self.len());
        std::mem::forget(self);
        raw
    }

    /// Take back ownership of a mapping released with [`Mmap::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` and `len` must be exactly the values returned by `into_raw`, and
    /// the mapping must not be reclaimed twice.
    #[must_use]
    pub unsafe fn from_raw(ptr: *mut u8, len: usize) -> Self {
        Self {
            // SAFETY: forwarded from the caller.
            inner: unsafe { os::MmapInner::from_raw(ptr, len) },
        }
    }
}

impl std::fmt::Debug for Mmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mmap")
            .field("ptr", &self.ptr())
            .field("len", &self.len())
            .finish()
    }
}

/// Configuration for creating a mapping.
#[derive(Debug, Clone, Default)]
pub struct MmapOptions {
    len: usize,
}

impl MmapOptions {
    /// Options with length 0. A length must be set before mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self { len: 0 }
    }

    /// Sets the length of the mapping in bytes.
    #[must_use]
    pub const fn len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    /// Creates a private, read-write anonymous mapping.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidInput` for a zero length, or with the OS error if
    /// the mapping cannot be created.
    ///
    /// # Safety
    ///
    /// The memory is raw: pointers derived from [`Mmap::ptr`] dangle once the
    /// `Mmap` is dropped.
    pub unsafe fn map_anon(&self) -> io::Result<Mmap> {
        if self.len == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "length must be greater than 0",
            ));
        }

        // SAFETY: a fresh anonymous mapping aliases nothing.
        let inner = unsafe { os::MmapInner::map_anon(self.len)? };
        Ok(Mmap { inner })
    }
}
