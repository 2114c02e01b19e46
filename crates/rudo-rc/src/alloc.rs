//! Allocation strategies for control blocks.
//!
//! A [`BlockAlloc`] only ever provides memory for the control block itself.
//! For a combined block that includes the inline value; for an adopting block
//! the value lives wherever the caller put it and is released by the block's
//! [`Deleter`](crate::Deleter).

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

/// The allocation strategy failed to provide memory for a control block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    layout: Layout,
}

impl AllocError {
    /// Create an error for a failed request of `layout`.
    #[must_use]
    pub const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// The layout that could not be allocated.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "memory allocation of {} bytes (align {}) failed",
            self.layout.size(),
            self.layout.align()
        )
    }
}

impl std::error::Error for AllocError {}

/// Obtains and releases raw memory for control blocks.
///
/// The strategy is moved into the block it allocated and handed back out when
/// the block is released, so `deallocate` is always called on the same
/// instance that produced the memory.
///
/// # Safety
///
/// `allocate` must return memory that is valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and that stays valid
/// until it is passed to `deallocate` with the same layout.
pub unsafe trait BlockAlloc {
    /// Allocate memory described by `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the memory could not be obtained.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Release memory previously returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator with the
    /// same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: forwards to the referenced allocator.
unsafe impl<A: BlockAlloc + ?Sized> BlockAlloc for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: the caller upholds the contract for the referenced allocator.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

/// The ambient global allocator (`std::alloc`). This is the default strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: defers to the registered global allocator.
unsafe impl BlockAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            // Zero-sized requests never reach the global allocator.
            return NonNull::new(std::ptr::without_provenance_mut(layout.align()))
                .ok_or(AllocError::new(layout));
        }
        // SAFETY: layout has a non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::new(layout))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: the caller guarantees `ptr` came from `allocate(layout)`.
            unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
        }
    }
}

/// Places every control block in its own anonymous page mapping.
///
/// Releasing a block unmaps its pages, so a stale access to released block
/// storage faults instead of silently reading reused memory. This makes it a
/// useful strategy when chasing lifetime bugs in code built on top of
/// `Shared`/`Weak`; it is far too wasteful for general use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageAlloc;

impl PageAlloc {
    /// Size of the mapping used for `layout`, rounded up to whole pages.
    fn mapping_len(layout: Layout) -> Option<usize> {
        let page = sys_alloc::page_size();
        let size = layout.size().max(1);
        size.checked_add(page - 1).map(|len| len & !(page - 1))
    }
}

// SAFETY: mappings are page aligned, at least `layout.size()` long, and stay
// mapped until `deallocate` unmaps them.
unsafe impl BlockAlloc for PageAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.align() > sys_alloc::page_size() {
            return Err(AllocError::new(layout));
        }
        let len = Self::mapping_len(layout).ok_or(AllocError::new(layout))?;
        // SAFETY: an anonymous private mapping with no address hint.
        let mapping = unsafe { sys_alloc::MmapOptions::new().len(len).map_anon() }
            .map_err(|_| AllocError::new(layout))?;
        let (ptr, _) = mapping.into_raw();
        NonNull::new(ptr).ok_or(AllocError::new(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if let Some(len) = Self::mapping_len(layout) {
            // SAFETY: `ptr` and `len` describe the mapping created by `allocate`.
            drop(unsafe { sys_alloc::Mmap::from_raw(ptr.as_ptr(), len) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_roundtrip() {
        let layout = Layout::new::<[u64; 4]>();
        let ptr = Global.allocate(layout).expect("global allocation");
        assert_eq!(ptr.as_ptr() as usize % layout.align(), 0);
        unsafe {
            ptr.as_ptr().write_bytes(0xAB, layout.size());
            assert_eq!(*ptr.as_ptr().add(31), 0xAB);
            Global.deallocate(ptr, layout);
        }
    }

    #[test]
    fn test_global_zero_sized() {
        let layout = Layout::new::<()>();
        let ptr = Global.allocate(layout).expect("zero-sized allocation");
        unsafe { Global.deallocate(ptr, layout) };
    }

    #[test]
    fn test_page_alloc_is_page_aligned() {
        let layout = Layout::new::<[u8; 100]>();
        let ptr = PageAlloc.allocate(layout).expect("page allocation");
        assert_eq!(ptr.as_ptr() as usize % sys_alloc::page_size(), 0);
        unsafe {
            ptr.as_ptr().write_bytes(7, layout.size());
            assert_eq!(*ptr.as_ptr().add(99), 7);
            PageAlloc.deallocate(ptr, layout);
        }
    }

    #[test]
    fn test_page_alloc_rejects_oversized_alignment() {
        let align = sys_alloc::page_size() * 2;
        let layout = Layout::from_size_align(16, align).unwrap();
        let err = PageAlloc.allocate(layout).unwrap_err();
        assert_eq!(err.layout(), layout);
    }

    #[test]
    fn test_mapping_len_rounds_to_pages() {
        let page = sys_alloc::page_size();
        assert_eq!(PageAlloc::mapping_len(Layout::new::<u8>()), Some(page));
        let two_pages = Layout::from_size_align(page + 1, 1).unwrap();
        assert_eq!(PageAlloc::mapping_len(two_pages), Some(page * 2));
    }

    #[test]
    fn test_alloc_error_display() {
        let err = AllocError::new(Layout::new::<u32>());
        assert_eq!(err.to_string(), "memory allocation of 4 bytes (align 4) failed");
    }
}
