use std::io::{self, Error};
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the system page size, cached atomically.
pub fn page_size() -> usize {
    static PAGE_SIZE: AtomicUsize = AtomicUsize::new(0);

    match PAGE_SIZE.load(Ordering::Relaxed) {
        0 => {
            // SAFETY: sysconf has no preconditions.
            let raw = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
            let page_size = usize::try_from(raw).unwrap_or(4096);
            PAGE_SIZE.store(page_size, Ordering::Relaxed);
            page_size
        }
        page_size => page_size,
    }
}

pub struct MmapInner {
    ptr: *mut libc::c_void,
    len: usize,
}

impl MmapInner {
    /// # Safety
    ///
    /// `len` must be non-zero.
    pub unsafe fn map_anon(len: usize) -> io::Result<Self> {
        let flags = libc::MAP_PRIVATE | libc::MAP_ANON;
        let prot = libc::PROT_READ | libc::PROT_WRITE;

        // SAFETY: no fixed address is requested, so nothing existing is replaced.
        let ptr = unsafe { libc::mmap(ptr::null_mut(), len, prot, flags, -1, 0) };
        if ptr == libc::MAP_FAILED {
            return Err(Error::last_os_error());
        }

        Ok(Self { ptr, len })
    }

    /// # Safety
    ///
    /// `ptr`/`len` must describe a live mapping nobody else will unmap.
    pub const unsafe fn from_raw(ptr: *mut u8, len: usize) -> Self {
        Self {
            ptr: ptr.cast::<libc::c_void>(),
            len,
        }
    }

    pub const fn ptr(&self) -> *mut u8 {
        self.ptr.cast::<u8>()
    }

    pub const fn len(&self) -> usize {
        self.len
    }
}

impl Drop for MmapInner {
    fn drop(&mut self) {
        if self.len > 0 {
            // SAFETY: we own the mapping.
            unsafe {
                libc::munmap(self.ptr, self.len);
            }
        }
    }
}
