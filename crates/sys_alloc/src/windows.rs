use std::io::{self, Error};
#[cfg(not(miri))]
use std::mem;
#[cfg(not(miri))]
use std::ptr;

#[cfg(not(miri))]
use windows_sys::Win32::System::Memory::{
    VirtualAlloc, VirtualFree, MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE,
};
#[cfg(not(miri))]
use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

#[cfg(not(miri))]
fn system_info() -> SYSTEM_INFO {
    // SAFETY: GetSystemInfo fills every field of the zeroed struct.
    unsafe {
        let mut info: SYSTEM_INFO = mem::zeroed();
        GetSystemInfo(&mut info);
        info
    }
}

/// Returns the system page size.
pub fn page_size() -> usize {
    #[cfg(miri)]
    {
        4096
    }
    #[cfg(not(miri))]
    {
        match system_info().dwPageSize as usize {
            0 => 4096,
            size => size,
        }
    }
}

pub struct MmapInner {
    ptr: *mut std::ffi::c_void,
    len: usize,
}

impl MmapInner {
    /// # Safety
    ///
    /// `len` must be non-zero.
    pub unsafe fn map_anon(len: usize) -> io::Result<Self> {
        #[cfg(miri)]
        {
            use std::alloc::{alloc, Layout};
            // Miri has no VirtualAlloc.
            let layout = Layout::from_size_align(len, page_size())
                .map_err(|_| Error::from(io::ErrorKind::InvalidInput))?;
            // SAFETY: len is non-zero.
            let ptr = unsafe { alloc(layout) };
            if ptr.is_null() {
                return Err(Error::from(io::ErrorKind::OutOfMemory));
            }
            Ok(Self {
                ptr: ptr.cast::<std::ffi::c_void>(),
                len,
            })
        }
        #[cfg(not(miri))]
        {
            // SAFETY: no address is requested, so nothing existing is replaced.
            let ptr = unsafe {
                VirtualAlloc(ptr::null(), len, MEM_COMMIT | MEM_RESERVE, PAGE_READWRITE)
            };
            if ptr.is_null() {
                return Err(Error::last_os_error());
            }
            Ok(Self { ptr, len })
        }
    }

    /// # Safety
    ///
    /// `ptr`/`len` must describe a live mapping nobody else will release.
    pub const unsafe fn from_raw(ptr: *mut u8, len: usize) -> Self {
        Self {
            ptr: ptr.cast::<std::ffi::c_void>(),
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
                #[cfg(miri)]
                {
                    use std::alloc::{dealloc, Layout};
                    let layout = Layout::from_size_align_unchecked(self.len, page_size());
                    dealloc(self.ptr.cast::<u8>(), layout);
                }
                #[cfg(not(miri))]
                {
                    // MEM_RELEASE requires dwSize to be 0
                    VirtualFree(self.ptr, 0, MEM_RELEASE);
                }
            }
        }
    }
}
