//! Cleanup actions for adopted values.

use std::ptr::NonNull;

/// Tears down a value adopted by an adopting control block.
///
/// The deleter runs exactly once, when the last `Shared` for the block is
/// dropped. Any `FnOnce(NonNull<T>)` closure is a deleter.
pub trait Deleter<T: ?Sized> {
    /// Destroy the value behind `ptr` and release its storage.
    ///
    /// # Safety
    ///
    /// `ptr` must be the pointer this deleter was adopted with, and the value
    /// must not be accessed again after this call.
    unsafe fn delete(self, ptr: NonNull<T>);
}

/// Drops a value that was allocated as a `Box<T>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultDelete;

impl<T: ?Sized> Deleter<T> for DefaultDelete {
    #[inline]
    unsafe fn delete(self, ptr: NonNull<T>) {
        // SAFETY: values adopted with `DefaultDelete` came from `Box::into_raw`.
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }
}

impl<T: ?Sized, F: FnOnce(NonNull<T>)> Deleter<T> for F {
    #[inline]
    unsafe fn delete(self, ptr: NonNull<T>) {
        self(ptr);
    }
}
