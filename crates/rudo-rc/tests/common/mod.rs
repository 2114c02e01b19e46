//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use rudo_rc::{AllocError, BlockAlloc, Global, Managed};

/// Counts how many times values holding it were dropped.
#[derive(Debug)]
pub struct DropCounter(pub Rc<Cell<usize>>);

impl DropCounter {
    pub fn new() -> (Self, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        (Self(Rc::clone(&count)), count)
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

impl Managed for DropCounter {}

/// Delegates to `Global` and tracks outstanding allocations.
#[derive(Clone, Default)]
pub struct CountingAlloc {
    pub allocated: Rc<Cell<usize>>,
    pub released: Rc<Cell<usize>>,
}

impl CountingAlloc {
    pub fn outstanding(&self) -> usize {
        self.allocated.get() - self.released.get()
    }
}

// SAFETY: forwards to `Global`.
unsafe impl BlockAlloc for CountingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = Global.allocate(layout)?;
        self.allocated.set(self.allocated.get() + 1);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.released.set(self.released.get() + 1);
        unsafe { Global.deallocate(ptr, layout) };
    }
}

/// Never hands out memory.
#[derive(Clone, Copy, Default)]
pub struct FailingAlloc;

// SAFETY: never returns memory.
unsafe impl BlockAlloc for FailingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        Err(AllocError::new(layout))
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        unreachable!("FailingAlloc never allocates");
    }
}
