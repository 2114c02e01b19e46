//! Control blocks.
//!
//! A control block carries the two lifetime counters shared by every
//! `Shared`/`Weak` handle of one managed value:
//!
//! - `share`: live owning handles. The value is alive iff `share > 0`.
//! - `watch`: live observing handles. The block storage is alive iff
//!   `share > 0 || watch > 0`.
//!
//! Teardown happens in two phases. When `share` reaches zero the value is
//! destroyed on the spot; the storage is released once `watch` is zero as
//! well. Observers can therefore still ask whether the value is alive after
//! it is gone, but never keep it alive.
//!
//! Every concrete block starts with a [`BlockHeader`] (`#[repr(C)]`, offset 0)
//! whose vtable dispatches the variant specific steps, so handles only ever
//! hold a type-erased `NonNull<BlockHeader>`.

use std::alloc::Layout;
use std::cell::Cell;
use std::mem::{ManuallyDrop, MaybeUninit};
use std::ptr::{addr_of_mut, NonNull};

use crate::alloc::{AllocError, BlockAlloc};
use crate::deleter::Deleter;
use crate::error::TryNewError;
use crate::stats;
use crate::tracing::internal as events;

/// How a control block came to own its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// The value was allocated separately and adopted together with a deleter.
    Adopting,
    /// The value lives inline in the block's own allocation.
    Combined,
}

/// Variant specific steps of a control block.
pub(crate) struct BlockVTable {
    kind: BlockKind,
    /// Runs the value's teardown without touching block storage.
    destroy_value: unsafe fn(NonNull<BlockHeader>),
    /// Frees the block's own storage. The value is already gone.
    release_block: unsafe fn(NonNull<BlockHeader>),
    /// Address of the managed value.
    value_address: unsafe fn(NonNull<BlockHeader>) -> NonNull<u8>,
}

/// Common prefix of every control block.
#[repr(C)]
pub(crate) struct BlockHeader {
    share: Cell<usize>,
    watch: Cell<usize>,
    vtable: &'static BlockVTable,
}

impl BlockHeader {
    const fn new(vtable: &'static BlockVTable) -> Self {
        Self {
            share: Cell::new(1),
            watch: Cell::new(0),
            vtable,
        }
    }

    // The functions below take the header by pointer rather than by reference:
    // the cascade may release the storage while the call is still running, and
    // value teardown may re-enter through handles stored inside the value.

    /// # Safety
    ///
    /// `this` must point to a block that has not been released.
    #[inline]
    pub(crate) unsafe fn share_count(this: NonNull<Self>) -> usize {
        // SAFETY: the block is not released.
        unsafe { (*this.as_ptr()).share.get() }
    }

    /// # Safety
    ///
    /// `this` must point to a block that has not been released.
    #[inline]
    pub(crate) unsafe fn watch_count(this: NonNull<Self>) -> usize {
        // SAFETY: the block is not released.
        unsafe { (*this.as_ptr()).watch.get() }
    }

    /// # Safety
    ///
    /// `this` must point to a block that has not been released.
    #[inline]
    pub(crate) unsafe fn kind(this: NonNull<Self>) -> BlockKind {
        // SAFETY: the block is not released.
        unsafe { (*this.as_ptr()).vtable.kind }
    }

    /// # Safety
    ///
    /// `this` must point to a block whose value has not been destroyed.
    #[inline]
    pub(crate) unsafe fn value_address(this: NonNull<Self>) -> NonNull<u8> {
        // SAFETY: the block is not released; the vtable matches the block type.
        unsafe {
            let value_address = (*this.as_ptr()).vtable.value_address;
            value_address(this)
        }
    }

    /// # Safety
    ///
    /// `this` must point to a block that has not been released.
    #[inline]
    pub(crate) unsafe fn increase_share(this: NonNull<Self>) {
        // SAFETY: the block is not released.
        let share = unsafe { &(*this.as_ptr()).share };
        share.set(increment(share.get()));
    }

    /// # Safety
    ///
    /// `this` must point to a block that has not been released.
    #[inline]
    pub(crate) unsafe fn increase_watch(this: NonNull<Self>) {
        // SAFETY: the block is not released.
        let watch = unsafe { &(*this.as_ptr()).watch };
        watch.set(increment(watch.get()));
    }

    /// Give up one share. The last share destroys the value, and releases the
    /// block too if nobody is watching it.
    ///
    /// # Safety
    ///
    /// `this` must point to a block with `share > 0`, and the caller must own
    /// the share it gives up. The block may be released on return.
    pub(crate) unsafe fn decrease_share(this: NonNull<Self>) {
        // SAFETY: the caller owns a share, so the block is live.
        let remaining = unsafe {
            let share = &(*this.as_ptr()).share;
            debug_assert!(share.get() > 0, "share count underflow");
            let remaining = share.get() - 1;
            share.set(remaining);
            remaining
        };
        if remaining != 0 {
            return;
        }

        // Value teardown may drop observers of this very block (a cached
        // self-reference, a weak parent link). A provisional watch keeps the
        // storage in place until the value is completely gone.
        // SAFETY: still live, the watch count only goes up here.
        unsafe { Self::increase_watch(this) };

        // SAFETY: share just reached zero, so this is the only teardown.
        let kind = unsafe {
            let vtable = (*this.as_ptr()).vtable;
            (vtable.destroy_value)(this);
            vtable.kind
        };
        stats::record_value_destroyed();
        events::log_value_destroyed(kind, this.as_ptr().cast_const().cast());

        // SAFETY: gives up the provisional watch taken above.
        unsafe { Self::decrease_watch(this) };
    }

    /// Give up one watch. Releases the block if it was the last reference of
    /// either kind.
    ///
    /// # Safety
    ///
    /// `this` must point to a block with `watch > 0`, and the caller must own
    /// the watch it gives up. The block may be released on return.
    pub(crate) unsafe fn decrease_watch(this: NonNull<Self>) {
        // SAFETY: the caller owns a watch, so the block is live.
        let (remaining, share) = unsafe {
            let header = this.as_ptr();
            let watch = &(*header).watch;
            debug_assert!(watch.get() > 0, "watch count underflow");
            let remaining = watch.get() - 1;
            watch.set(remaining);
            (remaining, (*header).share.get())
        };
        if remaining != 0 || share != 0 {
            return;
        }

        // SAFETY: both counts are zero and the value was destroyed when share
        // reached zero; nothing can reach this block any more.
        unsafe {
            let vtable = (*this.as_ptr()).vtable;
            events::log_block_released(vtable.kind, this.as_ptr().cast_const().cast());
            (vtable.release_block)(this);
        }
        stats::record_block_released();
    }
}

#[inline]
fn increment(count: usize) -> usize {
    // A wrapped counter would free a value that is still referenced.
    count.checked_add(1).unwrap_or_else(|| std::process::abort())
}

// ============================================================================
// AdoptingBlock - value allocated elsewhere, released by a deleter
// ============================================================================

/// Control block for a value allocated by the caller.
#[repr(C)]
pub(crate) struct AdoptingBlock<T: ?Sized, D, A> {
    header: BlockHeader,
    deleter: ManuallyDrop<D>,
    alloc: ManuallyDrop<A>,
    value: NonNull<T>,
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> AdoptingBlock<T, D, A> {
    const VTABLE: &'static BlockVTable = &BlockVTable {
        kind: BlockKind::Adopting,
        destroy_value: Self::destroy_value,
        release_block: Self::release_block,
        value_address: Self::value_address,
    };

    /// Allocate a block that adopts `value`.
    ///
    /// If the block cannot be allocated the value is handed to `deleter`
    /// before the error is returned, so it never leaks.
    ///
    /// # Safety
    ///
    /// `value` must be valid until `deleter` is invoked on it, and `deleter`
    /// must be a correct way to dispose of it.
    pub(crate) unsafe fn allocate(
        value: NonNull<T>,
        deleter: D,
        alloc: A,
    ) -> Result<NonNull<BlockHeader>, AllocError> {
        let layout = Layout::new::<Self>();
        let raw = match alloc.allocate(layout) {
            Ok(raw) => raw,
            Err(err) => {
                // SAFETY: the caller handed us ownership of `value`.
                unsafe { deleter.delete(value) };
                return Err(err);
            }
        };

        let block = raw.cast::<Self>();
        // SAFETY: `raw` is fresh memory sized and aligned for `Self`.
        unsafe {
            block.as_ptr().write(Self {
                header: BlockHeader::new(Self::VTABLE),
                deleter: ManuallyDrop::new(deleter),
                alloc: ManuallyDrop::new(alloc),
                value,
            });
        }

        stats::record_block_created(BlockKind::Adopting);
        events::log_block_created(BlockKind::Adopting, raw.as_ptr(), layout.size());
        Ok(block.cast())
    }

    unsafe fn destroy_value(header: NonNull<BlockHeader>) {
        let block = header.cast::<Self>().as_ptr();
        // SAFETY: called once, when share reaches zero; the deleter has not
        // been taken yet.
        unsafe {
            let deleter = ManuallyDrop::take(&mut (*block).deleter);
            let value = (*block).value;
            deleter.delete(value);
        }
    }

    unsafe fn release_block(header: NonNull<BlockHeader>) {
        let block = header.cast::<Self>();
        // SAFETY: called once, after destroy_value; the storage came from
        // this allocator with `Layout::new::<Self>()`.
        unsafe {
            let alloc = ManuallyDrop::take(&mut (*block.as_ptr()).alloc);
            alloc.deallocate(block.cast(), Layout::new::<Self>());
        }
    }

    unsafe fn value_address(header: NonNull<BlockHeader>) -> NonNull<u8> {
        // SAFETY: the block is live.
        unsafe { (*header.cast::<Self>().as_ptr()).value.cast() }
    }
}

// ============================================================================
// CombinedBlock - control data and value in one allocation
// ============================================================================

/// Control block that stores its value inline.
#[repr(C)]
pub(crate) struct CombinedBlock<T, A> {
    header: BlockHeader,
    alloc: ManuallyDrop<A>,
    value: MaybeUninit<T>,
}

impl<T, A: BlockAlloc> CombinedBlock<T, A> {
    const VTABLE: &'static BlockVTable = &BlockVTable {
        kind: BlockKind::Combined,
        destroy_value: Self::destroy_value,
        release_block: Self::release_block,
        value_address: Self::value_address,
    };

    /// Allocate a block and construct its value with `init`.
    ///
    /// Construction is all-or-nothing: if `init` fails or panics, the storage
    /// is returned to `alloc` before the failure propagates.
    pub(crate) fn try_allocate_with<E, F>(
        alloc: A,
        init: F,
    ) -> Result<NonNull<BlockHeader>, TryNewError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        struct Unfinished<'a, A: BlockAlloc> {
            alloc: &'a A,
            raw: NonNull<u8>,
            layout: Layout,
        }

        impl<A: BlockAlloc> Drop for Unfinished<'_, A> {
            fn drop(&mut self) {
                // SAFETY: the storage came from `alloc` and holds no value.
                unsafe { self.alloc.deallocate(self.raw, self.layout) };
            }
        }

        let layout = Layout::new::<Self>();
        let raw = alloc.allocate(layout)?;
        let guard = Unfinished {
            alloc: &alloc,
            raw,
            layout,
        };
        let value = init().map_err(TryNewError::Init)?;
        std::mem::forget(guard);

        let block = raw.cast::<Self>();
        // SAFETY: `raw` is fresh memory sized and aligned for `Self`.
        unsafe {
            block.as_ptr().write(Self {
                header: BlockHeader::new(Self::VTABLE),
                alloc: ManuallyDrop::new(alloc),
                value: MaybeUninit::new(value),
            });
        }

        stats::record_block_created(BlockKind::Combined);
        events::log_block_created(BlockKind::Combined, raw.as_ptr(), layout.size());
        Ok(block.cast())
    }

    unsafe fn destroy_value(header: NonNull<BlockHeader>) {
        let block = header.cast::<Self>().as_ptr();
        // SAFETY: called once, when share reaches zero; the value is
        // initialized until now. Only the value field is borrowed mutably.
        unsafe { addr_of_mut!((*block).value).cast::<T>().drop_in_place() };
    }

    unsafe fn release_block(header: NonNull<BlockHeader>) {
        let block = header.cast::<Self>();
        // SAFETY: called once, after destroy_value; the storage came from
        // this allocator with `Layout::new::<Self>()`.
        unsafe {
            let alloc = ManuallyDrop::take(&mut (*block.as_ptr()).alloc);
            alloc.deallocate(block.cast(), Layout::new::<Self>());
        }
    }

    unsafe fn value_address(header: NonNull<BlockHeader>) -> NonNull<u8> {
        let block = header.cast::<Self>().as_ptr();
        // SAFETY: a field of a live, non-null block is non-null.
        unsafe { NonNull::new_unchecked(addr_of_mut!((*block).value).cast::<u8>()) }
    }
}
