//! Free-function factories.
//!
//! These mirror the `Shared` constructors and pick the block layout by name:
//! `make_shared`/`allocate_shared` build a combined block (one allocation),
//! `adopt`/`adopt_in` build an adopting block around an existing `Box`.

use crate::alloc::BlockAlloc;
use crate::error::TryNewError;
use crate::managed::Managed;
use crate::Shared;

/// Create `value` in a combined block from the global allocator.
///
/// ```
/// use rudo_rc::{make_shared, BlockKind, Shared};
///
/// let answer = make_shared(42);
/// assert_eq!(*answer, 42);
/// assert_eq!(Shared::kind(&answer), Some(BlockKind::Combined));
/// ```
#[must_use]
pub fn make_shared<T: Managed>(value: T) -> Shared<T> {
    Shared::new(value)
}

/// Create the value returned by `init` directly in a combined block.
#[must_use]
pub fn make_shared_with<T: Managed, F: FnOnce() -> T>(init: F) -> Shared<T> {
    Shared::new_with(init)
}

/// Create `value` in a combined block obtained from `alloc`.
#[must_use]
pub fn allocate_shared<T: Managed, A: BlockAlloc>(alloc: A, value: T) -> Shared<T> {
    Shared::new_in(value, alloc)
}

/// Create a value in a combined block obtained from `alloc`, with a fallible
/// initializer.
///
/// # Errors
///
/// See [`Shared::try_new_with_in`].
pub fn try_allocate_shared_with<T, E, F, A>(alloc: A, init: F) -> Result<Shared<T>, TryNewError<E>>
where
    T: Managed,
    F: FnOnce() -> Result<T, E>,
    A: BlockAlloc,
{
    Shared::try_new_with_in(init, alloc)
}

/// Adopt a boxed value.
///
/// ```
/// use rudo_rc::{adopt, BlockKind, Shared};
///
/// let text: Shared<str> = adopt(Box::from("adopted"));
/// assert_eq!(&*text, "adopted");
/// assert_eq!(Shared::kind(&text), Some(BlockKind::Adopting));
/// ```
#[must_use]
pub fn adopt<T: ?Sized + Managed>(value: Box<T>) -> Shared<T> {
    Shared::from_box(value)
}

/// Adopt a boxed value, allocating the control block from `alloc`.
#[must_use]
pub fn adopt_in<T: ?Sized + Managed, A: BlockAlloc>(value: Box<T>, alloc: A) -> Shared<T> {
    Shared::from_box_in(value, alloc)
}
