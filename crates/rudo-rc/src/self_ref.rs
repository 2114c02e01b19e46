//! Self-reference: letting a value hand out owners of itself.
//!
//! A type that wants `shared_from_this` embeds a [`SelfRef<Self>`] field.
//! When a `Shared` constructor takes ownership of the value, the field is
//! bound to the new control block through [`Managed::bind_self_ref`] and from
//! then on caches an observer of the value. Only that cached observer is
//! stored, so the value never keeps itself alive.

use std::cell::OnceCell;
use std::fmt;
use std::ptr::NonNull;

use crate::error::NotSharedError;
use crate::managed::{Anchor, Managed};
use crate::ptr::Link;
use crate::{Shared, Weak};

/// Cached observer of the value that contains this field.
///
/// A fresh `SelfRef` is unbound. Binding happens at most once, when the
/// containing value is first handed to a control block.
///
/// Cloning a `SelfRef` yields an unbound one: a copy of the value is a
/// different value and has no owner yet.
pub struct SelfRef<T: ?Sized> {
    slot: OnceCell<Weak<T>>,
}

impl<T: ?Sized> SelfRef<T> {
    /// An unbound self-reference.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// Bind to the control block `anchor` stands for. `this` must be the value
    /// the block owns, normally the value containing the field.
    ///
    /// Binding an already bound `SelfRef` does nothing.
    ///
    /// # Panics
    ///
    /// Panics if `this` is not the owned value itself.
    #[track_caller]
    pub fn bind(&self, anchor: Anchor<'_>, this: &T) {
        assert!(
            anchor.is_value(this),
            "SelfRef must be bound to the value its control block owns"
        );
        // SAFETY: the owned value lives exactly as long as the block's value.
        unsafe { self.bind_unchecked(anchor, this) };
    }

    /// Bind to the control block `anchor` stands for, resolving to `this`, a
    /// part of the owned value such as an embedded field.
    ///
    /// Binding an already bound `SelfRef` does nothing.
    ///
    /// # Safety
    ///
    /// `this` must stay alive and in place for as long as the owned value does.
    /// A part that can be replaced or dropped through a shared reference (the
    /// contents of a `RefCell`, `Cell` or `Option` behind one) does not qualify.
    ///
    /// # Panics
    ///
    /// Panics if `this` does not lie inside the owned value.
    #[track_caller]
    pub unsafe fn bind_part(&self, anchor: Anchor<'_>, this: &T) {
        assert!(
            anchor.contains(this),
            "SelfRef bound to a value outside its control block"
        );
        // SAFETY: forwarded from the caller.
        unsafe { self.bind_unchecked(anchor, this) };
    }

    /// # Safety
    ///
    /// `this` lies inside the anchored value and lives as long as it does.
    unsafe fn bind_unchecked(&self, anchor: Anchor<'_>, this: &T) {
        if self.slot.get().is_some() {
            return;
        }
        let link = Link {
            block: anchor.block(),
            value: NonNull::from(this),
            foreign: false,
        };
        // SAFETY: the anchor only exists while the block's first owner does,
        // and the caller guarantees `this` lives as long as the block's value.
        let weak = unsafe { Weak::observe(link) };
        let _ = self.slot.set(weak);
    }

    /// Returns `true` once the containing value has been handed to a block.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }

    /// A new owner of the containing value.
    ///
    /// # Errors
    ///
    /// Returns [`NotSharedError`] if the value was never owned by a `Shared`
    /// or is being destroyed.
    pub fn shared(&self) -> Result<Shared<T>, NotSharedError> {
        self.slot
            .get()
            .and_then(Weak::upgrade)
            .ok_or(NotSharedError)
    }

    /// A new observer of the containing value. Empty if unbound.
    #[must_use]
    pub fn weak(&self) -> Weak<T> {
        self.slot.get().cloned().unwrap_or_default()
    }
}

impl<T: ?Sized> Default for SelfRef<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for SelfRef<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for SelfRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelfRef")
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Types that can produce owners of themselves.
///
/// `#[derive(Managed)]` implements this for any struct with a [`SelfRef`]
/// field.
pub trait SharedFromThis: Managed {
    /// The embedded self-reference.
    fn self_ref(&self) -> &SelfRef<Self>;

    /// A new owner sharing ownership with the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`NotSharedError`] if no `Shared` owns this value, e.g. it lives
    /// on the stack or is being destroyed.
    fn shared_from_this(&self) -> Result<Shared<Self>, NotSharedError> {
        self.self_ref().shared()
    }

    /// A new observer of this value. Empty if no `Shared` ever owned it.
    fn weak_from_this(&self) -> Weak<Self> {
        self.self_ref().weak()
    }
}
