//! The `Shared<T>` and `Weak<T>` handles.
//!
//! Both handles refer to a type-erased control block (see `block`). A
//! `Shared` counts towards the block's share count and keeps the value
//! alive; a `Weak` counts towards the watch count and only keeps the block
//! storage around so it can tell whether the value still exists.

use std::any::Any;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;

use crate::alloc::{AllocError, BlockAlloc, Global};
use crate::block::{AdoptingBlock, BlockHeader, BlockKind, CombinedBlock};
use crate::deleter::{DefaultDelete, Deleter};
use crate::error::TryNewError;
use crate::managed::{Anchor, Managed};

/// A control block together with the address of the value it manages.
///
/// The value pointer is resolved once, when the first handle is created, and
/// carries the pointer metadata needed for unsized targets (`dyn Trait`).
pub(crate) struct Link<T: ?Sized> {
    pub(crate) block: NonNull<BlockHeader>,
    pub(crate) value: NonNull<T>,
    /// `value` may point outside the block's value (see [`Shared::map`]).
    pub(crate) foreign: bool,
}

impl<T: ?Sized> Clone for Link<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Link<T> {}

// ============================================================================
// Shared<T> - the owning handle
// ============================================================================

/// A reference-counted owning handle to a value of type `T`.
///
/// Cloning a `Shared` adds an owner; the value is destroyed as soon as the
/// last owner is dropped. [`Weak`] handles observe the same value without
/// keeping it alive.
///
/// A `Shared` can also be *empty*, owning nothing. Empty handles come from
/// [`Shared::empty`], [`Default`], [`Shared::take`], [`Shared::reset`] and
/// [`Weak::lock`] on an expired observer. Dereferencing an empty handle,
/// formatting it with `Display`, or asking it for its
/// [`use_count`](Shared::use_count) panics. Comparisons, hashing and `Debug`
/// accept empty handles.
///
/// Like `Rc<T>`, most operations are associated functions (`Shared::use_count(&x)`)
/// so they never shadow methods of `T`.
///
/// # Thread Safety
///
/// Counting is not atomic. `Shared<T>` is neither `Send` nor `Sync`:
///
/// ```compile_fail
/// use rudo_rc::Shared;
///
/// fn assert_send<T: Send>(_: T) {}
/// assert_send(Shared::new(1));
/// ```
///
/// # Examples
///
/// ```
/// use rudo_rc::Shared;
///
/// let a = Shared::new(String::from("hello"));
/// let b = Shared::clone(&a);
/// assert_eq!(Shared::use_count(&a), 2);
/// assert!(Shared::ptr_eq(&a, &b));
/// assert_eq!(b.len(), 5);
/// ```
pub struct Shared<T: ?Sized> {
    link: Option<Link<T>>,
    /// `Shared` owns a `T`.
    _marker: PhantomData<T>,
}

impl<T: ?Sized> Shared<T> {
    /// A handle that owns nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            link: None,
            _marker: PhantomData,
        }
    }

    /// Take over one share of `link`'s block without counting it again.
    const fn from_link(link: Link<T>) -> Self {
        Self {
            link: Some(link),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the handle owns nothing.
    #[must_use]
    pub const fn is_empty(this: &Self) -> bool {
        this.link.is_none()
    }

    /// Number of `Shared` handles owning this value, including `this`.
    ///
    /// # Panics
    ///
    /// Panics if `this` is empty.
    #[must_use]
    #[track_caller]
    pub fn use_count(this: &Self) -> usize {
        let link = this.expect_link("use_count");
        // SAFETY: a non-empty Shared holds a share, so the block is live.
        unsafe { BlockHeader::share_count(link.block) }
    }

    /// Number of `Weak` handles observing this value.
    ///
    /// A cached self-reference (see [`SelfRef`](crate::SelfRef)) counts as one.
    ///
    /// # Panics
    ///
    /// Panics if `this` is empty.
    #[must_use]
    #[track_caller]
    pub fn watch_count(this: &Self) -> usize {
        let link = this.expect_link("watch_count");
        // SAFETY: a non-empty Shared holds a share, so the block is live.
        unsafe { BlockHeader::watch_count(link.block) }
    }

    /// The construction strategy behind this handle, or `None` if it is empty.
    #[must_use]
    pub fn kind(this: &Self) -> Option<BlockKind> {
        // SAFETY: a non-empty Shared holds a share, so the block is live.
        this.link
            .map(|link| unsafe { BlockHeader::kind(link.block) })
    }

    /// Borrow the value, or `None` if the handle is empty.
    #[must_use]
    pub fn get(this: &Self) -> Option<&T> {
        // SAFETY: the value lives as long as this handle holds its share.
        this.link.map(|link| unsafe { &*link.value.as_ptr() })
    }

    /// Mutably borrow the value if `this` is its only handle of either kind.
    ///
    /// Also `None` for a handle produced by [`Shared::map`] whose target
    /// lies outside the managed value, since the block does not own it.
    #[must_use]
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        let link = this.link.filter(|link| !link.foreign)?;
        // SAFETY: the block is live while we hold a share.
        let unique = unsafe {
            BlockHeader::share_count(link.block) == 1 && BlockHeader::watch_count(link.block) == 0
        };
        // SAFETY: no other handle can reach the value.
        unique.then(|| unsafe { &mut *link.value.as_ptr() })
    }

    /// Create a [`Weak`] observer of this value.
    ///
    /// Downgrading an empty handle yields an empty `Weak`.
    #[must_use]
    pub fn downgrade(this: &Self) -> Weak<T> {
        match this.link {
            // SAFETY: the block is live while we hold a share.
            Some(link) => unsafe { Weak::observe(link) },
            None => Weak::new(),
        }
    }

    /// Returns `true` if both handles share one control block, or are both empty.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        match (this.link, other.link) {
            (Some(a), Some(b)) => a.block == b.block,
            (None, None) => true,
            _ => false,
        }
    }

    /// Give up ownership; `this` becomes empty.
    ///
    /// This goes through the same teardown path as dropping the handle.
    pub fn reset(this: &mut Self) {
        drop(Self::take(this));
    }

    /// Move the ownership out of `this`, leaving it empty.
    ///
    /// No count changes and nothing is allocated.
    #[must_use]
    pub fn take(this: &mut Self) -> Self {
        std::mem::take(this)
    }

    /// Exchange the ownership of two handles.
    pub fn swap(this: &mut Self, other: &mut Self) {
        std::mem::swap(this, other);
    }

    /// Convert the handle into a handle to part or another view of the value,
    /// typically a trait object or a field.
    ///
    /// The new handle takes over this handle's share of the same control
    /// block: nothing is allocated and no count changes. For a converting
    /// copy, map a clone. Mapping an empty handle yields an empty handle
    /// without calling `f`.
    ///
    /// `f` may return a reference to anything it can reach, not only to part
    /// of the value. Such a handle still keeps the block alive but never
    /// grants [`Shared::get_mut`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::fmt::Display;
    /// use rudo_rc::Shared;
    ///
    /// let number = Shared::new(42);
    /// let shown: Shared<dyn Display> = Shared::map(Shared::clone(&number), |n| n as &dyn Display);
    /// assert_eq!(shown.to_string(), "42");
    /// assert_eq!(Shared::use_count(&number), 2);
    /// ```
    pub fn map<U: ?Sized, F>(this: Self, f: F) -> Shared<U>
    where
        F: FnOnce(&T) -> &U,
    {
        let Some(link) = this.link else {
            return Shared::empty();
        };
        let source = &*this;
        let target = f(source);
        let foreign = link.foreign || !within(target, source);
        let value = NonNull::from(target);
        std::mem::forget(this);
        Shared::from_link(Link {
            block: link.block,
            value,
            foreign,
        })
    }

    #[track_caller]
    fn expect_link(&self, op: &str) -> Link<T> {
        match self.link {
            Some(link) => link,
            None => panic!("`Shared::{op}` called on an empty handle"),
        }
    }
}

impl<T: ?Sized + Managed> Shared<T> {
    /// Adopt a boxed value. The box is released by dropping it when the last
    /// owner goes away.
    ///
    /// Aborts through [`std::alloc::handle_alloc_error`] if the control block
    /// cannot be allocated.
    #[must_use]
    pub fn from_box(value: Box<T>) -> Self {
        Self::from_box_in(value, Global)
    }

    /// Adopt a boxed value, allocating the control block with `alloc`.
    #[must_use]
    pub fn from_box_in<A: BlockAlloc>(value: Box<T>, alloc: A) -> Self {
        Self::try_from_box_in(value, alloc)
            .unwrap_or_else(|err| std::alloc::handle_alloc_error(err.layout()))
    }

    /// Fallible form of [`Shared::from_box_in`].
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the control block cannot be allocated. The
    /// boxed value has been dropped by then.
    pub fn try_from_box_in<A: BlockAlloc>(value: Box<T>, alloc: A) -> Result<Self, AllocError> {
        let ptr = NonNull::from(Box::leak(value));
        // SAFETY: the pointer came from a Box, which DefaultDelete releases.
        unsafe { Self::try_from_raw_in(ptr, DefaultDelete, alloc) }
    }

    /// Adopt a raw pointer with a custom cleanup action.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a valid `T` that stays valid until `deleter` is
    /// invoked on it, and nothing else may free or mutate it meanwhile.
    #[must_use]
    pub unsafe fn from_raw_with<D: Deleter<T>>(ptr: NonNull<T>, deleter: D) -> Self {
        // SAFETY: forwarded from the caller.
        unsafe { Self::from_raw_in(ptr, deleter, Global) }
    }

    /// Adopt a raw pointer with a custom cleanup action and block allocator.
    ///
    /// # Safety
    ///
    /// Same as [`Shared::from_raw_with`].
    #[must_use]
    pub unsafe fn from_raw_in<D: Deleter<T>, A: BlockAlloc>(
        ptr: NonNull<T>,
        deleter: D,
        alloc: A,
    ) -> Self {
        // SAFETY: forwarded from the caller.
        unsafe { Self::try_from_raw_in(ptr, deleter, alloc) }
            .unwrap_or_else(|err| std::alloc::handle_alloc_error(err.layout()))
    }

    /// Fallible form of [`Shared::from_raw_in`].
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the control block cannot be allocated. The
    /// value has been passed to `deleter` by then.
    ///
    /// # Safety
    ///
    /// Same as [`Shared::from_raw_with`].
    pub unsafe fn try_from_raw_in<D: Deleter<T>, A: BlockAlloc>(
        ptr: NonNull<T>,
        deleter: D,
        alloc: A,
    ) -> Result<Self, AllocError> {
        // SAFETY: forwarded from the caller.
        let block = unsafe { AdoptingBlock::allocate(ptr, deleter, alloc)? };
        // SAFETY: the block is fresh with share == 1 and manages `ptr`.
        Ok(unsafe { Self::enlist(block, ptr) })
    }

    /// Adopt a boxed value, replacing whatever `this` owned before.
    ///
    /// The previous ownership is released first, exactly as by [`Shared::reset`].
    pub fn reset_to(this: &mut Self, value: Box<T>) {
        Self::reset(this);
        *this = Self::from_box(value);
    }

    /// Wrap a freshly created block whose single share is handed to us, and
    /// let the value bind its self-reference.
    ///
    /// # Safety
    ///
    /// `block` must be a live block with `share == 1` that nobody else
    /// accounts for, managing the value at `value`.
    unsafe fn enlist(block: NonNull<BlockHeader>, value: NonNull<T>) -> Self {
        let this = Self::from_link(Link {
            block,
            value,
            foreign: false,
        });
        // SAFETY: the value is alive while `this` holds the share.
        let target = unsafe { &*value.as_ptr() };
        target.bind_self_ref(Anchor::new(block, value.cast(), std::mem::size_of_val(target)));
        this
    }
}

impl<T: Managed> Shared<T> {
    /// Allocate a combined control block holding `value`.
    ///
    /// Aborts through [`std::alloc::handle_alloc_error`] if the block cannot
    /// be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use rudo_rc::{BlockKind, Shared};
    ///
    /// let x = Shared::new(42);
    /// assert_eq!(*x, 42);
    /// assert_eq!(Shared::kind(&x), Some(BlockKind::Combined));
    /// ```
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::new_in(value, Global)
    }

    /// Allocate a combined control block holding `value` with `alloc`.
    #[must_use]
    pub fn new_in<A: BlockAlloc>(value: T, alloc: A) -> Self {
        Self::try_new_in(value, alloc)
            .unwrap_or_else(|err| std::alloc::handle_alloc_error(err.layout()))
    }

    /// Fallible form of [`Shared::new_in`].
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the block cannot be allocated.
    pub fn try_new_in<A: BlockAlloc>(value: T, alloc: A) -> Result<Self, AllocError> {
        match Self::try_new_with_in(|| Ok::<T, std::convert::Infallible>(value), alloc) {
            Ok(this) => Ok(this),
            Err(TryNewError::Alloc(err)) => Err(err),
            Err(TryNewError::Init(never)) => match never {},
        }
    }

    /// Allocate a combined control block and construct the value in it with `init`.
    #[must_use]
    pub fn new_with<F: FnOnce() -> T>(init: F) -> Self {
        match Self::try_new_with_in(|| Ok::<T, std::convert::Infallible>(init()), Global) {
            Ok(this) => this,
            Err(TryNewError::Alloc(err)) => std::alloc::handle_alloc_error(err.layout()),
            Err(TryNewError::Init(never)) => match never {},
        }
    }

    /// Allocate a combined control block and construct the value with a
    /// fallible initializer.
    ///
    /// # Errors
    ///
    /// See [`Shared::try_new_with_in`].
    pub fn try_new_with<E, F>(init: F) -> Result<Self, TryNewError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        Self::try_new_with_in(init, Global)
    }

    /// Allocate a combined control block with `alloc` and construct the value
    /// with a fallible initializer.
    ///
    /// Construction is all-or-nothing: when `init` fails (or panics) the block
    /// storage is handed back to `alloc` before the failure propagates.
    ///
    /// # Errors
    ///
    /// Returns [`TryNewError::Alloc`] if the storage cannot be allocated (then
    /// `init` never runs), or [`TryNewError::Init`] with the initializer's error.
    pub fn try_new_with_in<E, F, A>(init: F, alloc: A) -> Result<Self, TryNewError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        A: BlockAlloc,
    {
        let block = CombinedBlock::try_allocate_with(alloc, init)?;
        // SAFETY: the block is fresh with share == 1.
        Ok(unsafe { Self::from_block(block) })
    }

    /// Wrap a freshly created type-erased block, resolving the value through
    /// the block itself.
    ///
    /// # Safety
    ///
    /// `block` must be a live block with `share == 1` that nobody else
    /// accounts for, managing a `T`.
    pub(crate) unsafe fn from_block(block: NonNull<BlockHeader>) -> Self {
        // SAFETY: the value of a fresh block is alive.
        let value = unsafe { BlockHeader::value_address(block) }.cast::<T>();
        // SAFETY: forwarded from the caller.
        unsafe { Self::enlist(block, value) }
    }
}

impl<T: Sized> Shared<T> {
    /// Raw pointer to the value, or null if the handle is empty.
    #[must_use]
    pub fn as_ptr(this: &Self) -> *const T {
        this.link
            .map_or(std::ptr::null(), |link| link.value.as_ptr().cast_const())
    }
}

impl Shared<dyn Any> {
    /// Recover the concrete type of a type-erased handle.
    ///
    /// # Errors
    ///
    /// Gives the handle back unchanged if it is empty or the value is not a `T`.
    pub fn downcast<T: Any>(self) -> Result<Shared<T>, Self> {
        match self.link {
            Some(link) if (*self).is::<T>() => {
                std::mem::forget(self);
                Ok(Shared::from_link(Link {
                    block: link.block,
                    value: link.value.cast::<T>(),
                    foreign: link.foreign,
                }))
            }
            _ => Err(self),
        }
    }
}

/// Returns `true` if `part` occupies a subrange of `whole`'s bytes.
fn within<U: ?Sized, T: ?Sized>(part: &U, whole: &T) -> bool {
    let start = std::ptr::from_ref(whole).cast::<u8>().addr();
    let addr = std::ptr::from_ref(part).cast::<u8>().addr();
    addr >= start && addr - start + std::mem::size_of_val(part) <= std::mem::size_of_val(whole)
}

impl<T: ?Sized> Deref for Shared<T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &Self::Target {
        let link = self.expect_link("deref");
        // SAFETY: the value lives as long as this handle holds its share.
        unsafe { &*link.value.as_ptr() }
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        match self.link {
            Some(link) => {
                // SAFETY: the block is live while we hold a share.
                unsafe { BlockHeader::increase_share(link.block) };
                Self::from_link(link)
            }
            None => Self::empty(),
        }
    }
}

impl<T: ?Sized> Drop for Shared<T> {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            // SAFETY: we give up the share this handle owned.
            unsafe { BlockHeader::decrease_share(link.block) };
        }
    }
}

impl<T: ?Sized> Default for Shared<T> {
    /// An empty handle.
    fn default() -> Self {
        Self::empty()
    }
}

// Comparisons and hashing go through the value. Two empty handles are
// equal and an empty handle orders before any value.

impl<T: ?Sized + PartialEq> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::get(self) == Self::get(other)
    }
}

impl<T: ?Sized + Eq> Eq for Shared<T> {}

impl<T: ?Sized + PartialOrd> PartialOrd for Shared<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Self::get(self).partial_cmp(&Self::get(other))
    }
}

impl<T: ?Sized + Ord> Ord for Shared<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        Self::get(self).cmp(&Self::get(other))
    }
}

impl<T: ?Sized + std::hash::Hash> std::hash::Hash for Shared<T> {
    /// Hashes like the value itself, so lookups through `Borrow<T>` work. An
    /// empty handle hashes nothing.
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if let Some(value) = Self::get(self) {
            value.hash(state);
        }
    }
}

impl<T: ?Sized + std::fmt::Debug> std::fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match Self::get(self) {
            Some(value) => f.debug_tuple("Shared").field(&value).finish(),
            None => write!(f, "Shared(<empty>)"),
        }
    }
}

impl<T: ?Sized + std::fmt::Display> std::fmt::Display for Shared<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&**self, f)
    }
}

impl<T: ?Sized> std::fmt::Pointer for Shared<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addr = self
            .link
            .map_or(std::ptr::null(), |link| link.value.as_ptr().cast::<u8>().cast_const());
        std::fmt::Pointer::fmt(&addr, f)
    }
}

impl<T: Managed> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ?Sized + Managed> From<Box<T>> for Shared<T> {
    fn from(value: Box<T>) -> Self {
        Self::from_box(value)
    }
}

impl<T: ?Sized> AsRef<T> for Shared<T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T: ?Sized> std::borrow::Borrow<T> for Shared<T> {
    fn borrow(&self) -> &T {
        self
    }
}

// ============================================================================
// Weak<T> - the observing handle
// ============================================================================

/// A non-owning observer of a value managed by [`Shared`].
///
/// A `Weak` never keeps the value alive. It keeps the control block around,
/// so it can still tell that the value is gone ([`expired`](Weak::expired))
/// and can become an owner again with [`lock`](Weak::lock) while it is not.
///
/// # Examples
///
/// ```
/// use rudo_rc::Shared;
///
/// let strong = Shared::new(5);
/// let weak = Shared::downgrade(&strong);
/// assert_eq!(*weak.lock(), 5);
///
/// drop(strong);
/// assert!(weak.expired());
/// assert!(Shared::is_empty(&weak.lock()));
/// ```
pub struct Weak<T: ?Sized> {
    link: Option<Link<T>>,
}

impl<T: ?Sized> Weak<T> {
    /// An observer of nothing; it is always expired.
    #[must_use]
    pub const fn new() -> Self {
        Self { link: None }
    }

    /// Start observing `link`'s block.
    ///
    /// # Safety
    ///
    /// The block must not be released.
    pub(crate) unsafe fn observe(link: Link<T>) -> Self {
        // SAFETY: forwarded from the caller.
        unsafe { BlockHeader::increase_watch(link.block) };
        Self { link: Some(link) }
    }

    /// Returns `true` if this observer was created empty or moved out of.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.link.is_none()
    }

    /// Returns `true` if the value is gone (or there never was one).
    #[must_use]
    pub fn expired(&self) -> bool {
        self.use_count() == 0
    }

    /// Become an owner of the value.
    ///
    /// Returns an empty `Shared` if the value has already been destroyed; this
    /// is the regular "value is gone" signal, not an error.
    #[must_use]
    pub fn lock(&self) -> Shared<T> {
        match self.link {
            Some(link) if !self.expired() => {
                // SAFETY: the watch we hold keeps the block live, and the value
                // is alive because share > 0.
                unsafe { BlockHeader::increase_share(link.block) };
                Shared::from_link(link)
            }
            _ => Shared::empty(),
        }
    }

    /// [`lock`](Weak::lock) as an `Option`.
    #[must_use]
    pub fn upgrade(&self) -> Option<Shared<T>> {
        let shared = self.lock();
        (!Shared::is_empty(&shared)).then_some(shared)
    }

    /// Number of `Shared` handles owning the value; 0 once it is gone.
    #[must_use]
    pub fn use_count(&self) -> usize {
        // SAFETY: the watch we hold keeps the block live.
        self.link
            .map_or(0, |link| unsafe { BlockHeader::share_count(link.block) })
    }

    /// Number of `Weak` handles observing the block, including this one.
    #[must_use]
    pub fn watch_count(&self) -> usize {
        // SAFETY: the watch we hold keeps the block live.
        self.link
            .map_or(0, |link| unsafe { BlockHeader::watch_count(link.block) })
    }

    /// Returns `true` if both observe the same block, or are both empty.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self.link, other.link) {
            (Some(a), Some(b)) => a.block == b.block,
            (None, None) => true,
            _ => false,
        }
    }

    /// Move the observation out of `self`, leaving it empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl<T: ?Sized> Clone for Weak<T> {
    fn clone(&self) -> Self {
        match self.link {
            // SAFETY: the watch we hold keeps the block live.
            Some(link) => unsafe { Self::observe(link) },
            None => Self::new(),
        }
    }
}

impl<T: ?Sized> Drop for Weak<T> {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            // SAFETY: we give up the watch this handle owned.
            unsafe { BlockHeader::decrease_watch(link.block) };
        }
    }
}

impl<T: ?Sized> Default for Weak<T> {
    /// An empty observer.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> From<&Shared<T>> for Weak<T> {
    fn from(shared: &Shared<T>) -> Self {
        Shared::downgrade(shared)
    }
}

impl<T: ?Sized> std::fmt::Debug for Weak<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(Weak)")
    }
}
