//! The `Managed` trait: the hook every `Shared` constructor calls on a newly
//! wrapped value.
//!
//! Most types have nothing to do when they become shared and use the empty
//! default. Types that embed a [`SelfRef`](crate::SelfRef) bind it to their
//! control block from [`Managed::bind_self_ref`]; `#[derive(Managed)]`
//! generates that.

use std::cell::{Cell, OnceCell, RefCell};
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, LinkedList, VecDeque};
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::{Arc, Mutex, RwLock};

use crate::block::BlockHeader;
use crate::{Shared, Weak};

// ============================================================================
// Core Traits
// ============================================================================

/// A type that can be owned by [`Shared`].
///
/// Every constructor that hands a value to a new control block calls
/// `bind_self_ref` exactly once, right after the first owner exists. The
/// default does nothing.
///
/// Prefer `#[derive(Managed)]` over a manual implementation.
///
/// # Examples
///
/// ```
/// use rudo_rc::{Managed, SelfRef, Shared, SharedFromThis};
///
/// #[derive(Managed)]
/// struct Session {
///     id: u32,
///     this: SelfRef<Self>,
/// }
///
/// let session = Shared::new(Session { id: 1, this: SelfRef::new() });
/// let again = session.shared_from_this().unwrap();
/// assert!(Shared::ptr_eq(&session, &again));
/// assert_eq!(again.id, 1);
/// ```
pub trait Managed {
    /// Called once when the value becomes owned by a control block.
    #[inline]
    fn bind_self_ref(&self, anchor: Anchor<'_>) {
        let _ = anchor;
    }
}

/// The control block a value was just handed to.
///
/// Only constructors of [`Shared`] create anchors, and only for the duration
/// of the [`Managed::bind_self_ref`] call.
#[derive(Clone, Copy)]
pub struct Anchor<'a> {
    block: NonNull<BlockHeader>,
    value: NonNull<u8>,
    size: usize,
    _marker: PhantomData<&'a BlockHeader>,
}

impl Anchor<'_> {
    pub(crate) const fn new(block: NonNull<BlockHeader>, value: NonNull<u8>, size: usize) -> Self {
        Self {
            block,
            value,
            size,
            _marker: PhantomData,
        }
    }

    pub(crate) const fn block(self) -> NonNull<BlockHeader> {
        self.block
    }

    /// Address of the value the block owns.
    #[must_use]
    pub const fn value_addr(self) -> *const u8 {
        self.value.as_ptr().cast_const()
    }

    /// Returns `true` if `value` is exactly the owned value: same address and
    /// same size.
    #[must_use]
    pub fn is_value<T: ?Sized>(self, value: &T) -> bool {
        std::ptr::from_ref(value).cast::<u8>().addr() == self.value.as_ptr().addr()
            && std::mem::size_of_val(value) == self.size
    }

    /// Returns `true` if `part` lies entirely inside the owned value, i.e. it
    /// is the value itself or one of its fields.
    #[must_use]
    pub fn contains<T: ?Sized>(self, part: &T) -> bool {
        let start = self.value.as_ptr().addr();
        let addr = std::ptr::from_ref(part).cast::<u8>().addr();
        let len = std::mem::size_of_val(part);
        addr >= start && addr - start + len <= self.size
    }
}

impl std::fmt::Debug for Anchor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anchor")
            .field("block", &self.block)
            .field("value", &self.value)
            .field("size", &self.size)
            .finish()
    }
}

// ============================================================================
// Managed implementations for primitive types
// ============================================================================

macro_rules! impl_managed {
    ($($t:ty),* $(,)?) => {
        $(
            impl Managed for $t {}
        )*
    };
}

impl_managed! {
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
    bool, char, (),
    String, str,
    std::time::Duration,
    std::time::Instant,
    std::time::SystemTime,
    std::path::Path,
    std::path::PathBuf,
    std::ffi::OsStr,
    std::ffi::OsString,
    std::ffi::CStr,
    std::ffi::CString,
    std::net::IpAddr,
    std::net::Ipv4Addr,
    std::net::Ipv6Addr,
    std::net::SocketAddr,
    std::num::NonZeroU32,
    std::num::NonZeroU64,
    std::num::NonZeroUsize,
    std::sync::atomic::AtomicBool,
    std::sync::atomic::AtomicUsize,
    std::sync::atomic::AtomicU64,
}

// Trait objects commonly produced by `Shared::from_box`.
impl_managed! {
    dyn std::any::Any,
    dyn std::fmt::Debug,
    dyn std::fmt::Display,
    dyn std::error::Error,
    dyn Fn(),
}

// ============================================================================
// Managed implementations for std container types
// ============================================================================

// A container is a distinct value from whatever it holds; only the outermost
// value is ever bound to the new block.
macro_rules! impl_managed_generic {
    ($([$($params:tt)*] $t:ty),* $(,)?) => {
        $(
            impl<$($params)*> Managed for $t {}
        )*
    };
}

impl_managed_generic! {
    [T: ?Sized] &T,
    [T: ?Sized] Box<T>,
    [T: ?Sized] Rc<T>,
    [T: ?Sized] Arc<T>,
    [T: ?Sized] Shared<T>,
    [T: ?Sized] Weak<T>,
    [T: ?Sized] PhantomData<T>,
    [T: ?Sized] RefCell<T>,
    [T: ?Sized] Mutex<T>,
    [T: ?Sized] RwLock<T>,
    [T] Cell<T>,
    [T] OnceCell<T>,
    [T] Vec<T>,
    [T] [T],
    [T, const N: usize] [T; N],
    [T] Option<T>,
    [T, E] Result<T, E>,
    [T] VecDeque<T>,
    [T] LinkedList<T>,
    [T] BinaryHeap<T>,
    [K, V, S] HashMap<K, V, S>,
    [T, S] HashSet<T, S>,
    [K, V] BTreeMap<K, V>,
    [T] BTreeSet<T>,
}

// ============================================================================
// Managed implementations for tuples
// ============================================================================

macro_rules! impl_managed_for_tuples {
    () => {};
    ($first:ident $(, $rest:ident)*) => {
        impl<$first $(, $rest)*> Managed for ($first, $($rest,)*) {}
        impl_managed_for_tuples!($($rest),*);
    };
}

impl_managed_for_tuples!(A, B, C, D, E, F, G, H, I, J, K, L);
