//! Shared-ownership smart pointers with observers and self-reference.
//!
//! `rudo-rc` provides [`Shared<T>`], a reference-counted owning handle, and
//! [`Weak<T>`], an observer that can tell whether the value still exists and
//! can become an owner again while it does. Both are backed by a control block
//! that keeps two counters:
//!
//! - the **share** count, the number of owners. The value is destroyed the
//!   moment it drops to zero.
//! - the **watch** count, the number of observers. The block storage is
//!   released once both counts are zero.
//!
//! # Features
//!
//! - **Two block layouts**: *combined* blocks ([`Shared::new`],
//!   [`make_shared`]) hold the value inline in one allocation; *adopting*
//!   blocks ([`Shared::from_box`], [`Shared::from_raw_with`]) take over an
//!   existing allocation together with a [`Deleter`].
//! - **Pluggable block storage** through [`BlockAlloc`], with the std global
//!   allocator ([`Global`]) and page mappings ([`PageAlloc`]) built in.
//! - **Self-reference**: a value with a [`SelfRef`] field can produce new
//!   owners of itself with [`SharedFromThis::shared_from_this`].
//! - **Projections and casts** through [`Shared::map`] and
//!   [`Shared::downcast`], sharing the original control block.
//!
//! # Quick Start
//!
//! ```
//! use rudo_rc::Shared;
//!
//! let a = Shared::new(42);
//! let b = Shared::clone(&a);
//! assert_eq!(Shared::use_count(&a), 2);
//!
//! let observer = Shared::downgrade(&a);
//! drop(a);
//! drop(b);
//! assert!(observer.expired());
//! ```
//!
//! # Self-Reference
//!
//! ```
//! use rudo_rc::{Managed, SelfRef, Shared, SharedFromThis};
//!
//! #[derive(Managed)]
//! struct Widget {
//!     name: String,
//!     this: SelfRef<Self>,
//! }
//!
//! let widget = Shared::new(Widget { name: "root".into(), this: SelfRef::new() });
//! let handle = widget.shared_from_this().unwrap();
//! assert_eq!(Shared::use_count(&widget), 2);
//! assert_eq!(handle.name, "root");
//! ```
//!
//! # Thread Safety
//!
//! `Shared<T>` and `Weak<T>` are `!Send` and `!Sync`. The counters are plain
//! cells and every handle stays on the thread that created it.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod alloc;
mod block;
mod deleter;
mod error;
mod factory;
mod managed;
mod ptr;
mod self_ref;
mod stats;
mod tracing;

// Re-export public API
pub use alloc::{AllocError, BlockAlloc, Global, PageAlloc};
pub use block::BlockKind;
pub use deleter::{DefaultDelete, Deleter};
pub use error::{NotSharedError, TryNewError};
pub use factory::{
    adopt, adopt_in, allocate_shared, make_shared, make_shared_with, try_allocate_shared_with,
};
pub use managed::{Anchor, Managed};
pub use ptr::{Shared, Weak};
pub use self_ref::{SelfRef, SharedFromThis};
pub use stats::{stats, RcStats};

// Re-export derive macro when feature is enabled
#[cfg(feature = "derive")]
pub use rudo_rc_derive::Managed;
