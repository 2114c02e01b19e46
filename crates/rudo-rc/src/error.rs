//! Error types returned by fallible construction and self-reference lookups.

use std::fmt;

use crate::alloc::AllocError;

/// `shared_from_this` was called on a value that no `Shared` currently owns.
///
/// This happens when the value was never wrapped (for example it lives on the
/// stack), or when it is asked for itself while it is being torn down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotSharedError;

impl fmt::Display for NotSharedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value is not owned by any `Shared` handle")
    }
}

impl std::error::Error for NotSharedError {}

/// Failure of a fallible combined-block construction.
///
/// Either way, no block storage is left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryNewError<E> {
    /// The block storage could not be allocated; the initializer never ran.
    Alloc(AllocError),
    /// The initializer returned an error after the storage was allocated.
    Init(E),
}

impl<E> TryNewError<E> {
    /// The initializer error, if that is what failed.
    pub fn into_init(self) -> Option<E> {
        match self {
            Self::Alloc(_) => None,
            Self::Init(err) => Some(err),
        }
    }
}

impl<E: fmt::Display> fmt::Display for TryNewError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc(err) => write!(f, "control block allocation failed: {err}"),
            Self::Init(err) => write!(f, "value initialization failed: {err}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TryNewError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Alloc(err) => Some(err),
            Self::Init(err) => Some(err),
        }
    }
}

impl<E> From<AllocError> for TryNewError<E> {
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}
