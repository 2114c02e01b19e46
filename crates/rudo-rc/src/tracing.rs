//! Structured lifecycle events.
//!
//! When the `tracing` feature is enabled, every control block transition is
//! reported as a `TRACE` level event. Without the feature the hooks compile
//! down to nothing.

#[cfg(feature = "tracing")]
pub mod internal {
    use crate::block::BlockKind;

    /// A control block was constructed.
    pub fn log_block_created(kind: BlockKind, addr: *const u8, size: usize) {
        tracing::trace!(kind = ?kind, addr = ?addr, size, "block_created");
    }

    /// The managed value of a block was destroyed.
    pub fn log_value_destroyed(kind: BlockKind, addr: *const u8) {
        tracing::trace!(kind = ?kind, addr = ?addr, "value_destroyed");
    }

    /// The storage of a block was released.
    pub fn log_block_released(kind: BlockKind, addr: *const u8) {
        tracing::trace!(kind = ?kind, addr = ?addr, "block_released");
    }
}

#[cfg(not(feature = "tracing"))]
pub mod internal {
    use crate::block::BlockKind;

    #[inline(always)]
    pub const fn log_block_created(_kind: BlockKind, _addr: *const u8, _size: usize) {}

    #[inline(always)]
    pub const fn log_value_destroyed(_kind: BlockKind, _addr: *const u8) {}

    #[inline(always)]
    pub const fn log_block_released(_kind: BlockKind, _addr: *const u8) {}
}
