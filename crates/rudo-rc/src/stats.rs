//! Control block lifecycle statistics.
//!
//! `Shared` and `Weak` never leave the thread that created them, so the
//! counters are kept per thread and need no synchronization.

use std::cell::Cell;

use crate::block::BlockKind;

/// Lifecycle counters for control blocks created on the current thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RcStats {
    /// Control blocks successfully constructed.
    pub blocks_created: usize,
    /// Of those, blocks that adopted a separately allocated value.
    pub adopting_blocks: usize,
    /// Of those, blocks holding their value inline.
    pub combined_blocks: usize,
    /// Managed values destroyed (share count reached zero).
    pub values_destroyed: usize,
    /// Control blocks whose storage was released (both counts reached zero).
    pub blocks_released: usize,
}

impl RcStats {
    /// All counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks_created: 0,
            adopting_blocks: 0,
            combined_blocks: 0,
            values_destroyed: 0,
            blocks_released: 0,
        }
    }

    /// Blocks whose storage has not been released yet.
    #[must_use]
    pub const fn live_blocks(&self) -> usize {
        self.blocks_created.saturating_sub(self.blocks_released)
    }

    /// Managed values that have not been destroyed yet.
    #[must_use]
    pub const fn live_values(&self) -> usize {
        self.blocks_created.saturating_sub(self.values_destroyed)
    }

    /// Activity recorded after `baseline` was taken.
    #[must_use]
    pub const fn since(&self, baseline: &Self) -> Self {
        Self {
            blocks_created: self.blocks_created.saturating_sub(baseline.blocks_created),
            adopting_blocks: self.adopting_blocks.saturating_sub(baseline.adopting_blocks),
            combined_blocks: self.combined_blocks.saturating_sub(baseline.combined_blocks),
            values_destroyed: self.values_destroyed.saturating_sub(baseline.values_destroyed),
            blocks_released: self.blocks_released.saturating_sub(baseline.blocks_released),
        }
    }
}

thread_local! {
    static STATS: Cell<RcStats> = const { Cell::new(RcStats::new()) };
}

/// Snapshot of the current thread's control block statistics.
///
/// # Examples
///
/// ```
/// use rudo_rc::{stats, Shared};
///
/// let before = stats();
/// let shared = Shared::new(7);
/// drop(shared);
///
/// let delta = stats().since(&before);
/// assert_eq!(delta.blocks_created, 1);
/// assert_eq!(delta.blocks_released, 1);
/// ```
#[must_use]
pub fn stats() -> RcStats {
    STATS.with(Cell::get)
}

fn update(f: impl FnOnce(&mut RcStats)) {
    // Blocks dropped during thread-local teardown are simply not counted.
    let _ = STATS.try_with(|cell| {
        let mut stats = cell.get();
        f(&mut stats);
        cell.set(stats);
    });
}

pub(crate) fn record_block_created(kind: BlockKind) {
    update(|stats| {
        stats.blocks_created += 1;
        match kind {
            BlockKind::Adopting => stats.adopting_blocks += 1,
            BlockKind::Combined => stats.combined_blocks += 1,
        }
    });
}

pub(crate) fn record_value_destroyed() {
    update(|stats| stats.values_destroyed += 1);
}

pub(crate) fn record_block_released() {
    update(|stats| stats.blocks_released += 1);
}
