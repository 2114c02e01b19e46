//! Tests for owning handles: counting, moves, reset and teardown.

mod common;

use common::{CountingAlloc, DropCounter};
use rudo_rc::{stats, BlockKind, PageAlloc, Shared};

// ============================================================================
// Counting
// ============================================================================

#[test]
fn test_new_and_deref() {
    let x = Shared::new(42);
    assert_eq!(*x, 42);
    assert_eq!(Shared::use_count(&x), 1);
    assert_eq!(Shared::watch_count(&x), 0);
    assert_eq!(Shared::kind(&x), Some(BlockKind::Combined));
}

#[test]
fn test_use_count_tracks_clones() {
    let a = Shared::new(String::from("abc"));
    let clones: Vec<_> = (0..5).map(|_| Shared::clone(&a)).collect();
    assert_eq!(Shared::use_count(&a), 6);
    for clone in &clones {
        assert!(Shared::ptr_eq(&a, clone));
        assert_eq!(Shared::use_count(clone), 6);
    }
    drop(clones);
    assert_eq!(Shared::use_count(&a), 1);
}

#[test]
fn test_last_drop_tears_down() {
    let before = stats();
    let (counter, drops) = DropCounter::new();
    let a = Shared::new(counter);
    let b = Shared::clone(&a);

    drop(a);
    assert_eq!(drops.get(), 0);
    drop(b);
    assert_eq!(drops.get(), 1);

    let delta = stats().since(&before);
    assert_eq!(delta.blocks_created, 1);
    assert_eq!(delta.combined_blocks, 1);
    assert_eq!(delta.values_destroyed, 1);
    assert_eq!(delta.blocks_released, 1);
    assert_eq!(delta.live_blocks(), 0);
}

/// Clone three times, drop the original and one clone, then drop the rest.
#[test]
fn test_scenario_clone_three_drop_all() {
    let before = stats();
    let alloc = CountingAlloc::default();
    let first = Shared::new_in(42, alloc.clone());

    let second = Shared::clone(&first);
    let third = Shared::clone(&first);
    let fourth = Shared::clone(&first);
    assert_eq!(Shared::use_count(&first), 4);

    drop(first);
    drop(second);
    assert_eq!(Shared::use_count(&third), 2);
    assert_eq!(*fourth, 42);
    assert_eq!(alloc.released.get(), 0);

    drop(third);
    drop(fourth);

    assert_eq!(alloc.allocated.get(), 1);
    assert_eq!(alloc.released.get(), 1);
    let delta = stats().since(&before);
    assert_eq!(delta.values_destroyed, 1);
    assert_eq!(delta.blocks_released, 1);
}

// ============================================================================
// Empty handles and moves
// ============================================================================

#[test]
fn test_default_is_empty() {
    let empty: Shared<i32> = Shared::default();
    assert!(Shared::is_empty(&empty));
    assert!(Shared::get(&empty).is_none());
    assert_eq!(Shared::kind(&empty), None);
    assert!(Shared::as_ptr(&empty).is_null());
    assert_eq!(format!("{empty:?}"), "Shared(<empty>)");
}

#[test]
#[should_panic(expected = "empty handle")]
fn test_deref_empty_panics() {
    let empty: Shared<i32> = Shared::empty();
    let _value: i32 = *empty;
}

#[test]
fn test_take_does_not_change_counts() {
    let mut a = Shared::new(7);
    let keep = Shared::clone(&a);
    let b = Shared::take(&mut a);

    assert!(Shared::is_empty(&a));
    assert_eq!(Shared::use_count(&b), 2);
    assert_eq!(Shared::use_count(&keep), 2);
}

#[test]
#[should_panic(expected = "use_count")]
fn test_use_count_after_take_panics() {
    let mut a = Shared::new(7);
    let _b = Shared::take(&mut a);
    let _ = Shared::use_count(&a);
}

#[test]
fn test_native_move_keeps_count() {
    let a = Shared::new(vec![1, 2, 3]);
    let b = Shared::clone(&a);
    let moved = a;
    assert_eq!(Shared::use_count(&moved), 2);
    assert_eq!(Shared::use_count(&b), 2);
}

#[test]
fn test_reset_releases_ownership() {
    let (counter, drops) = DropCounter::new();
    let mut a = Shared::new(counter);
    let b = Shared::clone(&a);

    Shared::reset(&mut a);
    assert!(Shared::is_empty(&a));
    assert_eq!(Shared::use_count(&b), 1);
    assert_eq!(drops.get(), 0);

    let mut b = b;
    Shared::reset(&mut b);
    assert_eq!(drops.get(), 1);

    // Resetting an empty handle is a no-op.
    Shared::reset(&mut b);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_reset_to_replaces_value() {
    let (old, old_drops) = DropCounter::new();
    let (new, new_drops) = DropCounter::new();
    let mut handle = Shared::new(old);

    Shared::reset_to(&mut handle, Box::new(new));
    assert_eq!(old_drops.get(), 1);
    assert_eq!(new_drops.get(), 0);
    assert_eq!(Shared::kind(&handle), Some(BlockKind::Adopting));
    assert_eq!(Shared::use_count(&handle), 1);

    drop(handle);
    assert_eq!(new_drops.get(), 1);
}

#[test]
fn test_swap() {
    let mut a = Shared::new(1);
    let mut b = Shared::new(2);
    let a2 = Shared::clone(&a);
    Shared::swap(&mut a, &mut b);
    assert_eq!((*a, *b), (2, 1));
    assert!(Shared::ptr_eq(&b, &a2));
    assert_eq!(Shared::use_count(&b), 2);
}

// ============================================================================
// Access
// ============================================================================

#[test]
fn test_get_mut_requires_unique_handle() {
    let mut a = Shared::new(String::from("x"));
    Shared::get_mut(&mut a).unwrap().push('y');
    assert_eq!(&*a, "xy");

    let b = Shared::clone(&a);
    assert!(Shared::get_mut(&mut a).is_none());
    drop(b);

    let weak = Shared::downgrade(&a);
    assert!(Shared::get_mut(&mut a).is_none());
    drop(weak);
    assert!(Shared::get_mut(&mut a).is_some());
}

#[test]
fn test_trait_impls_compare_values() {
    let a = Shared::new(3);
    let b = Shared::new(3);
    let c = Shared::new(4);
    assert_eq!(a, b);
    assert!(!Shared::ptr_eq(&a, &b));
    assert!(a < c);
    assert_eq!(a.to_string(), "3");
    assert_eq!(format!("{a:?}"), "Shared(3)");
    assert!(format!("{a:p}").starts_with("0x"));

    let set: std::collections::BTreeSet<_> = [Shared::clone(&c), a, b].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_empty_handles_compare_and_hash() {
    use std::collections::{HashMap, HashSet};

    let empty: Shared<i32> = Shared::empty();
    let value = Shared::new(i32::MIN);
    assert_eq!(empty, Shared::default());
    assert_ne!(empty, value);
    assert!(empty < value);

    let mut seen = HashSet::new();
    assert!(seen.insert(Shared::empty()));
    assert!(!seen.insert(Shared::<i32>::empty()));
    assert!(seen.insert(Shared::clone(&value)));
    assert_eq!(seen.len(), 2);

    let mut names = HashMap::new();
    names.insert(Shared::new(String::from("a")), 1);
    assert_eq!(names.get(&String::from("a")), Some(&1));
}

#[test]
fn test_from_conversions() {
    let a: Shared<i32> = 5.into();
    assert_eq!(Shared::kind(&a), Some(BlockKind::Combined));
    let b: Shared<[u8]> = Box::<[u8]>::from(&b"abc"[..]).into();
    assert_eq!(&*b, b"abc");
    assert_eq!(Shared::kind(&b), Some(BlockKind::Adopting));
}

// ============================================================================
// Construction variants
// ============================================================================

#[test]
fn test_new_with_runs_initializer_once() {
    let mut runs = 0;
    let shared = Shared::new_with(|| {
        runs += 1;
        vec![0_u8; 16]
    });
    assert_eq!(runs, 1);
    assert_eq!(shared.len(), 16);
}

#[test]
fn test_try_new_with_failure_returns_storage() {
    let before = stats();
    let alloc = CountingAlloc::default();
    let result = Shared::<u32>::try_new_with_in(|| Err::<u32, _>("bad input"), alloc.clone());

    assert_eq!(result.unwrap_err().into_init(), Some("bad input"));
    assert_eq!(alloc.allocated.get(), 1);
    assert_eq!(alloc.outstanding(), 0);
    assert_eq!(stats().since(&before).blocks_created, 0);
}

#[test]
fn test_initializer_panic_returns_storage() {
    let alloc = CountingAlloc::default();
    let probe = alloc.clone();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        Shared::<u32>::try_new_with_in(|| -> Result<u32, ()> { panic!("init blew up") }, alloc)
    }));
    assert!(result.is_err());
    assert_eq!(probe.allocated.get(), 1);
    assert_eq!(probe.outstanding(), 0);
}

#[test]
fn test_try_new_in_failing_allocator() {
    let err = Shared::try_new_in(1_u64, common::FailingAlloc).unwrap_err();
    assert!(err.layout().size() >= std::mem::size_of::<u64>());
}

#[test]
fn test_page_alloc_blocks() {
    let before = stats();
    let a = Shared::new_in([7_u64; 4], PageAlloc);
    let weak = Shared::downgrade(&a);
    assert_eq!(a.iter().sum::<u64>(), 28);

    drop(a);
    assert!(weak.expired());
    assert_eq!(stats().since(&before).blocks_released, 0);
    drop(weak);
    assert_eq!(stats().since(&before).blocks_released, 1);
}
