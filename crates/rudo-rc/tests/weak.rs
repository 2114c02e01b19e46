//! Tests for the Weak<T> observer.

mod common;

use common::DropCounter;
use rudo_rc::{stats, Shared, Weak};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ============================================================================
// Basic Weak<T> tests
// ============================================================================

#[test]
fn test_weak_basic() {
    let strong = Shared::new(42);
    let weak = Shared::downgrade(&strong);

    assert!(!weak.expired());
    assert_eq!(*weak.lock(), 42);
    assert_eq!(*weak.upgrade().unwrap(), 42);
}

#[test]
fn test_weak_counts() {
    let strong = Shared::new(123);
    assert_eq!(Shared::watch_count(&strong), 0);

    let weak1 = Shared::downgrade(&strong);
    assert_eq!(Shared::watch_count(&strong), 1);

    let weak2 = Weak::from(&strong);
    let weak3 = weak1.clone();
    assert_eq!(Shared::watch_count(&strong), 3);

    drop(weak2);
    assert_eq!(weak1.watch_count(), 2);
    assert_eq!(weak3.watch_count(), 2);
    assert_eq!(weak1.use_count(), 1);
    assert_eq!(Shared::use_count(&strong), 1);
}

#[test]
fn test_lock_adds_exactly_one_owner() {
    let strong = Shared::new("value");
    let weak = Shared::downgrade(&strong);

    let locked = weak.lock();
    assert_eq!(Shared::use_count(&strong), 2);
    assert!(Shared::ptr_eq(&strong, &locked));
    drop(locked);
    assert_eq!(Shared::use_count(&strong), 1);
}

#[test]
fn test_expired_right_after_last_owner() {
    let before = stats();
    let (counter, drops) = DropCounter::new();
    let strong = Shared::new(counter);
    let weak = Shared::downgrade(&strong);

    drop(strong);
    assert_eq!(drops.get(), 1);
    assert!(weak.expired());
    assert_eq!(weak.use_count(), 0);
    assert!(Shared::is_empty(&weak.lock()));
    assert!(weak.upgrade().is_none());

    // The value is gone but the block stays until the observer leaves.
    let mid = stats().since(&before);
    assert_eq!(mid.values_destroyed, 1);
    assert_eq!(mid.blocks_released, 0);
    assert_eq!(mid.live_blocks(), 1);
    assert_eq!(mid.live_values(), 0);

    drop(weak);
    assert_eq!(stats().since(&before).blocks_released, 1);
}

#[test]
fn test_many_observers_single_teardown() {
    let before = stats();
    let (counter, drops) = DropCounter::new();
    let strong = Shared::from_box(Box::new(counter));
    let observers: Vec<Weak<DropCounter>> = (0..10).map(|_| Shared::downgrade(&strong)).collect();

    drop(strong);
    assert_eq!(drops.get(), 1);
    assert!(observers.iter().all(Weak::expired));

    drop(observers);
    assert_eq!(drops.get(), 1);
    let delta = stats().since(&before);
    assert_eq!(delta.values_destroyed, 1);
    assert_eq!(delta.blocks_released, 1);
}

// ============================================================================
// Empty observers
// ============================================================================

#[test]
fn test_empty_weak() {
    let weak: Weak<i32> = Weak::new();
    assert!(weak.is_empty());
    assert!(weak.expired());
    assert_eq!(weak.use_count(), 0);
    assert_eq!(weak.watch_count(), 0);
    assert!(Shared::is_empty(&weak.lock()));
    assert!(weak.ptr_eq(&Weak::default()));
}

#[test]
fn test_downgrade_empty_shared() {
    let empty: Shared<String> = Shared::empty();
    let weak = Shared::downgrade(&empty);
    assert!(weak.is_empty());
    assert!(weak.expired());
}

#[test]
fn test_take_moves_observation() {
    let strong = Shared::new(1);
    let mut weak = Shared::downgrade(&strong);
    let moved = weak.take();

    assert!(weak.is_empty());
    assert!(!moved.expired());
    assert_eq!(Shared::watch_count(&strong), 1);
}

#[test]
fn test_ptr_eq() {
    let a = Shared::new(1);
    let b = Shared::new(1);
    let wa1 = Shared::downgrade(&a);
    let wa2 = Shared::downgrade(&a);
    let wb = Shared::downgrade(&b);
    assert!(wa1.ptr_eq(&wa2));
    assert!(!wa1.ptr_eq(&wb));
}

// ============================================================================
// Observers inside values
// ============================================================================

struct TreeNode {
    name: &'static str,
    parent: RefCell<Weak<TreeNode>>,
    children: RefCell<Vec<Shared<TreeNode>>>,
    _drops: DropCounter,
}

impl rudo_rc::Managed for TreeNode {}

#[test]
fn test_parent_links_do_not_leak() {
    let before = stats();
    let drops = Rc::new(Cell::new(0));

    let root = Shared::new(TreeNode {
        name: "root",
        parent: RefCell::new(Weak::new()),
        children: RefCell::new(Vec::new()),
        _drops: DropCounter(Rc::clone(&drops)),
    });
    for name in ["left", "right"] {
        let child = Shared::new(TreeNode {
            name,
            parent: RefCell::new(Shared::downgrade(&root)),
            children: RefCell::new(Vec::new()),
            _drops: DropCounter(Rc::clone(&drops)),
        });
        root.children.borrow_mut().push(child);
    }

    let left = Shared::clone(&root.children.borrow()[0]);
    assert_eq!(left.parent.borrow().lock().name, "root");
    assert_eq!(Shared::watch_count(&root), 2);

    drop(root);
    assert!(left.parent.borrow().expired());
    assert_eq!(drops.get(), 2);

    drop(left);
    assert_eq!(drops.get(), 3);
    let delta = stats().since(&before);
    assert_eq!(delta.blocks_created, 3);
    assert_eq!(delta.blocks_released, 3);
}

#[test]
fn test_value_dropping_observer_of_itself() {
    struct Loop {
        me: RefCell<Weak<Loop>>,
    }
    impl rudo_rc::Managed for Loop {}

    let before = stats();
    let strong = Shared::new(Loop {
        me: RefCell::new(Weak::new()),
    });
    *strong.me.borrow_mut() = Shared::downgrade(&strong);
    assert_eq!(Shared::watch_count(&strong), 1);

    drop(strong);
    let delta = stats().since(&before);
    assert_eq!(delta.values_destroyed, 1);
    assert_eq!(delta.blocks_released, 1);
}
