//! Observer tree demo
//!
//! Builds a widget tree where children hold owning handles and parents are
//! only observed, then tears it down and prints the block statistics.

use rudo_rc::{stats, Managed, SelfRef, Shared, SharedFromThis, Weak};
use std::cell::RefCell;

const DEPTH: usize = 4;
const BRANCHES: usize = 3;

#[derive(Managed)]
struct Widget {
    id: usize,
    parent: RefCell<Weak<Widget>>,
    children: RefCell<Vec<Shared<Widget>>>,
    this: SelfRef<Self>,
}

impl Widget {
    fn new(id: usize) -> Shared<Self> {
        Shared::new(Self {
            id,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            this: SelfRef::new(),
        })
    }

    fn add_child(&self, child: Shared<Self>) {
        *child.parent.borrow_mut() = self.weak_from_this();
        self.children.borrow_mut().push(child);
    }

    fn path(&self) -> Vec<usize> {
        let mut path = vec![self.id];
        let mut current = self.parent.borrow().lock();
        while !Shared::is_empty(&current) {
            path.push(current.id);
            let next = current.parent.borrow().lock();
            current = next;
        }
        path.reverse();
        path
    }
}

fn build(parent: &Widget, depth: usize, next_id: &mut usize) {
    if depth == 0 {
        return;
    }
    for _ in 0..BRANCHES {
        let child = Widget::new(*next_id);
        *next_id += 1;
        build(&child, depth - 1, next_id);
        parent.add_child(child);
    }
}

fn deepest(widget: &Shared<Widget>) -> Shared<Widget> {
    let children = widget.children.borrow();
    children
        .last()
        .map_or_else(|| Shared::clone(widget), deepest)
}

fn main() {
    let before = stats();
    let root = Widget::new(0);
    let mut next_id = 1;
    build(&root, DEPTH, &mut next_id);

    let leaf = deepest(&root);
    println!("widgets built: {next_id}");
    println!("path to last leaf: {:?}", leaf.path());

    let handle = leaf.shared_from_this().expect("leaf is owned");
    println!("leaf owners: {}", Shared::use_count(&handle));
    drop(handle);

    drop(root);
    println!("root gone, leaf parent expired: {}", leaf.parent.borrow().expired());
    drop(leaf);

    let delta = stats().since(&before);
    println!(
        "blocks created: {}, values destroyed: {}, blocks released: {}",
        delta.blocks_created, delta.values_destroyed, delta.blocks_released
    );
}
