#![forbid(unsafe_code)]

//! Element → instance registry.
//!
//! One engine per input element. Creating a second engine on an input that
//! already has one destroys the first (replace policy).
//!
//! # Invariants
//!
//! 1. An entry exists exactly while its engine is live: inserted at the end
//!    of construction, removed by `destroy`.
//! 2. Removal is identity-checked, so a stale engine can never evict its
//!    replacement.
//! 3. No engine is dropped while the registry is borrowed.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use spinbox_dom::{DomId, NodeId};

use crate::engine::Engine;

pub(crate) type Key = (DomId, NodeId);

thread_local! {
    static REGISTRY: RefCell<AHashMap<Key, Rc<Engine>>> = RefCell::new(AHashMap::new());
}

pub(crate) fn get(key: Key) -> Option<Rc<Engine>> {
    REGISTRY.with(|r| r.borrow().get(&key).cloned())
}

pub(crate) fn insert(key: Key, engine: Rc<Engine>) {
    let previous = REGISTRY.with(|r| r.borrow_mut().insert(key, engine));
    drop(previous);
}

/// Remove `engine` if it is the one registered under `key`.
pub(crate) fn remove(key: Key, engine: &Engine) {
    let removed = REGISTRY.with(|r| {
        let mut map = r.borrow_mut();
        match map.get(&key) {
            Some(current) if std::ptr::eq(Rc::as_ptr(current), engine) => map.remove(&key),
            _ => None,
        }
    });
    drop(removed);
}

/// Number of live instances on this thread.
#[must_use]
pub fn live_instances() -> usize {
    REGISTRY.with(|r| r.borrow().len())
}
