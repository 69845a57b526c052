#![forbid(unsafe_code)]

//! Synchronous observer registries.
//!
//! - [`ListenerSet`]: an ordered list of callbacks for one channel.
//! - [`KeyedListeners`]: one `ListenerSet` per key (event name, setting key).
//! - [`Subscription`]: guard that unsubscribes on drop or on
//!   [`unsubscribe`](Subscription::unsubscribe).
//!
//! # Architecture
//!
//! Sets use `Rc<RefCell<..>>` for single-threaded shared ownership. A
//! subscription holds only a `Weak` back-reference, so it outlives the set
//! harmlessly: unsubscribing after the set is gone is a no-op.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. `emit` holds no borrow while a callback runs; callbacks may subscribe,
//!    unsubscribe, or emit again.
//! 3. A callback unsubscribed during an emit cycle is not called later in that
//!    cycle.
//! 4. Unsubscribing twice, or after the set was cleared, is a no-op.

use std::cell::RefCell;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

type Callback<T> = Rc<dyn Fn(&T)>;

struct SetInner<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

/// Ordered callbacks for a single channel.
pub struct ListenerSet<T> {
    inner: Rc<RefCell<SetInner<T>>>,
}

impl<T> Clone for ListenerSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SetInner {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<T> std::fmt::Debug for ListenerSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("subscribers", &self.inner.borrow().entries.len())
            .finish()
    }
}

impl<T: 'static> ListenerSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It stays registered until the returned guard is
    /// dropped or unsubscribed.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.entries.push((id, Rc::new(callback)));
            id
        };
        let weak: Weak<RefCell<SetInner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().entries.retain(|(eid, _)| *eid != id);
            }
        })
    }

    /// Notify every subscriber. Returns how many callbacks ran.
    pub fn emit(&self, value: &T) -> usize {
        let snapshot: Vec<(u64, Callback<T>)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();
        let mut ran = 0;
        for (id, callback) in snapshot {
            let live = self.inner.borrow().entries.iter().any(|(eid, _)| *eid == id);
            if !live {
                continue;
            }
            callback(value);
            ran += 1;
        }
        ran
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every subscriber. Outstanding guards become inert.
    pub fn clear(&self) {
        let drained = std::mem::take(&mut self.inner.borrow_mut().entries);
        drop(drained);
    }
}

/// One [`ListenerSet`] per key, created on first subscription.
pub struct KeyedListeners<K, T> {
    sets: Rc<RefCell<AHashMap<K, ListenerSet<T>>>>,
}

impl<K, T> Clone for KeyedListeners<K, T> {
    fn clone(&self) -> Self {
        Self {
            sets: Rc::clone(&self.sets),
        }
    }
}

impl<K, T> Default for KeyedListeners<K, T> {
    fn default() -> Self {
        Self {
            sets: Rc::new(RefCell::new(AHashMap::new())),
        }
    }
}

impl<K: std::fmt::Debug, T> std::fmt::Debug for KeyedListeners<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedListeners")
            .field("keys", &self.sets.borrow().len())
            .finish()
    }
}

impl<K: Eq + Hash + Clone + 'static, T: 'static> KeyedListeners<K, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, key: K, callback: impl Fn(&T) + 'static) -> Subscription {
        let set = self.sets.borrow_mut().entry(key).or_default().clone();
        set.subscribe(callback)
    }

    /// Notify subscribers of `key`. Returns how many callbacks ran.
    pub fn emit(&self, key: &K, value: &T) -> usize {
        let set = self.sets.borrow().get(key).cloned();
        set.map_or(0, |s| s.emit(value))
    }

    #[must_use]
    pub fn len(&self, key: &K) -> usize {
        self.sets.borrow().get(key).map_or(0, ListenerSet::len)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.sets.borrow().values().map(ListenerSet::len).sum()
    }

    pub fn clear(&self) {
        let sets: Vec<ListenerSet<T>> = self.sets.borrow_mut().drain().map(|(_, s)| s).collect();
        for set in sets {
            set.clear();
        }
    }
}

/// Unsubscribe guard.
///
/// Dropping the guard unsubscribes. Call [`forget`](Self::forget) to keep the
/// callback registered for the lifetime of its registry.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A guard with nothing to cancel.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    /// Leave the callback registered; the registry still drops it on `clear`.
    pub fn forget(mut self) {
        self.cancel = None;
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}
