#![forbid(unsafe_code)]

//! DOM events and the listener table.
//!
//! Listeners are stored as `Rc` callbacks keyed by the node they are attached
//! to. Dispatch snapshots the listeners of each node on the propagation path
//! and invokes them with no internal borrow held, so a listener may mutate the
//! tree, add or remove listeners, or dispatch nested events.
//!
//! # Invariants
//!
//! 1. Listeners on one node run in registration order.
//! 2. A listener removed during dispatch is not invoked afterwards, even if it
//!    was part of the snapshot.
//! 3. Bubbling visits target, then each ancestor up to the document.

use std::rc::Rc;

use ahash::AHashMap;
use bitflags::bitflags;

use crate::node::NodeId;

bitflags! {
    /// Dispatch behaviour of an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventFlags: u8 {
        /// Propagates from the target to its ancestors.
        const BUBBLES = 0b0001;
        /// `prevent_default` is honoured.
        const CANCELABLE = 0b0010;
    }
}

/// Payload carried by an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    None,
    /// Keyboard event. `repeat` is set for OS key auto-repeat.
    Key { key: String, repeat: bool },
    /// Wheel event. Negative `delta_y` scrolls up.
    Wheel { delta_y: f64 },
    /// Value text attached to `change`-style notifications.
    Value(String),
}

/// A dispatched event.
#[derive(Debug, Clone)]
pub struct DomEvent {
    kind: String,
    flags: EventFlags,
    detail: EventDetail,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// A non-bubbling, cancelable event with no payload.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            flags: EventFlags::CANCELABLE,
            detail: EventDetail::None,
            target: None,
            current_target: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// A bubbling, cancelable event.
    #[must_use]
    pub fn bubbling(kind: impl Into<String>) -> Self {
        Self::new(kind).with_flags(EventFlags::BUBBLES | EventFlags::CANCELABLE)
    }

    /// `keydown`/`keyup` with the given key name.
    #[must_use]
    pub fn key(kind: impl Into<String>, key: impl Into<String>, repeat: bool) -> Self {
        Self::bubbling(kind).with_detail(EventDetail::Key {
            key: key.into(),
            repeat,
        })
    }

    /// `wheel` with a vertical delta.
    #[must_use]
    pub fn wheel(delta_y: f64) -> Self {
        Self::bubbling("wheel").with_detail(EventDetail::Wheel { delta_y })
    }

    #[must_use]
    pub fn with_flags(mut self, flags: EventFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Event type, e.g. `"keydown"`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn detail(&self) -> &EventDetail {
        &self.detail
    }

    #[must_use]
    pub fn bubbles(&self) -> bool {
        self.flags.contains(EventFlags::BUBBLES)
    }

    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    #[must_use]
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    /// Key name for keyboard events.
    #[must_use]
    pub fn key_name(&self) -> Option<&str> {
        match &self.detail {
            EventDetail::Key { key, .. } => Some(key),
            _ => None,
        }
    }

    /// True for OS key auto-repeat keydowns.
    #[must_use]
    pub fn is_repeat(&self) -> bool {
        matches!(self.detail, EventDetail::Key { repeat: true, .. })
    }

    /// Vertical wheel delta, if this is a wheel event.
    #[must_use]
    pub fn wheel_delta(&self) -> Option<f64> {
        match self.detail {
            EventDetail::Wheel { delta_y } => Some(delta_y),
            _ => None,
        }
    }

    pub fn prevent_default(&mut self) {
        if self.flags.contains(EventFlags::CANCELABLE) {
            self.default_prevented = true;
        }
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub(crate) fn set_target(&mut self, target: NodeId) {
        self.target = Some(target);
    }

    pub(crate) fn set_current_target(&mut self, node: Option<NodeId>) {
        self.current_target = node;
    }
}

/// Handle returned by `add_event_listener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Listener callback.
pub type Listener = Rc<dyn Fn(&mut DomEvent)>;

struct ListenerEntry {
    id: ListenerId,
    kind: String,
    callback: Listener,
}

#[derive(Default)]
pub(crate) struct ListenerTable {
    next_id: u64,
    by_node: AHashMap<NodeId, Vec<ListenerEntry>>,
    owner: AHashMap<ListenerId, NodeId>,
}

impl std::fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerTable")
            .field("nodes", &self.by_node.len())
            .field("listeners", &self.owner.len())
            .finish()
    }
}

impl ListenerTable {
    pub(crate) fn add(&mut self, node: NodeId, kind: &str, callback: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_node.entry(node).or_default().push(ListenerEntry {
            id,
            kind: kind.to_string(),
            callback,
        });
        self.owner.insert(id, node);
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let Some(node) = self.owner.remove(&id) else {
            return false;
        };
        if let Some(entries) = self.by_node.get_mut(&node) {
            entries.retain(|e| e.id != id);
            if entries.is_empty() {
                self.by_node.remove(&node);
            }
        }
        true
    }

    pub(crate) fn remove_node(&mut self, node: NodeId) {
        if let Some(entries) = self.by_node.remove(&node) {
            for entry in entries {
                self.owner.remove(&entry.id);
            }
        }
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.owner.contains_key(&id)
    }

    pub(crate) fn snapshot(&self, node: NodeId, kind: &str) -> Vec<(ListenerId, Listener)> {
        self.by_node
            .get(&node)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.kind == kind)
                    .map(|e| (e.id, Rc::clone(&e.callback)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node: NodeId) -> usize {
        self.by_node.get(&node).map_or(0, Vec::len)
    }

    pub(crate) fn total(&self) -> usize {
        self.owner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_reports_repeat() {
        let ev = DomEvent::key("keydown", "ArrowUp", true);
        assert!(ev.bubbles());
        assert!(ev.is_repeat());
        assert_eq!(ev.key_name(), Some("ArrowUp"));
    }

    #[test]
    fn prevent_default_requires_cancelable() {
        let mut ev = DomEvent::new("blur").with_flags(EventFlags::empty());
        ev.prevent_default();
        assert!(!ev.default_prevented());

        let mut ev = DomEvent::wheel(-1.0);
        ev.prevent_default();
        assert!(ev.default_prevented());
        assert_eq!(ev.wheel_delta(), Some(-1.0));
    }

    #[test]
    fn table_remove_is_idempotent() {
        let mut table = ListenerTable::default();
        let id = table.add(NodeId(3), "click", Rc::new(|_| {}));
        assert_eq!(table.count(NodeId(3)), 1);
        assert!(table.remove(id));
        assert!(!table.remove(id));
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn snapshot_filters_by_kind() {
        let mut table = ListenerTable::default();
        table.add(NodeId(1), "keydown", Rc::new(|_| {}));
        table.add(NodeId(1), "keyup", Rc::new(|_| {}));
        assert_eq!(table.snapshot(NodeId(1), "keydown").len(), 1);
        assert!(table.snapshot(NodeId(2), "keydown").is_empty());
    }
}
