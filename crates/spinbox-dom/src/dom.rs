#![forbid(unsafe_code)]

//! The [`Dom`] handle: tree mutation, attributes, focus, events, and timers.
//!
//! `Dom` is cheaply cloneable (`Rc` inside) and single-threaded. Every method
//! takes `&self` and borrows the interior only for the duration of the call;
//! listener and timer callbacks always run with no borrow held.
//!
//! Operations on ids that no longer resolve are silent no-ops returning
//! `false`/`None`, so teardown code can run speculatively.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use web_time::Duration;

use crate::event::{DomEvent, Listener, ListenerId, ListenerTable};
use crate::node::{ElementData, NodeId, NodeKind, Tree};
use crate::timer::{TimerId, TimerQueue};

static NEXT_DOM_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a document, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomId(pub u64);

#[derive(Debug)]
struct DomInner {
    id: DomId,
    tree: RefCell<Tree>,
    listeners: RefCell<ListenerTable>,
    timers: RefCell<TimerQueue>,
}

/// Shared handle to one document.
#[derive(Debug, Clone)]
pub struct Dom {
    inner: Rc<DomInner>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Dom {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Dom {
    /// New document containing an empty `body`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DomInner {
                id: DomId(NEXT_DOM_ID.fetch_add(1, Ordering::Relaxed)),
                tree: RefCell::new(Tree::new()),
                listeners: RefCell::new(ListenerTable::default()),
                timers: RefCell::new(TimerQueue::default()),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> DomId {
        self.inner.id
    }

    #[must_use]
    pub fn document(&self) -> NodeId {
        self.inner.tree.borrow().document
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        self.inner.tree.borrow().body
    }

    // ── Construction ────────────────────────────────────────────────────────

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner
            .tree
            .borrow_mut()
            .alloc(NodeKind::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                attributes: Vec::new(),
                value: None,
            }))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.inner
            .tree
            .borrow_mut()
            .alloc(NodeKind::Text(text.to_string()))
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_element(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(node, name, value);
        }
        self.append_child(parent, node);
        node
    }

    // ── Tree structure ──────────────────────────────────────────────────────

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.inner
            .tree
            .borrow_mut()
            .insert_before(parent, child, None)
    }

    /// Insert `child` before `before` under `parent`; appends when `before`
    /// is `None` or no longer a child of `parent`.
    pub fn insert_before(&self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> bool {
        self.inner
            .tree
            .borrow_mut()
            .insert_before(parent, child, before)
    }

    /// Detach `node` from its parent, keeping it alive.
    pub fn detach(&self, node: NodeId) {
        self.inner.tree.borrow_mut().detach(node);
    }

    /// Detach and free `node` with its subtree, dropping their listeners.
    pub fn remove(&self, node: NodeId) -> bool {
        let freed = self.inner.tree.borrow_mut().free_subtree(node);
        let mut listeners = self.inner.listeners.borrow_mut();
        for id in &freed {
            listeners.remove_node(*id);
        }
        !freed.is_empty()
    }

    #[must_use]
    pub fn exists(&self, node: NodeId) -> bool {
        self.inner.tree.borrow().exists(node)
    }

    /// True when `node` is reachable from the document root.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        let tree = self.inner.tree.borrow();
        tree.exists(node) && tree.is_inclusive_ancestor(tree.document, node)
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.tree.borrow().get(node)?.parent
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .tree
            .borrow()
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.inner.tree.borrow();
        let parent = tree.get(node)?.parent?;
        let siblings = &tree.get(parent)?.children;
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }

    /// Pre-order descendants, excluding `node` itself.
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.tree.borrow().descendants(node)
    }

    /// True if `ancestor` is `node` or contains it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inner.tree.borrow().is_inclusive_ancestor(ancestor, node)
    }

    /// Elements under `root` (exclusive) carrying attribute `name`, optionally
    /// with an exact value.
    #[must_use]
    pub fn find_by_attribute(&self, root: NodeId, name: &str, value: Option<&str>) -> Vec<NodeId> {
        let tree = self.inner.tree.borrow();
        tree.descendants(root)
            .into_iter()
            .filter(|id| {
                tree.element(*id).is_some_and(|el| {
                    el.attributes
                        .iter()
                        .any(|(k, v)| k == name && value.is_none_or(|want| want == v))
                })
            })
            .collect()
    }

    /// Number of live nodes in the arena, including document and body.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.tree.borrow().live_count()
    }

    pub(crate) fn with_tree<R>(&self, f: impl FnOnce(&Tree) -> R) -> R {
        f(&self.inner.tree.borrow())
    }

    // ── Elements ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.inner.tree.borrow().element(node).map(|el| el.tag.clone())
    }

    #[must_use]
    pub fn is_element(&self, node: NodeId) -> bool {
        self.inner.tree.borrow().element(node).is_some()
    }

    #[must_use]
    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.inner.tree.borrow();
        let el = tree.element(node)?;
        el.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    #[must_use]
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    /// Attributes in document order.
    #[must_use]
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.inner
            .tree
            .borrow()
            .element(node)
            .map(|el| el.attributes.clone())
            .unwrap_or_default()
    }

    /// Set an attribute; an existing attribute keeps its position.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> bool {
        let mut tree = self.inner.tree.borrow_mut();
        let Some(el) = tree.element_mut(node) else {
            return false;
        };
        let name = name.to_ascii_lowercase();
        match el.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attributes.push((name, value.to_string())),
        }
        true
    }

    /// Position of attribute `name` in document order.
    #[must_use]
    pub fn attribute_index(&self, node: NodeId, name: &str) -> Option<usize> {
        let tree = self.inner.tree.borrow();
        tree.element(node)?.attributes.iter().position(|(k, _)| k == name)
    }

    /// Set an attribute, placing it at `index` (clamped) when it is new.
    pub fn insert_attribute(&self, node: NodeId, index: usize, name: &str, value: &str) -> bool {
        if self.has_attribute(node, name) {
            return self.set_attribute(node, name, value);
        }
        let mut tree = self.inner.tree.borrow_mut();
        let Some(el) = tree.element_mut(node) else {
            return false;
        };
        let at = index.min(el.attributes.len());
        el.attributes
            .insert(at, (name.to_ascii_lowercase(), value.to_string()));
        true
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) -> bool {
        let mut tree = self.inner.tree.borrow_mut();
        let Some(el) = tree.element_mut(node) else {
            return false;
        };
        let before = el.attributes.len();
        el.attributes.retain(|(k, _)| k != name);
        before != el.attributes.len()
    }

    #[must_use]
    pub fn class_list(&self, node: NodeId) -> Vec<String> {
        self.get_attribute(node, "class")
            .map(|c| c.split_ascii_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_list(node).iter().any(|c| c == class)
    }

    /// Append `class` if missing. Returns whether it was added.
    pub fn add_class(&self, node: NodeId, class: &str) -> bool {
        if !self.is_element(node) || class.is_empty() || self.has_class(node, class) {
            return false;
        }
        let mut list = self.class_list(node);
        list.push(class.to_string());
        self.set_attribute(node, "class", &list.join(" "))
    }

    /// Insert `class` at `index` in the class list (clamped). Returns whether
    /// it was added.
    pub fn insert_class(&self, node: NodeId, index: usize, class: &str) -> bool {
        if !self.is_element(node) || class.is_empty() || self.has_class(node, class) {
            return false;
        }
        let mut list = self.class_list(node);
        list.insert(index.min(list.len()), class.to_string());
        self.set_attribute(node, "class", &list.join(" "))
    }

    /// Remove `class`; an emptied `class` attribute is kept, as on the web
    /// platform. Returns whether it was present.
    pub fn remove_class(&self, node: NodeId, class: &str) -> bool {
        let list = self.class_list(node);
        if !list.iter().any(|c| c == class) {
            return false;
        }
        let kept: Vec<String> = list.into_iter().filter(|c| c != class).collect();
        self.set_attribute(node, "class", &kept.join(" "))
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let tree = self.inner.tree.borrow();
        let mut out = String::new();
        if let Some(NodeKind::Text(t)) = tree.get(node).map(|n| &n.kind) {
            out.push_str(t);
        }
        for id in tree.descendants(node) {
            if let Some(NodeKind::Text(t)) = tree.get(id).map(|n| &n.kind) {
                out.push_str(t);
            }
        }
        out
    }

    /// Replace all children of `node` with a single text node.
    pub fn set_text_content(&self, node: NodeId, text: &str) {
        for child in self.children(node) {
            self.remove(child);
        }
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(node, t);
        }
    }

    // ── Form value & focus ──────────────────────────────────────────────────

    /// Current `value` property of an element.
    #[must_use]
    pub fn value(&self, node: NodeId) -> String {
        let tree = self.inner.tree.borrow();
        let Some(el) = tree.element(node) else {
            return String::new();
        };
        match &el.value {
            Some(v) => v.clone(),
            None => el
                .attributes
                .iter()
                .find(|(k, _)| k == "value")
                .map(|(_, v)| v.clone())
                .unwrap_or_default(),
        }
    }

    /// Write the `value` property (the `value` attribute is untouched).
    pub fn set_value(&self, node: NodeId, value: &str) -> bool {
        let mut tree = self.inner.tree.borrow_mut();
        match tree.element_mut(node) {
            Some(el) => {
                el.value = Some(value.to_string());
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn active_element(&self) -> Option<NodeId> {
        self.inner.tree.borrow().active
    }

    /// Focus `node`, blurring the previous active element first.
    pub fn focus(&self, node: NodeId) {
        if !self.is_element(node) || self.active_element() == Some(node) {
            return;
        }
        self.blur();
        self.inner.tree.borrow_mut().active = Some(node);
        self.dispatch(node, DomEvent::new("focus"));
    }

    /// Clear focus, dispatching `blur` on the previously active element.
    pub fn blur(&self) {
        let previous = self.inner.tree.borrow_mut().active.take();
        if let Some(node) = previous {
            self.dispatch(node, DomEvent::new("blur"));
        }
    }

    // ── Events ──────────────────────────────────────────────────────────────

    pub fn add_event_listener(
        &self,
        node: NodeId,
        kind: &str,
        listener: impl Fn(&mut DomEvent) + 'static,
    ) -> ListenerId {
        let callback: Listener = Rc::new(listener);
        self.inner.listeners.borrow_mut().add(node, kind, callback)
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow_mut().remove(id)
    }

    #[must_use]
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.inner.listeners.borrow().count(node)
    }

    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.inner.listeners.borrow().total()
    }

    /// Dispatch `event` at `target` and return it after propagation.
    pub fn dispatch(&self, target: NodeId, mut event: DomEvent) -> DomEvent {
        event.set_target(target);
        let path: Vec<NodeId> = {
            let tree = self.inner.tree.borrow();
            let mut path = vec![target];
            if event.bubbles() {
                let mut cursor = tree.get(target).and_then(|n| n.parent);
                while let Some(node) = cursor {
                    path.push(node);
                    cursor = tree.get(node).and_then(|n| n.parent);
                }
            }
            path
        };
        for node in path {
            let snapshot = self.inner.listeners.borrow().snapshot(node, event.kind());
            event.set_current_target(Some(node));
            for (id, callback) in snapshot {
                if !self.inner.listeners.borrow().contains(id) {
                    continue;
                }
                callback(&mut event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event.set_current_target(None);
        event
    }

    // ── Timers ──────────────────────────────────────────────────────────────

    /// Host time since document creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.timers.borrow().now()
    }

    pub fn set_timeout(&self, delay: Duration, callback: impl Fn() + 'static) -> TimerId {
        self.inner
            .timers
            .borrow_mut()
            .schedule(delay, None, Rc::new(callback))
    }

    pub fn set_interval(&self, period: Duration, callback: impl Fn() + 'static) -> TimerId {
        self.inner
            .timers
            .borrow_mut()
            .schedule(period, Some(period), Rc::new(callback))
    }

    pub fn clear_timer(&self, id: TimerId) -> bool {
        self.inner.timers.borrow_mut().clear(id)
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().pending()
    }

    /// Advance host time by `delta`, firing every timer that falls due.
    /// Returns the number of callbacks run.
    pub fn advance(&self, delta: Duration) -> usize {
        let limit = self.now() + delta;
        let mut fired = 0;
        loop {
            let next = self.inner.timers.borrow_mut().take_due(limit);
            let Some(callback) = next else {
                break;
            };
            callback();
            fired += 1;
        }
        self.inner.timers.borrow_mut().settle(limit);
        if fired > 0 {
            tracing::trace!(message = "dom.advance", dom = self.inner.id.0, fired);
        }
        fired
    }
}
