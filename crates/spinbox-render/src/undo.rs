#![forbid(unsafe_code)]

//! LIFO undo stack: the teardown strategy for skins that modify caller-owned
//! elements.
//!
//! Every mutation goes through an [`UndoStack`] method, which captures the
//! state needed to reverse it before applying it. [`UndoStack::teardown`]
//! replays the reversals newest-first.
//!
//! # Invariants
//!
//! 1. Class and attribute operations record the prior attribute text
//!    verbatim (or its absence) and its position, so reversal is byte-exact,
//!    including whitespace and attribute order.
//! 2. Moves record the original parent and next sibling; reversal re-inserts
//!    at the exact original position.
//! 3. An operation that changed nothing is not recorded.
//!
//! # Failure Modes
//!
//! - **Node freed by the host**: its reversals are skipped.
//! - **Original next sibling gone**: the node is appended to the original
//!   parent instead.

use spinbox_dom::{Dom, NodeId};

/// One reversible DOM mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOp {
    Create {
        node: NodeId,
    },
    AddClass {
        node: NodeId,
        class: String,
        prior: Option<String>,
    },
    RemoveClass {
        node: NodeId,
        class: String,
        prior: Option<String>,
    },
    SetAttribute {
        node: NodeId,
        name: String,
        prior: Option<String>,
        /// Position of the prior attribute.
        index: Option<usize>,
    },
    Move {
        node: NodeId,
        parent: Option<NodeId>,
        next_sibling: Option<NodeId>,
    },
}

/// Recorded mutations, newest last.
#[derive(Debug, Default)]
pub struct UndoStack {
    ops: Vec<UndoOp>,
}

impl UndoStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn ops(&self) -> &[UndoOp] {
        &self.ops
    }

    pub fn create_element(&mut self, dom: &Dom, tag: &str) -> NodeId {
        let node = dom.create_element(tag);
        self.ops.push(UndoOp::Create { node });
        node
    }

    /// Add `class` to `node`. Returns whether it was added.
    pub fn add_class(&mut self, dom: &Dom, node: NodeId, class: &str) -> bool {
        let prior = dom.get_attribute(node, "class");
        if !dom.add_class(node, class) {
            return false;
        }
        self.ops.push(UndoOp::AddClass {
            node,
            class: class.to_string(),
            prior,
        });
        true
    }

    /// Remove `class` from `node`. Returns whether it was present.
    pub fn remove_class(&mut self, dom: &Dom, node: NodeId, class: &str) -> bool {
        let prior = dom.get_attribute(node, "class");
        if !dom.remove_class(node, class) {
            return false;
        }
        self.ops.push(UndoOp::RemoveClass {
            node,
            class: class.to_string(),
            prior,
        });
        true
    }

    pub fn set_attribute(&mut self, dom: &Dom, node: NodeId, name: &str, value: &str) {
        let prior = dom.get_attribute(node, name);
        let index = dom.attribute_index(node, name);
        if prior.as_deref() == Some(value) || !dom.set_attribute(node, name, value) {
            return;
        }
        self.ops.push(UndoOp::SetAttribute {
            node,
            name: name.to_string(),
            prior,
            index,
        });
    }

    pub fn remove_attribute(&mut self, dom: &Dom, node: NodeId, name: &str) {
        let prior = dom.get_attribute(node, name);
        let index = dom.attribute_index(node, name);
        if prior.is_none() || !dom.remove_attribute(node, name) {
            return;
        }
        self.ops.push(UndoOp::SetAttribute {
            node,
            name: name.to_string(),
            prior,
            index,
        });
    }

    /// Move `node` under `parent`, before `before` (append when `None`).
    pub fn move_before(&mut self, dom: &Dom, node: NodeId, parent: NodeId, before: Option<NodeId>) {
        let origin = dom.parent(node);
        let next_sibling = dom.next_sibling(node);
        if !dom.insert_before(parent, node, before) {
            return;
        }
        self.ops.push(UndoOp::Move {
            node,
            parent: origin,
            next_sibling,
        });
    }

    /// Reverse every recorded operation, newest first.
    pub fn teardown(&mut self, dom: &Dom) {
        let count = self.ops.len();
        while let Some(op) = self.ops.pop() {
            reverse(dom, op);
        }
        if count > 0 {
            tracing::trace!(message = "spinbox.undo.teardown", ops = count);
        }
    }
}

fn reverse(dom: &Dom, op: UndoOp) {
    match op {
        UndoOp::Create { node } => {
            dom.remove(node);
        }
        UndoOp::AddClass { node, prior, .. } | UndoOp::RemoveClass { node, prior, .. } => {
            restore(dom, node, "class", prior, None);
        }
        UndoOp::SetAttribute {
            node,
            name,
            prior,
            index,
        } => restore(dom, node, &name, prior, index),
        UndoOp::Move {
            node,
            parent,
            next_sibling,
        } => {
            if !dom.exists(node) {
                return;
            }
            match parent {
                Some(parent) => {
                    dom.insert_before(parent, node, next_sibling);
                }
                None => dom.detach(node),
            }
        }
    }
}

fn restore(dom: &Dom, node: NodeId, name: &str, prior: Option<String>, index: Option<usize>) {
    match (prior, index) {
        (Some(value), Some(index)) => {
            dom.insert_attribute(node, index, name, &value);
        }
        (Some(value), None) => {
            dom.set_attribute(node, name, &value);
        }
        (None, _) => {
            dom.remove_attribute(node, name);
        }
    }
}
