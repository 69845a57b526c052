#![forbid(unsafe_code)]

//! Node arena backing a [`Dom`](crate::Dom).
//!
//! Nodes live in a slot vector indexed by [`NodeId`]. Removing a subtree frees
//! its slots; ids are never reused within one document, so a stale id simply
//! stops resolving instead of aliasing a newer node.
//!
//! # Invariants
//!
//! 1. A node has at most one parent, and appears exactly once in that parent's
//!    child list.
//! 2. The document node has no parent and is never freed.
//! 3. Operations must not create cycles: inserting an ancestor under one of its
//!    descendants is rejected.

/// Identity of a node within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Raw index value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Element payload: tag, ordered attributes, and the dirty `value` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    /// Set once script writes the value; until then the `value` attribute is
    /// the source of truth.
    pub value: Option<String>,
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

#[derive(Debug)]
pub(crate) struct Tree {
    nodes: Vec<Option<NodeData>>,
    pub(crate) document: NodeId,
    pub(crate) body: NodeId,
    pub(crate) active: Option<NodeId>,
}

impl Tree {
    pub(crate) fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            document: NodeId(0),
            body: NodeId(0),
            active: None,
        };
        tree.document = tree.alloc(NodeKind::Document);
        let body = tree.alloc(NodeKind::Element(ElementData {
            tag: "body".to_string(),
            attributes: Vec::new(),
            value: None,
        }));
        tree.body = body;
        tree.insert_before(tree.document, body, None);
        tree
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.get(id)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub(crate) fn exists(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// True if `ancestor` is `node` or one of its ancestors.
    pub(crate) fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.get(current).and_then(|n| n.parent);
        }
        false
    }

    pub(crate) fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = None;
        }
    }

    /// Insert `child` under `parent` before `before` (append when `None` or
    /// when `before` is not a child of `parent`). Returns false when rejected.
    pub(crate) fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> bool {
        if !self.exists(parent) || !self.exists(child) || parent == child {
            return false;
        }
        if self.is_inclusive_ancestor(child, parent) {
            return false;
        }
        if matches!(self.get(parent).map(|n| &n.kind), Some(NodeKind::Text(_))) {
            return false;
        }
        if before == Some(child) {
            return true;
        }
        self.detach(child);
        let Some(p) = self.get_mut(parent) else {
            return false;
        };
        let index = before
            .and_then(|b| p.children.iter().position(|c| *c == b))
            .unwrap_or(p.children.len());
        p.children.insert(index, child);
        if let Some(n) = self.get_mut(child) {
            n.parent = Some(parent);
        }
        true
    }

    /// Detach `id` and free it together with its subtree. Returns the freed ids.
    pub(crate) fn free_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.document || !self.exists(id) {
            return Vec::new();
        }
        self.detach(id);
        let mut freed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.nodes.get_mut(current.0 as usize)
                && let Some(data) = slot.take()
            {
                stack.extend(data.children);
                freed.push(current);
            }
        }
        if self.active.is_some_and(|a| freed.contains(&a)) {
            self.active = None;
        }
        freed
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub(crate) fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(node) = self.get(id) else {
            return out;
        };
        let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(n) = self.get(current) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    pub(crate) fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut Tree, tag: &str) -> NodeId {
        tree.alloc(NodeKind::Element(ElementData {
            tag: tag.to_string(),
            attributes: Vec::new(),
            value: None,
        }))
    }

    #[test]
    fn new_tree_has_body_under_document() {
        let tree = Tree::new();
        assert_eq!(tree.get(tree.body).unwrap().parent, Some(tree.document));
        assert_eq!(tree.live_count(), 2);
    }

    #[test]
    fn insert_before_unknown_sibling_appends() {
        let mut tree = Tree::new();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let stray = element(&mut tree, "stray");
        assert!(tree.insert_before(tree.body, a, None));
        assert!(tree.insert_before(tree.body, b, Some(stray)));
        assert_eq!(tree.get(tree.body).unwrap().children, vec![a, b]);
    }

    #[test]
    fn insert_rejects_cycles() {
        let mut tree = Tree::new();
        let outer = element(&mut tree, "div");
        let inner = element(&mut tree, "span");
        tree.insert_before(tree.body, outer, None);
        tree.insert_before(outer, inner, None);
        assert!(!tree.insert_before(inner, outer, None));
        assert_eq!(tree.get(outer).unwrap().parent, Some(tree.body));
    }

    #[test]
    fn free_subtree_frees_descendants_and_clears_focus() {
        let mut tree = Tree::new();
        let outer = element(&mut tree, "div");
        let inner = element(&mut tree, "input");
        tree.insert_before(tree.body, outer, None);
        tree.insert_before(outer, inner, None);
        tree.active = Some(inner);

        let freed = tree.free_subtree(outer);
        assert_eq!(freed.len(), 2);
        assert!(!tree.exists(inner));
        assert!(tree.active.is_none());
        assert!(tree.get(tree.body).unwrap().children.is_empty());
    }

    #[test]
    fn document_is_never_freed() {
        let mut tree = Tree::new();
        let doc = tree.document;
        assert!(tree.free_subtree(doc).is_empty());
        assert!(tree.exists(doc));
    }

    #[test]
    fn descendants_are_preorder() {
        let mut tree = Tree::new();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let c = element(&mut tree, "c");
        tree.insert_before(tree.body, a, None);
        tree.insert_before(a, b, None);
        tree.insert_before(tree.body, c, None);
        assert_eq!(tree.descendants(tree.body), vec![a, b, c]);
    }
}
