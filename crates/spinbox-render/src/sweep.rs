#![forbid(unsafe_code)]

//! Attribute-tagged sweep: the teardown strategy for skins whose injected
//! elements are cleanly separated from caller content.
//!
//! Every element created through [`InjectedSweep::create`] is tagged with
//! [`MARKER_ATTR`]. Teardown removes tagged elements rather than replaying a
//! history, so it cannot restore an attribute that existed before `init`
//! with a different value; skins that rewrite caller attributes use
//! [`UndoStack`](crate::undo::UndoStack) instead.
//!
//! # Invariants
//!
//! 1. Teardown only removes nodes this sweep created. Marked elements that
//!    belong to another instance on the same page are left alone.
//! 2. After teardown every node this sweep created is freed, attached or not.

use spinbox_dom::{Dom, NodeId};

use crate::protocol::{MARKER_ATTR, MarkerRole};

/// Sweep-strategy bookkeeping for one skin instance.
#[derive(Debug, Default)]
pub struct InjectedSweep {
    input: Option<NodeId>,
    wrapper: Option<NodeId>,
    adopted: bool,
    /// Nodes created this cycle, in creation order.
    created: Vec<NodeId>,
    added_classes: Vec<String>,
    had_class_attr: bool,
}

impl InjectedSweep {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a build cycle around `input`.
    pub fn begin(&mut self, input: NodeId) {
        self.input = Some(input);
    }

    #[must_use]
    pub fn wrapper(&self) -> Option<NodeId> {
        self.wrapper
    }

    #[must_use]
    pub fn is_adopted(&self) -> bool {
        self.adopted
    }

    /// Create a detached element tagged with `role`.
    pub fn create(&mut self, dom: &Dom, tag: &str, role: MarkerRole) -> NodeId {
        let node = dom.create_element(tag);
        dom.set_attribute(node, MARKER_ATTR, role.as_str());
        self.created.push(node);
        node
    }

    fn owns(&self, node: NodeId) -> bool {
        self.created.contains(&node)
    }

    /// Create a wrapper at the input's position and move the input into it.
    pub fn inject_wrapper(&mut self, dom: &Dom, tag: &str, class: &str) -> Option<NodeId> {
        let input = self.input?;
        let parent = dom.parent(input)?;
        let wrapper = self.create(dom, tag, MarkerRole::Wrapper);
        if !class.is_empty() {
            dom.set_attribute(wrapper, "class", class);
        }
        dom.insert_before(parent, wrapper, Some(input));
        dom.append_child(wrapper, input);
        self.wrapper = Some(wrapper);
        self.adopted = false;
        Some(wrapper)
    }

    /// Adopt a caller-owned container: tag it and add `classes` it lacks.
    pub fn adopt_wrapper(&mut self, dom: &Dom, container: NodeId, classes: &[&str]) {
        self.had_class_attr = dom.has_attribute(container, "class");
        dom.set_attribute(container, MARKER_ATTR, MarkerRole::WrapperAdvanced.as_str());
        self.added_classes.clear();
        for class in classes {
            if dom.add_class(container, class) {
                self.added_classes.push((*class).to_string());
            }
        }
        self.wrapper = Some(container);
        self.adopted = true;
    }

    /// Remove everything this cycle injected.
    pub fn teardown(&mut self, dom: &Dom) {
        let input = self.input.take();
        if let Some(wrapper) = self.wrapper.take()
            && dom.exists(wrapper)
        {
            for node in dom.find_by_attribute(wrapper, MARKER_ATTR, None) {
                // Removing a marked ancestor already freed its marked children.
                if self.owns(node) && dom.exists(node) {
                    dom.remove(node);
                }
            }
            if self.adopted {
                self.strip_adopted(dom, wrapper);
            } else {
                self.unwrap(dom, wrapper, input);
            }
        }
        if let Some(input) = input {
            self.sweep_siblings(dom, input);
        }
        // Never attached, or moved out of reach of both passes.
        for node in std::mem::take(&mut self.created) {
            if dom.exists(node) {
                dom.remove(node);
            }
        }
        self.adopted = false;
        self.added_classes.clear();
        self.had_class_attr = false;
    }

    /// Remove own marked siblings of `input` that the wrapper pass missed.
    fn sweep_siblings(&self, dom: &Dom, input: NodeId) {
        let Some(parent) = dom.parent(input) else {
            return;
        };
        for sibling in dom.children(parent) {
            if sibling != input && self.owns(sibling) && dom.has_attribute(sibling, MARKER_ATTR) {
                dom.remove(sibling);
            }
        }
    }

    fn unwrap(&self, dom: &Dom, wrapper: NodeId, input: Option<NodeId>) {
        if let (Some(input), Some(parent)) = (input, dom.parent(wrapper))
            && dom.contains(wrapper, input)
        {
            dom.insert_before(parent, input, Some(wrapper));
        }
        dom.remove(wrapper);
    }

    fn strip_adopted(&self, dom: &Dom, wrapper: NodeId) {
        dom.remove_attribute(wrapper, MARKER_ATTR);
        for class in &self.added_classes {
            dom.remove_class(wrapper, class);
        }
        if !self.had_class_attr && dom.class_list(wrapper).is_empty() {
            dom.remove_attribute(wrapper, "class");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Dom, NodeId, NodeId) {
        let dom = Dom::new();
        let form = dom.append_element(dom.body(), "form", &[("id", "f")]);
        dom.append_element(form, "label", &[]);
        let input = dom.append_element(form, "input", &[("type", "number")]);
        dom.append_element(form, "p", &[]);
        (dom, form, input)
    }

    #[test]
    fn injected_wrapper_unwraps_in_place() {
        let (dom, form, input) = fixture();
        let before = dom.outer_html(form);

        let mut sweep = InjectedSweep::new();
        sweep.begin(input);
        let wrapper = sweep.inject_wrapper(&dom, "div", "input-group").unwrap();
        let up = sweep.create(&dom, "button", MarkerRole::Up);
        dom.append_child(wrapper, up);
        assert_eq!(dom.parent(input), Some(wrapper));

        sweep.teardown(&dom);
        assert_eq!(dom.outer_html(form), before);
        assert!(!dom.exists(up));
        assert!(!dom.exists(wrapper));
    }

    #[test]
    fn adopted_wrapper_keeps_caller_content() {
        let dom = Dom::new();
        let group = dom.append_element(dom.body(), "div", &[("class", "input-group mine")]);
        let input = dom.append_element(group, "input", &[]);
        let note = dom.append_element(group, "span", &[("class", "note")]);
        let before = dom.outer_html(group);

        let mut sweep = InjectedSweep::new();
        sweep.begin(input);
        sweep.adopt_wrapper(&dom, group, &["input-group", "spinbox-enhanced"]);
        let up = sweep.create(&dom, "button", MarkerRole::Up);
        dom.insert_before(group, up, dom.next_sibling(input));
        assert!(dom.has_class(group, "spinbox-enhanced"));

        sweep.teardown(&dom);
        assert_eq!(dom.outer_html(group), before);
        assert!(dom.exists(note));
    }

    #[test]
    fn adopted_wrapper_without_class_attribute_loses_it_again() {
        let dom = Dom::new();
        let group = dom.append_element(dom.body(), "div", &[]);
        let input = dom.append_element(group, "input", &[]);

        let mut sweep = InjectedSweep::new();
        sweep.begin(input);
        sweep.adopt_wrapper(&dom, group, &["spinbox-enhanced"]);
        sweep.teardown(&dom);
        assert!(!dom.has_attribute(group, "class"));
        assert!(!dom.has_attribute(group, MARKER_ATTR));
    }

    #[test]
    fn final_pass_removes_marked_siblings() {
        let (dom, form, input) = fixture();
        let before = dom.outer_html(form);

        let mut sweep = InjectedSweep::new();
        sweep.begin(input);
        let stray = sweep.create(&dom, "span", MarkerRole::Postfix);
        dom.insert_before(form, stray, dom.next_sibling(input));

        sweep.teardown(&dom);
        assert_eq!(dom.outer_html(form), before);
    }

    #[test]
    fn foreign_marked_siblings_survive() {
        let (dom, form, input) = fixture();
        let foreign = dom.create_element("div");
        dom.set_attribute(foreign, MARKER_ATTR, MarkerRole::Wrapper.as_str());
        dom.insert_before(form, foreign, dom.next_sibling(input));
        let before = dom.outer_html(form);

        let mut sweep = InjectedSweep::new();
        sweep.begin(input);
        let wrapper = sweep.inject_wrapper(&dom, "div", "input-group").unwrap();
        let up = sweep.create(&dom, "button", MarkerRole::Up);
        dom.append_child(wrapper, up);
        let stray = sweep.create(&dom, "span", MarkerRole::Postfix);
        dom.insert_before(form, stray, Some(foreign));

        sweep.teardown(&dom);
        assert_eq!(dom.outer_html(form), before);
        assert!(dom.exists(foreign));
    }

    #[test]
    fn unattached_nodes_are_freed() {
        let (dom, _, input) = fixture();
        let nodes = dom.node_count();
        let mut sweep = InjectedSweep::new();
        sweep.begin(input);
        let loose = sweep.create(&dom, "span", MarkerRole::Prefix);
        sweep.teardown(&dom);
        assert!(!dom.exists(loose));
        assert_eq!(dom.node_count(), nodes);
    }

    #[test]
    fn teardown_without_begin_is_noop() {
        let (dom, form, _) = fixture();
        let before = dom.outer_html(form);
        let mut sweep = InjectedSweep::new();
        sweep.teardown(&dom);
        sweep.teardown(&dom);
        assert_eq!(dom.outer_html(form), before);
    }
}
