#![forbid(unsafe_code)]

//! Tracked skin: every mutation, including those applied to the input and to
//! an adopted caller container, goes through an [`UndoStack`], so teardown
//! restores caller attributes byte for byte.

use spinbox_core::Subscription;
use spinbox_dom::{Dom, NodeId};

use super::{Look, Parts, down_face, join_classes, observe_cosmetics, set_affix_text, up_face};
use crate::protocol::{MARKER_ATTR, MarkerRole, Renderer, SpinHost};
use crate::undo::UndoStack;

/// Attribute marking a caller container the skin adopts instead of wrapping.
pub const CONTAINER_ATTR: &str = "data-spinbox-container";

/// Class added to the input while the skin is built.
const INPUT_CLASS: &str = "spinbox-input";

/// Skin whose teardown replays a LIFO [`UndoStack`].
#[derive(Debug, Default)]
pub struct TrackedRenderer {
    undo: UndoStack,
    wrapper: Option<NodeId>,
    parts: Option<Parts>,
    subscriptions: Vec<Subscription>,
}

impl TrackedRenderer {
    pub(crate) const LOOK: Look = Look {
        wrapper: "spinbox-group",
        enhanced: "spinbox-group",
        prefix: "spinbox-addon spinbox-prefix",
        postfix: "spinbox-addon spinbox-postfix",
        vertical: "spinbox-vertical",
        up: "spinbox-up",
        down: "spinbox-down",
    };

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded operations awaiting teardown.
    #[must_use]
    pub fn pending_ops(&self) -> usize {
        self.undo.len()
    }

    fn element(&mut self, dom: &Dom, tag: &str, role: MarkerRole, class: &str) -> NodeId {
        let node = self.undo.create_element(dom, tag);
        self.undo.set_attribute(dom, node, MARKER_ATTR, role.as_str());
        if !class.is_empty() {
            self.undo.set_attribute(dom, node, "class", class);
        }
        node
    }

    fn button(
        &mut self,
        dom: &Dom,
        role: MarkerRole,
        face: (String, String),
        focusable: bool,
    ) -> NodeId {
        let (class, text) = face;
        let button = self.element(dom, "button", role, &class);
        self.undo.set_attribute(dom, button, "type", "button");
        if !focusable {
            self.undo.set_attribute(dom, button, "tabindex", "-1");
        }
        dom.set_text_content(button, &text);
        button
    }
}

impl Renderer for TrackedRenderer {
    fn name(&self) -> &'static str {
        "tracked"
    }

    fn init(&mut self, host: &dyn SpinHost) {
        let dom = host.dom();
        if self.parts.is_some() || !self.undo.is_empty() {
            self.teardown(&dom);
        }
        let input = host.input();
        let settings = host.settings();
        let look = Self::LOOK;
        let Some(parent) = dom.parent(input) else {
            tracing::debug!(message = "spinbox.render.detached", renderer = self.name());
            return;
        };

        let adopted = dom.has_attribute(parent, CONTAINER_ATTR);
        let container = if adopted {
            self.undo.add_class(&dom, parent, look.enhanced);
            self.undo.set_attribute(&dom, parent, "role", "group");
            self.undo
                .set_attribute(&dom, parent, MARKER_ATTR, MarkerRole::WrapperAdvanced.as_str());
            parent
        } else {
            let wrapper = self.element(&dom, "div", MarkerRole::Wrapper, look.wrapper);
            self.undo.set_attribute(&dom, wrapper, "role", "group");
            self.undo.move_before(&dom, wrapper, parent, Some(input));
            self.undo.move_before(&dom, input, wrapper, None);
            wrapper
        };
        self.undo.add_class(&dom, input, INPUT_CLASS);

        let prefix = self.element(
            &dom,
            "span",
            MarkerRole::Prefix,
            &join_classes(&[look.prefix, settings.prefix_extraclass.as_str()]),
        );
        set_affix_text(&dom, prefix, &settings.prefix);
        let postfix = self.element(
            &dom,
            "span",
            MarkerRole::Postfix,
            &join_classes(&[look.postfix, settings.postfix_extraclass.as_str()]),
        );
        set_affix_text(&dom, postfix, &settings.postfix);
        self.undo.move_before(&dom, prefix, container, Some(input));
        self.undo
            .move_before(&dom, postfix, container, dom.next_sibling(input));

        let focusable = settings.focusablebuttons;
        let up = self.button(&dom, MarkerRole::Up, up_face(&look, &settings), focusable);
        let down = self.button(&dom, MarkerRole::Down, down_face(&look, &settings), focusable);
        let vertical = if settings.verticalbuttons {
            let stack = self.element(&dom, "div", MarkerRole::VerticalWrapper, look.vertical);
            self.undo.move_before(&dom, up, stack, None);
            self.undo.move_before(&dom, down, stack, None);
            self.undo
                .move_before(&dom, stack, container, dom.next_sibling(postfix));
            Some(stack)
        } else {
            self.undo.move_before(&dom, down, container, Some(prefix));
            self.undo
                .move_before(&dom, up, container, dom.next_sibling(postfix));
            None
        };

        host.attach_up_events(up);
        host.attach_down_events(down);

        let parts = Parts {
            up,
            down,
            prefix,
            postfix,
        };
        self.subscriptions = observe_cosmetics(host, look, parts);
        self.parts = Some(parts);
        self.wrapper = Some(container);
        tracing::debug!(
            message = "spinbox.render.init",
            renderer = self.name(),
            adopted,
            vertical = vertical.is_some(),
            ops = self.undo.len()
        );
    }

    fn teardown(&mut self, dom: &Dom) {
        self.subscriptions.clear();
        self.parts = None;
        self.wrapper = None;
        let ops = self.undo.len();
        self.undo.teardown(dom);
        if ops > 0 {
            tracing::debug!(message = "spinbox.render.teardown", renderer = self.name(), ops);
        }
    }

    fn wrapper(&self) -> Option<NodeId> {
        self.wrapper
    }
}
