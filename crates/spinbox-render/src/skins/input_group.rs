#![forbid(unsafe_code)]

//! Input-group skin: wraps the input in `div.input-group` (or adopts an
//! existing `.input-group` parent) and tears down by attribute sweep.

use spinbox_core::Subscription;
use spinbox_dom::{Dom, NodeId};

use super::{
    Look, Parts, down_face, join_classes, observe_cosmetics, set_affix_text, set_focusable, up_face,
};
use crate::protocol::{MarkerRole, Renderer, SpinHost};
use crate::sweep::InjectedSweep;

/// Class marking a caller container the skin adopts instead of wrapping.
pub const ADOPT_CLASS: &str = "input-group";

/// Skin built from input-group markup, torn down by [`InjectedSweep`].
#[derive(Debug, Default)]
pub struct InputGroupRenderer {
    sweep: InjectedSweep,
    parts: Option<Parts>,
    subscriptions: Vec<Subscription>,
}

impl InputGroupRenderer {
    pub(crate) const LOOK: Look = Look {
        wrapper: "input-group spinbox",
        enhanced: "spinbox-enhanced",
        prefix: "input-group-text spinbox-prefix",
        postfix: "input-group-text spinbox-postfix",
        vertical: "input-group-btn-vertical",
        up: "spinbox-up",
        down: "spinbox-down",
    };

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn button(
        &mut self,
        dom: &Dom,
        role: MarkerRole,
        face: (String, String),
        focusable: bool,
    ) -> NodeId {
        let (class, text) = face;
        let button = self.sweep.create(dom, "button", role);
        dom.set_attribute(button, "type", "button");
        dom.set_attribute(button, "class", &class);
        set_focusable(dom, button, focusable);
        dom.set_text_content(button, &text);
        button
    }

    fn affix(&mut self, dom: &Dom, role: MarkerRole, class: String, text: &str) -> NodeId {
        let span = self.sweep.create(dom, "span", role);
        dom.set_attribute(span, "class", &class);
        set_affix_text(dom, span, text);
        span
    }
}

impl Renderer for InputGroupRenderer {
    fn name(&self) -> &'static str {
        "input-group"
    }

    fn init(&mut self, host: &dyn SpinHost) {
        let dom = host.dom();
        if self.parts.is_some() {
            self.teardown(&dom);
        }
        let input = host.input();
        let settings = host.settings();
        let look = Self::LOOK;
        let Some(parent) = dom.parent(input) else {
            tracing::debug!(message = "spinbox.render.detached", renderer = self.name());
            return;
        };

        self.sweep.begin(input);
        let container = if dom.has_class(parent, ADOPT_CLASS) {
            self.sweep.adopt_wrapper(&dom, parent, &[look.enhanced]);
            parent
        } else {
            match self.sweep.inject_wrapper(&dom, "div", look.wrapper) {
                Some(wrapper) => wrapper,
                None => return,
            }
        };

        let prefix = self.affix(
            &dom,
            MarkerRole::Prefix,
            join_classes(&[look.prefix, settings.prefix_extraclass.as_str()]),
            &settings.prefix,
        );
        let postfix = self.affix(
            &dom,
            MarkerRole::Postfix,
            join_classes(&[look.postfix, settings.postfix_extraclass.as_str()]),
            &settings.postfix,
        );
        dom.insert_before(container, prefix, Some(input));
        dom.insert_before(container, postfix, dom.next_sibling(input));

        let focusable = settings.focusablebuttons;
        let up = self.button(&dom, MarkerRole::Up, up_face(&look, &settings), focusable);
        let down = self.button(&dom, MarkerRole::Down, down_face(&look, &settings), focusable);
        let vertical = if settings.verticalbuttons {
            let stack = self.sweep.create(&dom, "span", MarkerRole::VerticalWrapper);
            dom.set_attribute(stack, "class", look.vertical);
            dom.append_child(stack, up);
            dom.append_child(stack, down);
            dom.insert_before(container, stack, dom.next_sibling(postfix));
            Some(stack)
        } else {
            dom.insert_before(container, down, Some(prefix));
            dom.insert_before(container, up, dom.next_sibling(postfix));
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
        tracing::debug!(
            message = "spinbox.render.init",
            renderer = self.name(),
            adopted = self.sweep.is_adopted(),
            vertical = vertical.is_some()
        );
    }

    fn teardown(&mut self, dom: &Dom) {
        self.subscriptions.clear();
        let built = self.parts.take().is_some();
        self.sweep.teardown(dom);
        if built {
            tracing::debug!(message = "spinbox.render.teardown", renderer = self.name());
        }
    }

    fn wrapper(&self) -> Option<NodeId> {
        self.sweep.wrapper()
    }
}
