#![forbid(unsafe_code)]

//! DOM event bindings.
//!
//! | Target   | Events                                       | Action            |
//! |----------|----------------------------------------------|-------------------|
//! | input    | `keydown` ArrowUp / ArrowDown (not repeats)  | start spin        |
//! | input    | `keydown` Enter, `blur`                      | commit            |
//! | input    | `keyup` ArrowUp / ArrowDown                  | stop spin         |
//! | input    | `wheel` (focused, `mousewheel` on)           | one step          |
//! | document | `mouseup`, `touchend`, `touchcancel`         | stop spin         |
//! | button   | `mousedown`, `touchstart`                    | start spin        |
//! | button   | `mouseup`, `mouseleave`, `touchend`, `touchcancel` | stop spin   |
//!
//! Every closure holds a `Weak<Engine>`; a listener that outlives its
//! engine does nothing.

use std::rc::Weak;

use spinbox_core::StepDirection;
use spinbox_dom::{Dom, DomEvent, ListenerId, NodeId};

use crate::engine::Engine;

const RELEASE_EVENTS: [&str; 3] = ["mouseup", "touchend", "touchcancel"];

/// Listener ids installed for one engine.
#[derive(Debug, Default)]
pub(crate) struct Bindings {
    /// Input and document listeners, live for the whole engine lifetime.
    pub(crate) element: Vec<ListenerId>,
    /// Button listeners, replaced on every renderer build.
    pub(crate) buttons: Vec<ListenerId>,
}

impl Bindings {
    pub(crate) fn release(self, dom: &Dom) {
        release(dom, self.element);
        release(dom, self.buttons);
    }
}

pub(crate) fn release(dom: &Dom, ids: Vec<ListenerId>) {
    for id in ids {
        dom.remove_event_listener(id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Spin(StepDirection),
    Commit,
}

fn key_action(event: &DomEvent) -> Option<KeyAction> {
    match event.key_name()? {
        "ArrowUp" => Some(KeyAction::Spin(StepDirection::Up)),
        "ArrowDown" => Some(KeyAction::Spin(StepDirection::Down)),
        "Enter" => Some(KeyAction::Commit),
        _ => None,
    }
}

fn on(
    dom: &Dom,
    node: NodeId,
    kind: &str,
    engine: &Weak<Engine>,
    handler: impl Fn(&Engine, &mut DomEvent) + 'static,
) -> ListenerId {
    let engine = engine.clone();
    dom.add_event_listener(node, kind, move |event| {
        if let Some(engine) = engine.upgrade() {
            handler(engine.as_ref(), event);
        }
    })
}

/// Bind the input and document listeners.
pub(crate) fn bind_element(engine: &Engine) -> Vec<ListenerId> {
    let dom = &engine.dom;
    let input = engine.input;
    let weak = engine.weak();
    let mut ids = Vec::with_capacity(8);

    ids.push(on(dom, input, "keydown", &weak, |engine, event| {
        match key_action(event) {
            Some(KeyAction::Spin(direction)) => {
                event.prevent_default();
                if !event.is_repeat() {
                    engine.start_spin(direction);
                }
            }
            Some(KeyAction::Commit) => engine.commit(),
            None => {}
        }
    }));
    ids.push(on(dom, input, "keyup", &weak, |engine, event| {
        if matches!(key_action(event), Some(KeyAction::Spin(_))) {
            engine.stop_spin();
        }
    }));
    ids.push(on(dom, input, "wheel", &weak, |engine, event| {
        let Some(delta) = event.wheel_delta() else {
            return;
        };
        if !engine.with_settings(|s| s.mousewheel)
            || engine.dom.active_element() != Some(engine.input)
        {
            return;
        }
        event.prevent_default();
        if delta < 0.0 {
            engine.step(StepDirection::Up, 0);
        } else if delta > 0.0 {
            engine.step(StepDirection::Down, 0);
        }
    }));
    ids.push(on(dom, input, "blur", &weak, |engine, _| engine.commit()));

    let document = dom.document();
    for kind in RELEASE_EVENTS {
        ids.push(on(dom, document, kind, &weak, |engine, _| engine.stop_spin()));
    }
    ids
}

/// Bind press-and-hold listeners on a skin button.
pub(crate) fn bind_button(engine: &Engine, button: NodeId, direction: StepDirection) -> Vec<ListenerId> {
    let dom = &engine.dom;
    let weak = engine.weak();
    let mut ids = Vec::with_capacity(6);

    for kind in ["mousedown", "touchstart"] {
        ids.push(on(dom, button, kind, &weak, move |engine, event| {
            event.prevent_default();
            engine.start_spin(direction);
        }));
    }
    for kind in RELEASE_EVENTS.into_iter().chain(["mouseleave"]) {
        ids.push(on(dom, button, kind, &weak, |engine, _| engine.stop_spin()));
    }
    ids
}
