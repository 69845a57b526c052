#![forbid(unsafe_code)]

//! The renderer-facing surface of a live engine.

use spinbox_core::{SettingKey, Settings, StepDirection, Subscription};
use spinbox_dom::{Dom, NodeId};
use spinbox_render::{SettingHandler, SpinHost};

use crate::binder;
use crate::engine::Engine;

impl SpinHost for Engine {
    fn dom(&self) -> Dom {
        self.dom.clone()
    }

    fn input(&self) -> NodeId {
        self.input
    }

    fn settings(&self) -> Settings {
        Engine::settings(self)
    }

    fn attach_up_events(&self, button: NodeId) {
        self.attach_button(button, StepDirection::Up);
    }

    fn attach_down_events(&self, button: NodeId) {
        self.attach_button(button, StepDirection::Down);
    }

    fn observe_setting(&self, key: SettingKey, handler: SettingHandler) -> Subscription {
        if !self.is_live() {
            return Subscription::empty();
        }
        self.observers.subscribe(key, move |value| handler(value))
    }
}

impl Engine {
    fn attach_button(&self, button: NodeId, direction: StepDirection) {
        if !self.is_live() {
            return;
        }
        let ids = binder::bind_button(self, button, direction);
        self.state.borrow_mut().bindings.buttons.extend(ids);
    }
}
