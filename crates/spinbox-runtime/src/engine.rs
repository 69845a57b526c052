#![forbid(unsafe_code)]

//! The value engine bound to one input element.
//!
//! The engine reads and writes the input's text, applies the numeric rules
//! from `spinbox-core`, and notifies listeners. It is shared behind an `Rc`;
//! DOM listeners and timers only hold a `Weak`.
//!
//! # Invariants
//!
//! 1. No `RefCell` borrow of engine state is held while user code runs
//!    (DOM dispatch, value hooks, observers, event listeners, renderer calls).
//! 2. A step writes the input only when the value actually changes, and every
//!    write dispatches exactly one bubbling `change`.
//! 3. After `destroy` the engine never writes to the DOM again, and no timer
//!    or listener it installed remains.
//!
//! # Failure Modes
//!
//! - **Re-entrant destroy** (from a stop handler fired by destroy): the inner
//!   call is a no-op.
//! - **Unparsable text**: stepping seeds from `firstclickvalueifempty`;
//!   committing falls back to `replacementval`, then 0.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use spinbox_core::{
    KeyedListeners, PartialSettings, Result, SettingKey, SettingValue, Settings, SpinError,
    SpinEvent, StepDirection, constrain, format_fixed, next_value, parse_number, sanitize,
};
use spinbox_dom::{Dom, DomEvent, NodeId};
use spinbox_render::Renderer;

use crate::binder::{self, Bindings};
use crate::native::NativeAttrs;
use crate::registry;
use crate::spin::SpinState;

/// Input types that can hold a number.
const ACCEPTED_TYPES: [&str; 5] = ["", "text", "number", "tel", "search"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Live,
    /// Inside `destroy`; stop events may still fire.
    Destroying,
    Destroyed,
}

#[derive(Debug)]
pub(crate) struct EngineState {
    pub(crate) settings: Settings,
    pub(crate) spin: SpinState,
    pub(crate) phase: Phase,
    pub(crate) bindings: Bindings,
    pub(crate) native: NativeAttrs,
    /// Display text at the last commit or write.
    pub(crate) last_committed: String,
}

pub(crate) struct Engine {
    pub(crate) dom: Dom,
    pub(crate) input: NodeId,
    this: Weak<Engine>,
    pub(crate) state: RefCell<EngineState>,
    pub(crate) events: KeyedListeners<SpinEvent, SpinEvent>,
    pub(crate) observers: KeyedListeners<SettingKey, SettingValue>,
    renderer: RefCell<Option<Box<dyn Renderer>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Engine")
            .field("dom", &self.dom.id())
            .field("input", &self.input)
            .field("phase", &state.phase)
            .field("spin", &state.spin)
            .field("events", &self.events)
            .field("observers", &self.observers)
            .finish()
    }
}

impl Engine {
    // ── Construction ────────────────────────────────────────────────────────

    pub(crate) fn create(
        dom: &Dom,
        input: NodeId,
        options: &PartialSettings,
        renderer: Option<Box<dyn Renderer>>,
    ) -> Result<Rc<Self>> {
        validate(dom, input)?;

        let key = (dom.id(), input);
        if let Some(existing) = registry::get(key) {
            tracing::debug!(message = "spinbox.replace", input = input.raw());
            existing.destroy();
        }

        let markup = PartialSettings::from_attributes(&dom.attributes(input));
        let settings = sanitize(&markup.merged(options), &Settings::default());
        let native = NativeAttrs::capture(dom, input);

        let engine = Rc::new_cyclic(|this| Self {
            dom: dom.clone(),
            input,
            this: this.clone(),
            state: RefCell::new(EngineState {
                settings,
                spin: SpinState::default(),
                phase: Phase::Live,
                bindings: Bindings::default(),
                native,
                last_committed: String::new(),
            }),
            events: KeyedListeners::new(),
            observers: KeyedListeners::new(),
            renderer: RefCell::new(None),
        });

        engine.seed_display();
        {
            let state = engine.state.borrow();
            state.native.sync_bounds(dom, input, &state.settings);
        }
        let element = binder::bind_element(&engine);
        engine.state.borrow_mut().bindings.element = element;

        let renderer_name = renderer.as_ref().map(|r| r.name());
        if let Some(mut renderer) = renderer {
            renderer.init(&*engine);
            *engine.renderer.borrow_mut() = Some(renderer);
        }

        registry::insert(key, Rc::clone(&engine));
        tracing::debug!(
            message = "spinbox.create",
            input = input.raw(),
            renderer = renderer_name.unwrap_or("none"),
        );
        Ok(engine)
    }

    /// Apply `initval` to an empty input and normalize the initial text.
    /// Silent: no `change` is dispatched.
    fn seed_display(&self) {
        let settings = self.settings();
        if self.raw_text().trim().is_empty() && !settings.initval.trim().is_empty() {
            self.dom.set_value(self.input, &settings.initval);
        }
        let raw = self.raw_text();
        let value = self.parse_raw(&raw, &settings);
        let display = if value.is_nan() {
            raw
        } else {
            display_text(constrain(value, &settings), &settings)
        };
        if self.raw_text() != display {
            self.dom.set_value(self.input, &display);
        }
        let mut state = self.state.borrow_mut();
        state.native.sync_display(&self.dom, self.input, &display);
        state.last_committed = display;
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub(crate) fn weak(&self) -> Weak<Self> {
        self.this.clone()
    }

    pub(crate) fn settings(&self) -> Settings {
        self.state.borrow().settings.clone()
    }

    pub(crate) fn with_settings<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        f(&self.state.borrow().settings)
    }

    pub(crate) fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub(crate) fn is_live(&self) -> bool {
        self.phase() == Phase::Live
    }

    /// Steps and spins are ignored on a disabled or readonly input.
    pub(crate) fn is_locked(&self) -> bool {
        self.dom.has_attribute(self.input, "disabled")
            || self.dom.has_attribute(self.input, "readonly")
    }

    pub(crate) fn wrapper(&self) -> Option<NodeId> {
        self.renderer.borrow().as_ref().and_then(|r| r.wrapper())
    }

    pub(crate) fn renderer_name(&self) -> Option<&'static str> {
        self.renderer.borrow().as_ref().map(|r| r.name())
    }

    fn raw_text(&self) -> String {
        self.dom.value(self.input)
    }

    /// Parse input text after the before-calculation hook.
    fn parse_raw(&self, raw: &str, settings: &Settings) -> f64 {
        match &settings.callback_before_calculation {
            Some(hook) => parse_number(&hook.apply(raw)),
            None => parse_number(raw),
        }
    }

    // ── Value ───────────────────────────────────────────────────────────────

    pub(crate) fn value(&self) -> f64 {
        let settings = self.settings();
        self.parse_raw(&self.raw_text(), &settings)
    }

    pub(crate) fn set_value(&self, value: f64) {
        if !self.is_live() || value.is_nan() {
            return;
        }
        let settings = self.settings();
        self.write_number(constrain(value, &settings), &settings);
    }

    pub(crate) fn set_value_text(&self, text: &str) {
        let settings = self.settings();
        self.set_value(self.parse_raw(text, &settings));
    }

    /// Write `value` if it differs from the current value. Returns whether
    /// the input changed.
    fn write_number(&self, value: f64, settings: &Settings) -> bool {
        if self.value() == value {
            return false;
        }
        let display = display_text(value, settings);
        self.dom.set_value(self.input, &display);
        {
            let mut state = self.state.borrow_mut();
            state.native.sync_display(&self.dom, self.input, &display);
            state.last_committed = display;
        }
        self.dom.dispatch(self.input, DomEvent::bubbling("change"));
        true
    }

    /// One step in `direction` at boost level `spincount`. Returns whether an
    /// active spin should keep going.
    pub(crate) fn step(&self, direction: StepDirection, spincount: u32) -> bool {
        if !self.is_live() || self.is_locked() {
            return false;
        }
        let settings = self.settings();
        let next = next_value(self.value(), direction, &settings, spincount);
        if next.is_nan() {
            return false;
        }
        let changed = self.write_number(next, &settings);
        let at_bound = direction.at_bound(next, &settings);
        tracing::trace!(
            message = "spinbox.step",
            direction = ?direction,
            value = next,
            changed,
            at_bound,
        );
        if changed && at_bound {
            self.emit(direction.bound_event());
        }
        changed && !at_bound
    }

    /// Re-apply the numeric rules to the typed text (blur / Enter).
    pub(crate) fn commit(&self) {
        if !self.is_live() {
            return;
        }
        let settings = self.settings();
        let raw = self.raw_text();
        let shown = if raw.trim().is_empty() && settings.replacementval.trim().is_empty() {
            String::new()
        } else {
            let mut value = if raw.trim().is_empty() {
                f64::NAN
            } else {
                self.parse_raw(&raw, &settings)
            };
            if value.is_nan() {
                value = parse_number(&settings.replacementval);
            }
            if value.is_nan() {
                value = 0.0;
            }
            display_text(constrain(value, &settings), &settings)
        };

        if shown != raw {
            self.dom.set_value(self.input, &shown);
        }
        let changed = {
            let mut state = self.state.borrow_mut();
            state.native.sync_display(&self.dom, self.input, &shown);
            if state.last_committed == shown {
                false
            } else {
                state.last_committed.clone_from(&shown);
                true
            }
        };
        tracing::trace!(message = "spinbox.commit", raw = %raw, shown = %shown, changed);
        if changed {
            self.dom.dispatch(self.input, DomEvent::bubbling("change"));
        }
    }

    // ── Events ──────────────────────────────────────────────────────────────

    /// Notify listeners, then dispatch the bubbling DOM event from the input.
    pub(crate) fn emit(&self, event: SpinEvent) {
        if self.phase() == Phase::Destroyed {
            return;
        }
        self.events.emit(&event, &event);
        self.dom
            .dispatch(self.input, DomEvent::bubbling(event.dom_type()));
    }

    // ── Settings ────────────────────────────────────────────────────────────

    pub(crate) fn update_settings(&self, partial: &PartialSettings) {
        if !self.is_live() {
            return;
        }
        let (previous, next) = {
            let mut state = self.state.borrow_mut();
            let previous = state.settings.clone();
            let next = sanitize(partial, &previous);
            state.settings = next.clone();
            state.native.sync_bounds(&self.dom, self.input, &next);
            (previous, next)
        };
        let changed = previous.changed_keys(&next);
        if changed.is_empty() {
            return;
        }
        tracing::debug!(
            message = "spinbox.settings.update",
            input = self.input.raw(),
            changed = changed.len(),
        );

        for key in &changed {
            self.observers.emit(key, &next.get(*key));
        }
        if changed.iter().any(|k| k.is_structural()) {
            self.rebuild_renderer();
        }
        let revalidate = changed.iter().any(|k| {
            k.affects_value()
                || matches!(
                    k,
                    SettingKey::CallbackBeforeCalculation | SettingKey::CallbackAfterCalculation
                )
        });
        if revalidate {
            self.commit();
        }
    }

    fn rebuild_renderer(&self) {
        let taken = self.renderer.borrow_mut().take();
        let Some(mut renderer) = taken else {
            return;
        };
        let buttons = std::mem::take(&mut self.state.borrow_mut().bindings.buttons);
        binder::release(&self.dom, buttons);
        renderer.teardown(&self.dom);
        renderer.init(self);
        tracing::debug!(
            message = "spinbox.renderer.rebuild",
            input = self.input.raw(),
            renderer = renderer.name(),
        );
        *self.renderer.borrow_mut() = Some(renderer);
    }

    // ── Teardown ────────────────────────────────────────────────────────────

    /// Stop, unbind, tear the renderer down, restore native attributes, and
    /// unregister. Idempotent.
    pub(crate) fn destroy(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.phase != Phase::Live {
                return;
            }
            state.phase = Phase::Destroying;
        }
        self.stop_spin();

        let bindings = {
            let mut state = self.state.borrow_mut();
            state.phase = Phase::Destroyed;
            std::mem::take(&mut state.bindings)
        };
        bindings.release(&self.dom);

        let renderer = self.renderer.borrow_mut().take();
        if let Some(mut renderer) = renderer {
            renderer.teardown(&self.dom);
        }
        let relaxed = {
            let mut state = self.state.borrow_mut();
            let relaxed = state.native.is_relaxed();
            state.native.restore(&self.dom, self.input);
            relaxed
        };

        self.events.clear();
        self.observers.clear();
        registry::remove((self.dom.id(), self.input), self);
        tracing::debug!(message = "spinbox.destroy", input = self.input.raw(), relaxed);
    }
}

/// Fixed-point text for `value`, passed through the after-calculation hook.
fn display_text(value: f64, settings: &Settings) -> String {
    let text = format_fixed(value, settings.decimals);
    match &settings.callback_after_calculation {
        Some(hook) => hook.apply(&text),
        None => text,
    }
}

fn validate(dom: &Dom, input: NodeId) -> Result<()> {
    if !dom.exists(input) {
        return Err(SpinError::MissingElement { node: input.raw() });
    }
    let tag = dom.tag_name(input).unwrap_or_else(|| "#text".to_string());
    if !tag.eq_ignore_ascii_case("input") {
        return Err(SpinError::not_an_input(tag));
    }
    let input_type = dom
        .get_attribute(input, "type")
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ACCEPTED_TYPES.contains(&input_type.as_str()) {
        return Err(SpinError::UnsupportedInputType { input_type });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinbox_core::ValueHook;

    fn input(dom: &Dom, attrs: &[(&str, &str)]) -> NodeId {
        dom.append_element(dom.body(), "input", attrs)
    }

    #[test]
    fn validate_rejects_non_inputs() {
        let dom = Dom::new();
        let div = dom.append_element(dom.body(), "div", &[]);
        assert_eq!(validate(&dom, div), Err(SpinError::not_an_input("div")));

        let checkbox = input(&dom, &[("type", "Checkbox")]);
        assert_eq!(
            validate(&dom, checkbox),
            Err(SpinError::UnsupportedInputType {
                input_type: "checkbox".into()
            })
        );

        let gone = input(&dom, &[]);
        dom.remove(gone);
        assert!(matches!(
            validate(&dom, gone),
            Err(SpinError::MissingElement { .. })
        ));
        assert_eq!(validate(&dom, input(&dom, &[("type", "tel")])), Ok(()));
    }

    #[test]
    fn display_text_applies_after_hook() {
        let settings = Settings {
            decimals: 2,
            callback_after_calculation: Some(ValueHook::new(|t| format!("{t} kg"))),
            ..Settings::default()
        };
        assert_eq!(display_text(1.5, &settings), "1.50 kg");
    }

    #[test]
    fn seed_normalizes_without_change_event() {
        let dom = Dom::new();
        let el = input(&dom, &[("value", "7.4")]);
        let changes = Rc::new(std::cell::Cell::new(0));
        let counter = Rc::clone(&changes);
        dom.add_event_listener(el, "change", move |_| counter.set(counter.get() + 1));

        let engine = Engine::create(&dom, el, &PartialSettings::new(), None).unwrap();
        assert_eq!(dom.value(el), "7");
        assert_eq!(changes.get(), 0);
        engine.destroy();
    }
}
