#![forbid(unsafe_code)]

//! Public handle to a spin box instance.

use std::fmt;
use std::rc::Rc;

use spinbox_core::{
    PartialSettings, Result, Settings, SpinEvent, StepDirection, Subscription, UnknownEvent,
};
use spinbox_dom::{Dom, NodeId};
use spinbox_render::Renderer;

use crate::engine::{Engine, Phase};
use crate::registry;

/// A numeric spin box attached to one `<input>`.
///
/// Cloning yields another handle to the same instance. The instance stays
/// registered (and its listeners stay live) until [`SpinBox::destroy`],
/// whether or not any handle is kept.
#[derive(Clone)]
pub struct SpinBox {
    engine: Rc<Engine>,
}

impl fmt::Debug for SpinBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinBox")
            .field("input", &self.engine.input)
            .field("renderer", &self.engine.renderer_name())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl PartialEq for SpinBox {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.engine, &other.engine)
    }
}

impl SpinBox {
    /// Attach a headless instance (keyboard, wheel, and API; no buttons).
    ///
    /// Settings resolve as defaults < native `min`/`max`/`step` <
    /// `data-bts-*` attributes < `options`. An existing instance on the same
    /// input is destroyed first.
    ///
    /// # Errors
    ///
    /// Fails with no side effects when `input` is missing, is not an
    /// `<input>`, or has a type that cannot hold a number.
    pub fn create(dom: &Dom, input: NodeId, options: PartialSettings) -> Result<Self> {
        let engine = Engine::create(dom, input, &options, None)?;
        Ok(Self { engine })
    }

    /// Attach an instance and build `renderer` around the input.
    ///
    /// # Errors
    ///
    /// Same as [`SpinBox::create`]; the renderer is not touched on failure.
    pub fn create_with_renderer(
        dom: &Dom,
        input: NodeId,
        options: PartialSettings,
        renderer: Box<dyn Renderer>,
    ) -> Result<Self> {
        let engine = Engine::create(dom, input, &options, Some(renderer))?;
        Ok(Self { engine })
    }

    /// The live instance attached to `input`, if any.
    #[must_use]
    pub fn find(dom: &Dom, input: NodeId) -> Option<Self> {
        registry::get((dom.id(), input)).map(|engine| Self { engine })
    }

    // ── Value ───────────────────────────────────────────────────────────────

    /// Current numeric value; NaN when the text does not parse.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.engine.value()
    }

    /// Constrain `value` and write it. NaN is ignored.
    pub fn set_value(&self, value: f64) {
        self.engine.set_value(value);
    }

    /// Parse `text` (through the before-calculation hook) and write it.
    pub fn set_value_text(&self, text: &str) {
        self.engine.set_value_text(text);
    }

    pub fn up_once(&self) {
        self.engine.step(StepDirection::Up, 0);
    }

    pub fn down_once(&self) {
        self.engine.step(StepDirection::Down, 0);
    }

    /// Re-apply the numeric rules to the typed text, as on blur.
    pub fn commit(&self) {
        self.engine.commit();
    }

    // ── Spin ────────────────────────────────────────────────────────────────

    pub fn start_up_spin(&self) {
        self.engine.start_spin(StepDirection::Up);
    }

    pub fn start_down_spin(&self) {
        self.engine.start_spin(StepDirection::Down);
    }

    pub fn stop_spin(&self) {
        self.engine.stop_spin();
    }

    #[must_use]
    pub fn spinning(&self) -> Option<StepDirection> {
        self.engine.spinning()
    }

    #[must_use]
    pub fn spin_count(&self) -> u32 {
        self.engine.spin_count()
    }

    // ── Settings ────────────────────────────────────────────────────────────

    /// Merge `partial` into the current settings. Keys absent from `partial`
    /// keep their values.
    pub fn update_settings(&self, partial: &PartialSettings) {
        self.engine.update_settings(partial);
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.engine.settings()
    }

    // ── Events ──────────────────────────────────────────────────────────────

    /// Listen for a lifecycle event. Dropping the subscription unsubscribes.
    pub fn on(&self, event: SpinEvent, handler: impl Fn(&SpinEvent) + 'static) -> Subscription {
        if self.is_destroyed() {
            return Subscription::empty();
        }
        self.engine.events.subscribe(event, handler)
    }

    /// [`SpinBox::on`] by event name (`"min"`, `"start-up"`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`UnknownEvent`] for a name that is not a lifecycle event.
    pub fn on_named(
        &self,
        name: &str,
        handler: impl Fn(&SpinEvent) + 'static,
    ) -> std::result::Result<Subscription, UnknownEvent> {
        let event: SpinEvent = name.parse()?;
        Ok(self.on(event, handler))
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Tear everything down. Repeated calls are no-ops.
    pub fn destroy(&self) {
        self.engine.destroy();
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.engine.phase() != Phase::Live
    }

    #[must_use]
    pub fn input(&self) -> NodeId {
        self.engine.input
    }

    #[must_use]
    pub fn dom(&self) -> Dom {
        self.engine.dom.clone()
    }

    /// Root element of the renderer, while one is built.
    #[must_use]
    pub fn wrapper(&self) -> Option<NodeId> {
        self.engine.wrapper()
    }

    #[must_use]
    pub fn renderer_name(&self) -> Option<&'static str> {
        self.engine.renderer_name()
    }
}
