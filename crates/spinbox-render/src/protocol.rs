#![forbid(unsafe_code)]

//! Contract between the engine and a visual skin.
//!
//! The engine owns numeric behavior; a [`Renderer`] owns DOM structure. The
//! two meet through [`SpinHost`], the renderer-facing slice of the engine.
//!
//! # Invariants
//!
//! 1. Every element a renderer injects carries [`MARKER_ATTR`] with a
//!    [`MarkerRole`] value. Automation locates widget internals only through
//!    this attribute.
//! 2. After `teardown`, the input is back under the container that held it
//!    before `init`, every injected element is gone, and caller-owned nodes
//!    are unchanged.
//! 3. `init` → `teardown` may repeat any number of times; each cycle ends in
//!    the same DOM state as a single cycle.
//!
//! # Failure Modes
//!
//! - **Teardown without init / twice**: a no-op.
//! - **Nodes removed by the host mid-life**: teardown skips ids that no
//!   longer resolve.

use std::fmt;

use spinbox_core::{SettingKey, SettingValue, Settings, Subscription};
use spinbox_dom::{Dom, NodeId};

/// Marker attribute carried by every injected element.
pub const MARKER_ATTR: &str = "data-spinbox-injected";

/// Role of an injected element, stored as the [`MARKER_ATTR`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    Up,
    Down,
    Prefix,
    Postfix,
    /// Wrapper element created by the renderer.
    Wrapper,
    /// Caller-owned container adopted by the renderer.
    WrapperAdvanced,
    /// Container of vertically stacked buttons.
    VerticalWrapper,
}

impl MarkerRole {
    pub const ALL: [Self; 7] = [
        Self::Up,
        Self::Down,
        Self::Prefix,
        Self::Postfix,
        Self::Wrapper,
        Self::WrapperAdvanced,
        Self::VerticalWrapper,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Prefix => "prefix",
            Self::Postfix => "postfix",
            Self::Wrapper => "wrapper",
            Self::WrapperAdvanced => "wrapper-advanced",
            Self::VerticalWrapper => "vertical-wrapper",
        }
    }

    /// Role of a marked element, if `value` is a known role.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

impl fmt::Display for MarkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First element under `root` carrying `role`.
#[must_use]
pub fn find_marked(dom: &Dom, root: NodeId, role: MarkerRole) -> Option<NodeId> {
    dom.find_by_attribute(root, MARKER_ATTR, Some(role.as_str()))
        .into_iter()
        .next()
}

/// Observer callback for one setting.
pub type SettingHandler = Box<dyn Fn(&SettingValue)>;

/// Renderer-facing surface of a live engine.
pub trait SpinHost {
    fn dom(&self) -> Dom;

    /// The input element the engine is attached to.
    fn input(&self) -> NodeId;

    /// Snapshot of the current sanitized settings.
    fn settings(&self) -> Settings;

    /// Make `button` step up on press and spin while held.
    fn attach_up_events(&self, button: NodeId);

    /// Make `button` step down on press and spin while held.
    fn attach_down_events(&self, button: NodeId);

    /// Call `handler` with the new value whenever `key` changes.
    fn observe_setting(&self, key: SettingKey, handler: SettingHandler) -> Subscription;
}

/// A visual skin.
pub trait Renderer {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Build the skin around `host.input()` and attach button bindings.
    fn init(&mut self, host: &dyn SpinHost);

    /// Undo everything `init` did. Safe to call at any time.
    fn teardown(&mut self, dom: &Dom);

    /// Root element of the skin while built.
    fn wrapper(&self) -> Option<NodeId>;
}

impl fmt::Debug for dyn Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("name", &self.name())
            .field("wrapper", &self.wrapper())
            .finish()
    }
}
