#![forbid(unsafe_code)]

//! Spin box public facade crate.
//!
//! Attach a [`SpinBox`] to an `<input>` in a [`Dom`], optionally with one of
//! the reference skins (feature `skins`, on by default):
//!
//! ```
//! use spinbox::prelude::*;
//!
//! let dom = Dom::new();
//! let input = dom.append_element(dom.body(), "input", &[("type", "number")]);
//! let options = PartialSettings::new()
//!     .with(SettingKey::Max, 10)
//!     .with(SettingKey::InitVal, "9");
//! let sb = SpinBox::create(&dom, input, options).unwrap();
//!
//! sb.up_once();
//! sb.up_once();
//! assert_eq!(dom.value(input), "10");
//! sb.destroy();
//! ```

pub use spinbox_core::{
    PartialSettings, RawSetting, Result, SettingKey, SettingValue, Settings, SpinError, SpinEvent,
    StepDirection, StepDivisibility, Subscription, ValueHook,
};
pub use spinbox_dom::{Dom, DomEvent, NodeId};
pub use spinbox_render::{MARKER_ATTR, MarkerRole, Renderer, SpinHost, find_marked};
#[cfg(feature = "skins")]
pub use spinbox_render::{InputGroupRenderer, TrackedRenderer};
pub use spinbox_runtime::SpinBox;

pub mod prelude {
    pub use spinbox_core as core;
    pub use spinbox_dom as dom;
    pub use spinbox_render as render;
    pub use spinbox_runtime as runtime;

    pub use crate::{
        Dom, DomEvent, MarkerRole, NodeId, PartialSettings, Renderer, SettingKey, SpinBox,
        SpinEvent, StepDirection, ValueHook,
    };
    #[cfg(feature = "skins")]
    pub use crate::{InputGroupRenderer, TrackedRenderer};
}
