#![forbid(unsafe_code)]

//! Core of the spin box engine: sanitized settings, numeric value rules,
//! lifecycle event names, and the synchronous observer bus.
//!
//! Nothing in this crate touches a document. The runtime crate wires these
//! pieces to a host DOM.

pub mod error;
pub mod event;
pub mod observer;
pub mod settings;
pub mod value;

pub use error::{Result, SpinError};
pub use event::{SpinEvent, UnknownEvent};
pub use observer::{KeyedListeners, ListenerSet, Subscription};
pub use settings::{
    MAX_DECIMALS, PartialSettings, RawSetting, SettingKey, SettingValue, Settings,
    StepDivisibility, ValueHook, sanitize,
};
pub use value::{
    StepDirection, boosted_step, constrain, format_fixed, is_numeric_text, next_value,
    parse_number, round_to_decimals, seed_value, snap,
};
