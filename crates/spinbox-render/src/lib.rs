#![forbid(unsafe_code)]

//! Render lifecycle protocol for spin box skins.
//!
//! - [`protocol`]: the [`Renderer`] / [`SpinHost`] contract and marker roles.
//! - [`sweep`]: attribute-tagged sweep teardown helper.
//! - [`undo`]: LIFO undo-stack teardown helper.
//! - `skins` (feature `skins`): two reference skins, one per helper.

pub mod protocol;
#[cfg(feature = "skins")]
pub mod skins;
pub mod sweep;
pub mod undo;

pub use protocol::{MARKER_ATTR, MarkerRole, Renderer, SettingHandler, SpinHost, find_marked};
#[cfg(feature = "skins")]
pub use skins::{ADOPT_CLASS, CONTAINER_ATTR, InputGroupRenderer, TrackedRenderer};
pub use sweep::InjectedSweep;
pub use undo::{UndoOp, UndoStack};
