#![forbid(unsafe_code)]

//! Spin box runtime: binds the value engine to a host document.
//!
//! # Role
//! `spinbox-runtime` owns everything with a lifetime: the instance registry,
//! DOM listeners, the press-and-hold spin timer, native attribute sync, and
//! the renderer it builds. Numeric rules live in `spinbox-core`; markup
//! lives in the renderer.
//!
//! # Primary responsibilities
//! - **SpinBox**: the public handle (`create`, value ops, spin control,
//!   `update_settings`, `on`, `destroy`).
//! - **Spin timer**: immediate step, delayed repeat, boost, bound stop.
//! - **Binder**: keyboard, wheel, blur, button, and document-release
//!   listeners, all removed on destroy.
//! - **Registry**: one instance per input; a second `create` replaces the
//!   first.
//!
//! # How it fits in the system
//! A renderer from `spinbox-render` receives the engine as a
//! [`SpinHost`](spinbox_render::SpinHost) during `init` and calls back into
//! it to bind its buttons and observe settings.

mod binder;
mod engine;
mod host;
mod instance;
mod native;
mod registry;
mod spin;

pub use instance::SpinBox;
pub use registry::live_instances;
