#![forbid(unsafe_code)]

//! Host DOM for the spin box engine: a single-threaded, host-driven document
//! with elements, attributes, focus, bubbling events, and a timer queue whose
//! clock only moves when the host advances it.

pub mod dom;
pub mod event;
pub mod html;
pub mod node;
pub mod timer;

pub use dom::{Dom, DomId};
pub use event::{DomEvent, EventDetail, EventFlags, Listener, ListenerId};
pub use node::{ElementData, NodeId, NodeKind};
pub use timer::TimerId;
