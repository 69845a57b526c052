#![forbid(unsafe_code)]

//! Construction errors.
//!
//! Only attaching an engine can fail. Every runtime operation on a live
//! instance degrades to a documented fallback instead of returning an error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpinError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpinError {
    #[error("target element {node} does not exist")]
    MissingElement { node: u32 },

    #[error("target element is <{tag}>, expected <input>")]
    NotAnInput { tag: String },

    #[error("input type {input_type:?} cannot hold a number")]
    UnsupportedInputType { input_type: String },
}

impl SpinError {
    #[must_use]
    pub fn not_an_input(tag: impl Into<String>) -> Self {
        Self::NotAnInput { tag: tag.into() }
    }
}
