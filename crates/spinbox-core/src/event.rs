#![forbid(unsafe_code)]

//! Lifecycle events emitted by the engine.

use std::fmt;
use std::str::FromStr;

/// Discrete lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpinEvent {
    /// Value moved onto the lower bound.
    Min,
    /// Value moved onto the upper bound.
    Max,
    StartSpin,
    StartUp,
    StartDown,
    StopSpin,
    StopUp,
    StopDown,
}

impl SpinEvent {
    pub const ALL: [Self; 8] = [
        Self::Min,
        Self::Max,
        Self::StartSpin,
        Self::StartUp,
        Self::StartDown,
        Self::StopSpin,
        Self::StopUp,
        Self::StopDown,
    ];

    /// Short name used by `on(name, ..)`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::StartSpin => "start-spin",
            Self::StartUp => "start-up",
            Self::StartDown => "start-down",
            Self::StopSpin => "stop-spin",
            Self::StopUp => "stop-up",
            Self::StopDown => "stop-down",
        }
    }

    /// Type of the bubbling DOM event dispatched from the input.
    #[must_use]
    pub const fn dom_type(self) -> &'static str {
        match self {
            Self::Min => "spinbox.on.min",
            Self::Max => "spinbox.on.max",
            Self::StartSpin => "spinbox.on.startspin",
            Self::StartUp => "spinbox.on.startupspin",
            Self::StartDown => "spinbox.on.startdownspin",
            Self::StopSpin => "spinbox.on.stopspin",
            Self::StopUp => "spinbox.on.stopupspin",
            Self::StopDown => "spinbox.on.stopdownspin",
        }
    }
}

impl fmt::Display for SpinEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown event name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEvent(pub String);

impl fmt::Display for UnknownEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown spin event {:?}", self.0)
    }
}

impl std::error::Error for UnknownEvent {}

impl FromStr for SpinEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == s || e.dom_type() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for event in SpinEvent::ALL {
            assert_eq!(event.name().parse::<SpinEvent>(), Ok(event));
            assert_eq!(event.dom_type().parse::<SpinEvent>(), Ok(event));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!("spin".parse::<SpinEvent>().is_err());
    }
}
