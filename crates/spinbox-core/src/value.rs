#![forbid(unsafe_code)]

//! Numeric core: parsing, formatting, grid snapping, clamping, and boosted
//! step computation.
//!
//! Every function here is pure. The engine composes them; tests and fuzz
//! targets call them directly.
//!
//! # Invariants
//!
//! 1. [`constrain`] returns a value inside `[min, max]` for every finite
//!    input (bounds are whatever is set; unbounded sides are open).
//! 2. With a snapping policy other than `None`, [`constrain`] returns a
//!    point of the grid `base + k * step` where `base` is `min` (or 0 when
//!    there is no lower bound), unless only a bound itself is reachable.
//! 3. [`boosted_step`] is never smaller than `step` and never larger than
//!    `maxboostedstep` (when that cap is at least `step`).

use crate::event::SpinEvent;
use crate::settings::{Settings, StepDivisibility};

/// Tolerance for floor/ceil snapping, absorbing binary rounding noise such
/// as `0.1 * 3`.
const SNAP_EPSILON: f64 = 1e-9;

/// Highest boost level; `2^MAX_BOOST_LEVEL` is still finite.
const MAX_BOOST_LEVEL: u32 = 1000;

/// Lenient numeric parse: the longest numeric prefix after leading
/// whitespace, or NaN if there is none. `"12px"` is 12, `".5"` is 0.5,
/// `"$5"` is NaN.
#[must_use]
pub fn parse_number(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let is_digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_start = end;
    while is_digit(end) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let mut frac_end = end + 1;
        while is_digit(frac_end) {
            frac_end += 1;
        }
        let frac_digits = frac_end - end - 1;
        if digits + frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while is_digit(exp_end) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// True if `text` (trimmed) is a complete finite number.
#[must_use]
pub fn is_numeric_text(text: &str) -> bool {
    let t = text.trim();
    !t.is_empty() && t.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Fixed-point text with exactly `decimals` fraction digits. Never renders a
/// negative zero.
#[must_use]
pub fn format_fixed(value: f64, decimals: u32) -> String {
    let text = format!("{:.*}", decimals as usize, value);
    match text.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => text,
    }
}

/// Round `value` to `decimals` fraction digits.
#[must_use]
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format_fixed(value, decimals).parse().unwrap_or(value)
}

/// Snap `value` onto the grid `base + k * step` under `policy`.
#[must_use]
pub fn snap(value: f64, step: f64, base: f64, policy: StepDivisibility) -> f64 {
    if !(step > 0.0) || !value.is_finite() {
        return value;
    }
    let q = (value - base) / step;
    let k = match policy {
        // Half-way cases go towards positive infinity.
        StepDivisibility::Round => (q + 0.5).floor(),
        StepDivisibility::Floor => (q + SNAP_EPSILON).floor(),
        StepDivisibility::Ceil => (q - SNAP_EPSILON).ceil(),
        StepDivisibility::None => return value,
    };
    base + k * step
}

/// Snap, clamp, and round `value` under `settings`. NaN stays NaN.
#[must_use]
pub fn constrain(value: f64, settings: &Settings) -> f64 {
    if value.is_nan() {
        return value;
    }
    let policy = settings.forcestepdivisibility;
    let base = settings.min.unwrap_or(0.0);
    let mut v = snap(value, settings.step, base, policy);

    if let Some(max) = settings.max
        && v > max
    {
        v = if policy == StepDivisibility::None {
            max
        } else {
            // Highest grid point not above max, unless the grid misses the
            // range entirely.
            let top = snap(max, settings.step, base, StepDivisibility::Floor);
            if settings.min.is_some_and(|min| top < min) { max } else { top.min(max) }
        };
    }
    if let Some(min) = settings.min
        && v < min
    {
        v = min;
    }
    round_to_decimals(v, settings.decimals)
}

/// Step size after `spincount` repeats of an active spin.
#[must_use]
pub fn boosted_step(settings: &Settings, spincount: u32) -> f64 {
    let step = settings.step;
    if !settings.booster {
        return step;
    }
    let level = (spincount / settings.boostat.max(1)).min(MAX_BOOST_LEVEL);
    let mut boosted = step * 2f64.powi(level as i32);
    if let Some(cap) = settings.maxboostedstep
        && boosted > cap
    {
        boosted = cap;
    }
    boosted.max(step)
}

/// Value to use when stepping from an empty or non-numeric input.
#[must_use]
pub fn seed_value(settings: &Settings) -> f64 {
    let seed = settings
        .firstclickvalueifempty
        .unwrap_or(match (settings.min, settings.max) {
            (Some(min), Some(max)) => (min + max) / 2.0,
            (Some(min), None) => min.max(0.0),
            (None, Some(max)) => max.min(0.0),
            (None, None) => 0.0,
        });
    constrain(seed, settings)
}

/// Direction of a single step or spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepDirection {
    Up,
    Down,
}

impl StepDirection {
    /// Event emitted when a step lands on the bound in this direction.
    #[must_use]
    pub const fn bound_event(self) -> SpinEvent {
        match self {
            Self::Up => SpinEvent::Max,
            Self::Down => SpinEvent::Min,
        }
    }

    #[must_use]
    pub const fn start_event(self) -> SpinEvent {
        match self {
            Self::Up => SpinEvent::StartUp,
            Self::Down => SpinEvent::StartDown,
        }
    }

    #[must_use]
    pub const fn stop_event(self) -> SpinEvent {
        match self {
            Self::Up => SpinEvent::StopUp,
            Self::Down => SpinEvent::StopDown,
        }
    }

    /// Bound in this direction, if any.
    #[must_use]
    pub fn bound(self, settings: &Settings) -> Option<f64> {
        match self {
            Self::Up => settings.max,
            Self::Down => settings.min,
        }
    }

    /// True if `value` sits on (or past) the bound in this direction.
    #[must_use]
    pub fn at_bound(self, value: f64, settings: &Settings) -> bool {
        match (self, self.bound(settings)) {
            (Self::Up, Some(max)) => value >= max,
            (Self::Down, Some(min)) => value <= min,
            (_, None) => false,
        }
    }
}

/// Value after one step from `current`. A NaN `current` yields the seed.
#[must_use]
pub fn next_value(
    current: f64,
    direction: StepDirection,
    settings: &Settings,
    spincount: u32,
) -> f64 {
    if current.is_nan() {
        return seed_value(settings);
    }
    let step = boosted_step(settings, spincount);
    let raw = match direction {
        StepDirection::Up => current + step,
        StepDirection::Down => current - step,
    };
    constrain(raw, settings)
}
