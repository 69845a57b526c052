#![forbid(unsafe_code)]

//! Settings record and the settings sanitizer.
//!
//! Settings arrive as loosely typed [`RawSetting`] values (from code, markup
//! attributes, or deserialized option objects) collected in a
//! [`PartialSettings`]. [`sanitize`] resolves them against the previous
//! [`Settings`] into a record that is always internally consistent.
//!
//! # Invariants
//!
//! After sanitization:
//! 1. `min <= max` whenever both are bounded (an inverted pair is swapped).
//! 2. `step > 0`, `boostat >= 1`, `stepinterval > 0`, `stepintervaldelay > 0`.
//! 3. `decimals <= MAX_DECIMALS`.
//! 4. Keys absent from the partial keep their previous value.
//!
//! # Failure Modes
//!
//! - **Unparsable or out-of-range value**: the key falls back to its hard
//!   default (never to the previous value).
//! - **Blank bound**: an empty string or null bound means "no bound", not zero.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::value::parse_number;

/// Largest supported `decimals`, matching fixed-point formatting limits.
pub const MAX_DECIMALS: u32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Policy for snapping computed values onto the step grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepDivisibility {
    #[default]
    Round,
    Floor,
    Ceil,
    None,
}

impl StepDivisibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::None => "none",
        }
    }
}

impl FromStr for StepDivisibility {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" => Ok(Self::Round),
            "floor" => Ok(Self::Floor),
            "ceil" => Ok(Self::Ceil),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// Text transform hook (`callback_before_calculation` /
/// `callback_after_calculation`). Two hooks are equal only if they share the
/// same allocation.
#[derive(Clone)]
pub struct ValueHook(Rc<dyn Fn(&str) -> String>);

impl ValueHook {
    pub fn new(f: impl Fn(&str) -> String + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        (self.0)(text)
    }
}

impl PartialEq for ValueHook {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ValueHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueHook(..)")
    }
}

/// Every configurable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    Min,
    Max,
    InitVal,
    ReplacementVal,
    FirstClickValueIfEmpty,
    Step,
    Decimals,
    ForceStepDivisibility,
    StepInterval,
    StepIntervalDelay,
    Booster,
    BoostAt,
    MaxBoostedStep,
    MouseWheel,
    VerticalButtons,
    FocusableButtons,
    VerticalUp,
    VerticalDown,
    VerticalUpClass,
    VerticalDownClass,
    Prefix,
    Postfix,
    PrefixExtraClass,
    PostfixExtraClass,
    ButtonUpClass,
    ButtonDownClass,
    ButtonUpTxt,
    ButtonDownTxt,
    CallbackBeforeCalculation,
    CallbackAfterCalculation,
}

impl SettingKey {
    pub const ALL: [Self; 30] = [
        Self::Min,
        Self::Max,
        Self::InitVal,
        Self::ReplacementVal,
        Self::FirstClickValueIfEmpty,
        Self::Step,
        Self::Decimals,
        Self::ForceStepDivisibility,
        Self::StepInterval,
        Self::StepIntervalDelay,
        Self::Booster,
        Self::BoostAt,
        Self::MaxBoostedStep,
        Self::MouseWheel,
        Self::VerticalButtons,
        Self::FocusableButtons,
        Self::VerticalUp,
        Self::VerticalDown,
        Self::VerticalUpClass,
        Self::VerticalDownClass,
        Self::Prefix,
        Self::Postfix,
        Self::PrefixExtraClass,
        Self::PostfixExtraClass,
        Self::ButtonUpClass,
        Self::ButtonDownClass,
        Self::ButtonUpTxt,
        Self::ButtonDownTxt,
        Self::CallbackBeforeCalculation,
        Self::CallbackAfterCalculation,
    ];

    /// Option-object name of the setting.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::InitVal => "initval",
            Self::ReplacementVal => "replacementval",
            Self::FirstClickValueIfEmpty => "firstclickvalueifempty",
            Self::Step => "step",
            Self::Decimals => "decimals",
            Self::ForceStepDivisibility => "forcestepdivisibility",
            Self::StepInterval => "stepinterval",
            Self::StepIntervalDelay => "stepintervaldelay",
            Self::Booster => "booster",
            Self::BoostAt => "boostat",
            Self::MaxBoostedStep => "maxboostedstep",
            Self::MouseWheel => "mousewheel",
            Self::VerticalButtons => "verticalbuttons",
            Self::FocusableButtons => "focusablebuttons",
            Self::VerticalUp => "verticalup",
            Self::VerticalDown => "verticaldown",
            Self::VerticalUpClass => "verticalupclass",
            Self::VerticalDownClass => "verticaldownclass",
            Self::Prefix => "prefix",
            Self::Postfix => "postfix",
            Self::PrefixExtraClass => "prefix_extraclass",
            Self::PostfixExtraClass => "postfix_extraclass",
            Self::ButtonUpClass => "buttonup_class",
            Self::ButtonDownClass => "buttondown_class",
            Self::ButtonUpTxt => "buttonup_txt",
            Self::ButtonDownTxt => "buttondown_txt",
            Self::CallbackBeforeCalculation => "callback_before_calculation",
            Self::CallbackAfterCalculation => "callback_after_calculation",
        }
    }

    /// Suffix of the `data-bts-*` markup attribute, if the setting can be
    /// expressed in markup.
    #[must_use]
    pub const fn attribute_suffix(self) -> Option<&'static str> {
        Some(match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::InitVal => "init-val",
            Self::ReplacementVal => "replacement-val",
            Self::FirstClickValueIfEmpty => "first-click-value-if-empty",
            Self::Step => "step",
            Self::Decimals => "decimals",
            Self::ForceStepDivisibility => "force-step-divisibility",
            Self::StepInterval => "step-interval",
            Self::StepIntervalDelay => "step-interval-delay",
            Self::Booster => "booster",
            Self::BoostAt => "boostat",
            Self::MaxBoostedStep => "max-boosted-step",
            Self::MouseWheel => "mouse-wheel",
            Self::VerticalButtons => "vertical-buttons",
            Self::FocusableButtons => "focusable-buttons",
            Self::VerticalUp => "vertical-up",
            Self::VerticalDown => "vertical-down",
            Self::VerticalUpClass => "vertical-up-class",
            Self::VerticalDownClass => "vertical-down-class",
            Self::Prefix => "prefix",
            Self::Postfix => "postfix",
            Self::PrefixExtraClass => "prefix-extra-class",
            Self::PostfixExtraClass => "postfix-extra-class",
            Self::ButtonUpClass => "button-up-class",
            Self::ButtonDownClass => "button-down-class",
            Self::ButtonUpTxt => "button-up-txt",
            Self::ButtonDownTxt => "button-down-txt",
            Self::CallbackBeforeCalculation | Self::CallbackAfterCalculation => return None,
        })
    }

    /// Changing this key changes renderer structure, not just text or classes.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::VerticalButtons)
    }

    /// Changing this key can invalidate the current value.
    #[must_use]
    pub const fn affects_value(self) -> bool {
        matches!(
            self,
            Self::Min
                | Self::Max
                | Self::Step
                | Self::Decimals
                | Self::ForceStepDivisibility
        )
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|k| k.name() == s).ok_or(())
    }
}

/// Loosely typed input value for one setting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawSetting {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    #[cfg_attr(feature = "serde", serde(skip))]
    Hook(ValueHook),
}

impl RawSetting {
    /// Finite number, parsing text leniently (leading numeric prefix).
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) => parse_number(s),
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::Hook(_) => None,
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<bool> for RawSetting {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for RawSetting {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for RawSetting {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<u32> for RawSetting {
    fn from(v: u32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for RawSetting {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawSetting {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Option<f64>> for RawSetting {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Null, Self::Number)
    }
}

impl From<ValueHook> for RawSetting {
    fn from(v: ValueHook) -> Self {
        Self::Hook(v)
    }
}

/// A partial settings update, keyed by setting.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(from = "BTreeMap<String, RawSetting>")
)]
pub struct PartialSettings {
    entries: BTreeMap<SettingKey, RawSetting>,
}

impl PartialSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: SettingKey, value: impl Into<RawSetting>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: SettingKey, value: impl Into<RawSetting>) {
        self.entries.insert(key, value.into());
    }

    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<&RawSetting> {
        self.entries.get(&key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SettingKey, &RawSetting)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Overlay `other` on top of `self`; `other` wins on conflicts.
    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        for (key, value) in other.iter() {
            self.entries.insert(key, value.clone());
        }
        self
    }

    /// Settings declared in markup: native `min`/`max`/`step` attributes,
    /// then `data-bts-*` attributes, which win.
    #[must_use]
    pub fn from_attributes(attributes: &[(String, String)]) -> Self {
        let lookup = |name: &str| {
            attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };
        let mut partial = Self::new();
        for (key, native) in [
            (SettingKey::Min, "min"),
            (SettingKey::Max, "max"),
            (SettingKey::Step, "step"),
        ] {
            if let Some(value) = lookup(native) {
                // `step="any"` means "no constraint" to the platform.
                if key == SettingKey::Step && value.trim().eq_ignore_ascii_case("any") {
                    continue;
                }
                partial.set(key, value);
            }
        }
        for key in SettingKey::ALL {
            if let Some(suffix) = key.attribute_suffix()
                && let Some(value) = lookup(&format!("data-bts-{suffix}"))
            {
                partial.set(key, value);
            }
        }
        partial
    }
}

impl From<BTreeMap<String, RawSetting>> for PartialSettings {
    fn from(map: BTreeMap<String, RawSetting>) -> Self {
        let mut partial = Self::new();
        for (name, value) in map {
            match name.parse::<SettingKey>() {
                Ok(key) => partial.set(key, value),
                Err(()) => tracing::debug!(message = "spinbox.settings.unknown_key", key = %name),
            }
        }
        partial
    }
}

/// Typed value of one sanitized setting, as pushed to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Number(Option<f64>),
    Bool(bool),
    Text(String),
    Policy(StepDivisibility),
    Hook(Option<ValueHook>),
}

impl SettingValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => *n,
            _ => None,
        }
    }
}

/// Sanitized settings record.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub initval: String,
    pub replacementval: String,
    pub firstclickvalueifempty: Option<f64>,
    pub step: f64,
    pub decimals: u32,
    pub forcestepdivisibility: StepDivisibility,
    /// Repeat period of an active spin, in milliseconds.
    pub stepinterval: u64,
    /// Delay before the first repeat of an active spin, in milliseconds.
    pub stepintervaldelay: u64,
    pub booster: bool,
    /// Spin steps per boost level.
    pub boostat: u32,
    pub maxboostedstep: Option<f64>,
    pub mousewheel: bool,
    pub verticalbuttons: bool,
    pub focusablebuttons: bool,
    pub verticalup: String,
    pub verticaldown: String,
    pub verticalupclass: String,
    pub verticaldownclass: String,
    pub prefix: String,
    pub postfix: String,
    pub prefix_extraclass: String,
    pub postfix_extraclass: String,
    pub buttonup_class: String,
    pub buttondown_class: String,
    pub buttonup_txt: String,
    pub buttondown_txt: String,
    pub callback_before_calculation: Option<ValueHook>,
    pub callback_after_calculation: Option<ValueHook>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min: Some(0.0),
            max: Some(100.0),
            initval: String::new(),
            replacementval: String::new(),
            firstclickvalueifempty: None,
            step: 1.0,
            decimals: 0,
            forcestepdivisibility: StepDivisibility::Round,
            stepinterval: 100,
            stepintervaldelay: 500,
            booster: true,
            boostat: 10,
            maxboostedstep: None,
            mousewheel: true,
            verticalbuttons: false,
            focusablebuttons: false,
            verticalup: "+".to_string(),
            verticaldown: "\u{2212}".to_string(),
            verticalupclass: String::new(),
            verticaldownclass: String::new(),
            prefix: String::new(),
            postfix: String::new(),
            prefix_extraclass: String::new(),
            postfix_extraclass: String::new(),
            buttonup_class: "btn btn-outline-secondary".to_string(),
            buttondown_class: "btn btn-outline-secondary".to_string(),
            buttonup_txt: "+".to_string(),
            buttondown_txt: "\u{2212}".to_string(),
            callback_before_calculation: None,
            callback_after_calculation: None,
        }
    }
}

impl Settings {
    /// Current value of `key`.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> SettingValue {
        use SettingValue as V;
        match key {
            SettingKey::Min => V::Number(self.min),
            SettingKey::Max => V::Number(self.max),
            SettingKey::InitVal => V::Text(self.initval.clone()),
            SettingKey::ReplacementVal => V::Text(self.replacementval.clone()),
            SettingKey::FirstClickValueIfEmpty => V::Number(self.firstclickvalueifempty),
            SettingKey::Step => V::Number(Some(self.step)),
            SettingKey::Decimals => V::Number(Some(f64::from(self.decimals))),
            SettingKey::ForceStepDivisibility => V::Policy(self.forcestepdivisibility),
            SettingKey::StepInterval => V::Number(Some(self.stepinterval as f64)),
            SettingKey::StepIntervalDelay => V::Number(Some(self.stepintervaldelay as f64)),
            SettingKey::Booster => V::Bool(self.booster),
            SettingKey::BoostAt => V::Number(Some(f64::from(self.boostat))),
            SettingKey::MaxBoostedStep => V::Number(self.maxboostedstep),
            SettingKey::MouseWheel => V::Bool(self.mousewheel),
            SettingKey::VerticalButtons => V::Bool(self.verticalbuttons),
            SettingKey::FocusableButtons => V::Bool(self.focusablebuttons),
            SettingKey::VerticalUp => V::Text(self.verticalup.clone()),
            SettingKey::VerticalDown => V::Text(self.verticaldown.clone()),
            SettingKey::VerticalUpClass => V::Text(self.verticalupclass.clone()),
            SettingKey::VerticalDownClass => V::Text(self.verticaldownclass.clone()),
            SettingKey::Prefix => V::Text(self.prefix.clone()),
            SettingKey::Postfix => V::Text(self.postfix.clone()),
            SettingKey::PrefixExtraClass => V::Text(self.prefix_extraclass.clone()),
            SettingKey::PostfixExtraClass => V::Text(self.postfix_extraclass.clone()),
            SettingKey::ButtonUpClass => V::Text(self.buttonup_class.clone()),
            SettingKey::ButtonDownClass => V::Text(self.buttondown_class.clone()),
            SettingKey::ButtonUpTxt => V::Text(self.buttonup_txt.clone()),
            SettingKey::ButtonDownTxt => V::Text(self.buttondown_txt.clone()),
            SettingKey::CallbackBeforeCalculation => V::Hook(self.callback_before_calculation.clone()),
            SettingKey::CallbackAfterCalculation => V::Hook(self.callback_after_calculation.clone()),
        }
    }

    /// Keys whose value differs between `self` and `other`, in key order.
    #[must_use]
    pub fn changed_keys(&self, other: &Self) -> Vec<SettingKey> {
        SettingKey::ALL
            .into_iter()
            .filter(|k| self.get(*k) != other.get(*k))
            .collect()
    }

    fn text_mut(&mut self, key: SettingKey) -> Option<&mut String> {
        Some(match key {
            SettingKey::InitVal => &mut self.initval,
            SettingKey::ReplacementVal => &mut self.replacementval,
            SettingKey::VerticalUp => &mut self.verticalup,
            SettingKey::VerticalDown => &mut self.verticaldown,
            SettingKey::VerticalUpClass => &mut self.verticalupclass,
            SettingKey::VerticalDownClass => &mut self.verticaldownclass,
            SettingKey::Prefix => &mut self.prefix,
            SettingKey::Postfix => &mut self.postfix,
            SettingKey::PrefixExtraClass => &mut self.prefix_extraclass,
            SettingKey::PostfixExtraClass => &mut self.postfix_extraclass,
            SettingKey::ButtonUpClass => &mut self.buttonup_class,
            SettingKey::ButtonDownClass => &mut self.buttondown_class,
            SettingKey::ButtonUpTxt => &mut self.buttonup_txt,
            SettingKey::ButtonDownTxt => &mut self.buttondown_txt,
            _ => return None,
        })
    }

    fn bool_mut(&mut self, key: SettingKey) -> Option<&mut bool> {
        Some(match key {
            SettingKey::Booster => &mut self.booster,
            SettingKey::MouseWheel => &mut self.mousewheel,
            SettingKey::VerticalButtons => &mut self.verticalbuttons,
            SettingKey::FocusableButtons => &mut self.focusablebuttons,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Sanitizer
// ---------------------------------------------------------------------------

/// Resolve `partial` against `previous`. Pure: no I/O, no shared state.
#[must_use]
pub fn sanitize(partial: &PartialSettings, previous: &Settings) -> Settings {
    let defaults = Settings::default();
    let mut out = previous.clone();

    for (key, raw) in partial.iter() {
        apply(&mut out, &defaults, key, raw);
    }

    if let (Some(min), Some(max)) = (out.min, out.max)
        && min > max
    {
        out.min = Some(max);
        out.max = Some(min);
    }
    out
}

fn apply(out: &mut Settings, defaults: &Settings, key: SettingKey, raw: &RawSetting) {
    match key {
        SettingKey::Min => out.min = bound(raw),
        SettingKey::Max => out.max = bound(raw),
        SettingKey::FirstClickValueIfEmpty => out.firstclickvalueifempty = bound(raw),
        SettingKey::Step => {
            out.step = positive(raw).unwrap_or_else(|| fallback(key, defaults.step));
        }
        SettingKey::Decimals => {
            out.decimals = raw
                .as_number()
                .filter(|n| *n >= 0.0)
                .map(|n| (n.floor() as u32).min(MAX_DECIMALS))
                .unwrap_or_else(|| fallback(key, defaults.decimals));
        }
        SettingKey::StepInterval => {
            out.stepinterval = millis(raw).unwrap_or_else(|| fallback(key, defaults.stepinterval));
        }
        SettingKey::StepIntervalDelay => {
            out.stepintervaldelay =
                millis(raw).unwrap_or_else(|| fallback(key, defaults.stepintervaldelay));
        }
        SettingKey::BoostAt => {
            out.boostat = raw
                .as_number()
                .filter(|n| *n >= 1.0)
                .map(|n| n.floor().min(f64::from(u32::MAX)) as u32)
                .unwrap_or_else(|| fallback(key, defaults.boostat));
        }
        SettingKey::MaxBoostedStep => out.maxboostedstep = positive(raw),
        SettingKey::ForceStepDivisibility => {
            out.forcestepdivisibility = raw
                .as_text()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| fallback(key, defaults.forcestepdivisibility));
        }
        SettingKey::CallbackBeforeCalculation => out.callback_before_calculation = hook(raw),
        SettingKey::CallbackAfterCalculation => out.callback_after_calculation = hook(raw),
        _ => {
            if let Some(slot) = out.bool_mut(key) {
                let default = defaults.clone().bool_mut(key).is_some_and(|b| *b);
                *slot = raw.as_bool().unwrap_or_else(|| fallback(key, default));
            } else if let Some(slot) = out.text_mut(key) {
                let default = defaults.clone().text_mut(key).cloned().unwrap_or_default();
                *slot = raw.as_text().unwrap_or(default);
            }
        }
    }
}

fn fallback<T: fmt::Debug>(key: SettingKey, default: T) -> T {
    tracing::debug!(
        message = "spinbox.settings.fallback",
        key = key.name(),
        default = ?default
    );
    default
}

fn bound(raw: &RawSetting) -> Option<f64> {
    if raw.is_blank() {
        return None;
    }
    raw.as_number()
}

fn positive(raw: &RawSetting) -> Option<f64> {
    raw.as_number().filter(|n| *n > 0.0)
}

fn millis(raw: &RawSetting) -> Option<u64> {
    raw.as_number()
        .filter(|n| *n > 0.0)
        .map(|n| n.round().max(1.0).min(u64::MAX as f64) as u64)
}

fn hook(raw: &RawSetting) -> Option<ValueHook> {
    match raw {
        RawSetting::Hook(h) => Some(h.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize_one(key: SettingKey, raw: impl Into<RawSetting>) -> Settings {
        sanitize(&PartialSettings::new().with(key, raw), &Settings::default())
    }

    #[test]
    fn invalid_step_falls_back_to_hard_default_not_previous() {
        let previous = Settings {
            step: 5.0,
            ..Settings::default()
        };
        for raw in [
            RawSetting::from("abc"),
            RawSetting::from(-2.0),
            RawSetting::from(0.0),
            RawSetting::Null,
        ] {
            let out = sanitize(&PartialSettings::new().with(SettingKey::Step, raw), &previous);
            assert_eq!(out.step, 1.0);
        }
    }

    #[test]
    fn timing_fallbacks() {
        assert_eq!(sanitize_one(SettingKey::StepInterval, -5).stepinterval, 100);
        assert_eq!(sanitize_one(SettingKey::StepInterval, "fast").stepinterval, 100);
        assert_eq!(sanitize_one(SettingKey::StepIntervalDelay, 0).stepintervaldelay, 500);
        assert_eq!(sanitize_one(SettingKey::StepInterval, "250ms").stepinterval, 250);
    }

    #[test]
    fn decimals_are_floored_and_capped() {
        assert_eq!(sanitize_one(SettingKey::Decimals, -1).decimals, 0);
        assert_eq!(sanitize_one(SettingKey::Decimals, 2.7).decimals, 2);
        assert_eq!(sanitize_one(SettingKey::Decimals, 1e9).decimals, MAX_DECIMALS);
    }

    #[test]
    fn blank_bound_means_unbounded() {
        let out = sanitize(
            &PartialSettings::new()
                .with(SettingKey::Min, "")
                .with(SettingKey::Max, RawSetting::Null),
            &Settings::default(),
        );
        assert_eq!(out.min, None);
        assert_eq!(out.max, None);
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let out = sanitize(
            &PartialSettings::new()
                .with(SettingKey::Min, 10)
                .with(SettingKey::Max, "-10"),
            &Settings::default(),
        );
        assert_eq!((out.min, out.max), (Some(-10.0), Some(10.0)));
    }

    #[test]
    fn swap_considers_previous_bound() {
        let out = sanitize_one(SettingKey::Min, 500);
        assert_eq!((out.min, out.max), (Some(100.0), Some(500.0)));
    }

    #[test]
    fn absent_keys_are_preserved() {
        let previous = sanitize_one(SettingKey::Prefix, "$");
        let out = sanitize(&PartialSettings::new().with(SettingKey::Step, 3), &previous);
        assert_eq!(out.prefix, "$");
        assert_eq!(out.step, 3.0);
    }

    #[test]
    fn boost_settings_degrade() {
        assert_eq!(sanitize_one(SettingKey::BoostAt, 0).boostat, 10);
        assert_eq!(sanitize_one(SettingKey::MaxBoostedStep, false).maxboostedstep, None);
        assert_eq!(sanitize_one(SettingKey::MaxBoostedStep, "6").maxboostedstep, Some(6.0));
    }

    #[test]
    fn policy_and_bool_parsing() {
        let out = sanitize(
            &PartialSettings::new()
                .with(SettingKey::ForceStepDivisibility, "FLOOR")
                .with(SettingKey::MouseWheel, "false")
                .with(SettingKey::Booster, "maybe"),
            &Settings {
                booster: false,
                ..Settings::default()
            },
        );
        assert_eq!(out.forcestepdivisibility, StepDivisibility::Floor);
        assert!(!out.mousewheel);
        assert!(out.booster, "invalid bool falls back to the hard default");

        let out = sanitize_one(SettingKey::ForceStepDivisibility, "sideways");
        assert_eq!(out.forcestepdivisibility, StepDivisibility::Round);
    }

    #[test]
    fn text_null_resets_to_default() {
        let previous = sanitize_one(SettingKey::ButtonUpTxt, "Up");
        let out = sanitize(
            &PartialSettings::new().with(SettingKey::ButtonUpTxt, RawSetting::Null),
            &previous,
        );
        assert_eq!(out.buttonup_txt, "+");
    }

    #[test]
    fn changed_keys_by_value() {
        let hook = ValueHook::new(|s| format!("${s}"));
        let a = sanitize_one(SettingKey::CallbackAfterCalculation, hook.clone());
        let b = sanitize_one(SettingKey::CallbackAfterCalculation, hook);
        assert!(a.changed_keys(&b).is_empty());

        let c = sanitize(&PartialSettings::new().with(SettingKey::Prefix, "#"), &a);
        assert_eq!(a.changed_keys(&c), vec![SettingKey::Prefix]);
    }

    #[test]
    fn from_attributes_layers_data_over_native() {
        let attrs = vec![
            ("type".to_string(), "number".to_string()),
            ("min".to_string(), "5".to_string()),
            ("max".to_string(), "50".to_string()),
            ("step".to_string(), "any".to_string()),
            ("data-bts-max".to_string(), "40".to_string()),
            ("data-bts-button-up-txt".to_string(), "Up".to_string()),
        ];
        let out = sanitize(&PartialSettings::from_attributes(&attrs), &Settings::default());
        assert_eq!(out.min, Some(5.0));
        assert_eq!(out.max, Some(40.0));
        assert_eq!(out.step, 1.0);
        assert_eq!(out.buttonup_txt, "Up");
    }

    #[test]
    fn every_key_has_a_unique_name() {
        let mut names: Vec<&str> = SettingKey::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SettingKey::ALL.len());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_option_object() {
        let partial: PartialSettings = serde_json::from_str(
            r#"{"min": null, "max": "20", "step": 2, "verticalbuttons": true, "bogus": 1}"#,
        )
        .unwrap();
        let out = sanitize(&partial, &Settings::default());
        assert_eq!(out.min, None);
        assert_eq!(out.max, Some(20.0));
        assert_eq!(out.step, 2.0);
        assert!(out.verticalbuttons);
    }
}
