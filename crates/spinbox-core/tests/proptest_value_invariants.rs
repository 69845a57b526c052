//! Property-based invariant tests for the numeric core.
//!
//! 1. `constrain` never leaves `[min, max]`
//! 2. `constrain` lands on the step grid when the grid fits the range
//! 3. `constrain` is idempotent
//! 4. `boosted_step` stays within `[step, max(step, cap)]`
//! 5. `sanitize` always yields ordered bounds and positive timing
//! 6. `parse_number` never panics and agrees with `str::parse` on plain numbers

use proptest::prelude::*;
use spinbox_core::{
    PartialSettings, RawSetting, SettingKey, Settings, StepDivisibility, boosted_step, constrain,
    parse_number, sanitize,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn arb_policy() -> impl Strategy<Value = StepDivisibility> {
    prop_oneof![
        Just(StepDivisibility::Round),
        Just(StepDivisibility::Floor),
        Just(StepDivisibility::Ceil),
        Just(StepDivisibility::None),
    ]
}

/// Integer bounds and steps keep the grid exactly representable.
fn arb_settings() -> impl Strategy<Value = Settings> {
    (-1000i32..1000, 0i32..2000, 1i32..50, arb_policy()).prop_map(|(min, span, step, policy)| {
        Settings {
            min: Some(f64::from(min)),
            max: Some(f64::from(min + span)),
            step: f64::from(step),
            forcestepdivisibility: policy,
            ..Settings::default()
        }
    })
}

fn arb_raw() -> impl Strategy<Value = RawSetting> {
    prop_oneof![
        Just(RawSetting::Null),
        any::<bool>().prop_map(RawSetting::Bool),
        any::<f64>().prop_map(RawSetting::Number),
        ".{0,12}".prop_map(RawSetting::Text),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. constrain stays in range
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn constrain_within_bounds(s in arb_settings(), v in -1e6f64..1e6) {
        let out = constrain(v, &s);
        let (min, max) = (s.min.unwrap(), s.max.unwrap());
        prop_assert!(out >= min && out <= max, "{out} outside [{min}, {max}]");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. constrain lands on the grid
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn constrain_on_grid(s in arb_settings(), v in -1e6f64..1e6) {
        prop_assume!(s.forcestepdivisibility != StepDivisibility::None);
        let out = constrain(v, &s);
        let min = s.min.unwrap();
        let max = s.max.unwrap();
        let k = (out - min) / s.step;
        prop_assert!(
            (k - k.round()).abs() < 1e-9 || out == max,
            "{out} is off the grid anchored at {min} with step {}",
            s.step
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. constrain is idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn constrain_idempotent(s in arb_settings(), v in -1e6f64..1e6) {
        let once = constrain(v, &s);
        prop_assert_eq!(constrain(once, &s), once);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. boosted step bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn boosted_step_bounded(
        step in 1u32..100,
        boostat in 1u32..20,
        cap in proptest::option::of(1u32..1000),
        spincount in any::<u32>(),
    ) {
        let s = Settings {
            step: f64::from(step),
            boostat,
            maxboostedstep: cap.map(f64::from),
            ..Settings::default()
        };
        let b = boosted_step(&s, spincount);
        prop_assert!(b >= s.step);
        if let Some(cap) = s.maxboostedstep {
            prop_assert!(b <= cap.max(s.step));
        }
        prop_assert!(b.is_finite());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. sanitize yields a consistent record
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sanitize_consistent(
        min in arb_raw(),
        max in arb_raw(),
        step in arb_raw(),
        interval in arb_raw(),
        boostat in arb_raw(),
    ) {
        let partial = PartialSettings::new()
            .with(SettingKey::Min, min)
            .with(SettingKey::Max, max)
            .with(SettingKey::Step, step)
            .with(SettingKey::StepInterval, interval)
            .with(SettingKey::BoostAt, boostat);
        let s = sanitize(&partial, &Settings::default());
        if let (Some(lo), Some(hi)) = (s.min, s.max) {
            prop_assert!(lo <= hi);
        }
        prop_assert!(s.step > 0.0 && s.step.is_finite());
        prop_assert!(s.stepinterval > 0);
        prop_assert!(s.boostat >= 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. parse_number
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn parse_number_never_panics(text in "\\PC{0,24}") {
        let _ = parse_number(&text);
    }

    #[test]
    fn parse_number_matches_plain_numbers(v in -1e12f64..1e12, suffix in "[a-z%]{0,3}") {
        let text = format!("{v}{suffix}");
        prop_assert_eq!(parse_number(&text), v);
    }
}
