#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spinbox_core::{MAX_DECIMALS, PartialSettings, RawSetting, SettingKey, Settings, sanitize};

#[derive(Arbitrary, Debug)]
enum FuzzRaw {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<FuzzRaw> for RawSetting {
    fn from(raw: FuzzRaw) -> Self {
        match raw {
            FuzzRaw::Null => RawSetting::Null,
            FuzzRaw::Bool(b) => RawSetting::Bool(b),
            FuzzRaw::Number(n) => RawSetting::Number(n),
            FuzzRaw::Text(t) => RawSetting::Text(t),
        }
    }
}

fuzz_target!(|input: Vec<(u8, FuzzRaw)>| {
    let mut partial = PartialSettings::new();
    for (index, raw) in input.into_iter().take(64) {
        let key = SettingKey::ALL[usize::from(index) % SettingKey::ALL.len()];
        partial.set(key, raw);
    }

    let out = sanitize(&partial, &Settings::default());
    if let (Some(min), Some(max)) = (out.min, out.max) {
        assert!(min <= max);
    }
    assert!(out.step > 0.0 && out.step.is_finite());
    assert!(out.decimals <= MAX_DECIMALS);
    assert!(out.stepinterval > 0 && out.stepintervaldelay > 0);
    assert!(out.boostat >= 1);

    // An empty update preserves every key.
    assert_eq!(sanitize(&PartialSettings::new(), &out), out);
});
