#![no_main]

use libfuzzer_sys::fuzz_target;
use spinbox_core::{format_fixed, is_numeric_text, parse_number};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let value = parse_number(&text);
    if is_numeric_text(&text) {
        assert!(!value.is_nan(), "{text:?} is numeric but parsed to NaN");
    }
    if value.is_finite() {
        let formatted = format_fixed(value, 2);
        assert!(!parse_number(&formatted).is_nan());
    }
});
