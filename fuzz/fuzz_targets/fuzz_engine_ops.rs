#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spinbox_core::{PartialSettings, SettingKey};
use spinbox_dom::{Dom, DomEvent};
use spinbox_runtime::SpinBox;
use std::time::Duration;

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Up,
    Down,
    Set(f64),
    Type(String),
    Blur,
    StartUp,
    StartDown,
    Stop,
    Advance(u16),
    Key { up: bool, repeat: bool },
    Step(u8),
    Vertical(bool),
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    min: i16,
    span: u16,
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: FuzzInput| {
    let dom = Dom::new();
    let input_node = dom.append_element(dom.body(), "input", &[("type", "number")]);
    let before = dom.outer_html(dom.body());
    let min = f64::from(input.min);
    let max = min + f64::from(input.span);
    let options = PartialSettings::new()
        .with(SettingKey::Min, min)
        .with(SettingKey::Max, max);
    let Ok(sb) = SpinBox::create(&dom, input_node, options) else {
        return;
    };

    for op in input.ops.into_iter().take(256) {
        match op {
            FuzzOp::Up => sb.up_once(),
            FuzzOp::Down => sb.down_once(),
            FuzzOp::Set(v) => sb.set_value(v),
            FuzzOp::Type(text) => {
                dom.set_value(input_node, &text);
            }
            FuzzOp::Blur => sb.commit(),
            FuzzOp::StartUp => sb.start_up_spin(),
            FuzzOp::StartDown => sb.start_down_spin(),
            FuzzOp::Stop => sb.stop_spin(),
            FuzzOp::Advance(ms) => {
                dom.advance(Duration::from_millis(u64::from(ms)));
            }
            FuzzOp::Key { up, repeat } => {
                let key = if up { "ArrowUp" } else { "ArrowDown" };
                dom.dispatch(input_node, DomEvent::key("keydown", key, repeat));
            }
            FuzzOp::Step(step) => {
                sb.update_settings(&PartialSettings::new().with(SettingKey::Step, u32::from(step)));
            }
            FuzzOp::Vertical(on) => {
                sb.update_settings(&PartialSettings::new().with(SettingKey::VerticalButtons, on));
            }
        }
    }

    sb.destroy();
    assert_eq!(dom.outer_html(dom.body()), before);
    assert_eq!(dom.total_listeners(), 0);
    assert_eq!(dom.pending_timers(), 0);
});
