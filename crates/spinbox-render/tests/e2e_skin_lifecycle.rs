//! End-to-end lifecycle tests for the reference skins against a stub host.
//!
//! Both skins must leave the caller's DOM exactly as they found it after any
//! number of `init` / `teardown` cycles, in injected and adopted modes.

#![cfg(feature = "skins")]

use std::cell::RefCell;

use pretty_assertions::assert_eq;
use spinbox_core::{
    KeyedListeners, PartialSettings, SettingKey, SettingValue, Settings, Subscription, sanitize,
};
use spinbox_dom::{Dom, NodeId};
use spinbox_render::{
    CONTAINER_ATTR, InputGroupRenderer, MARKER_ATTR, MarkerRole, Renderer, SettingHandler,
    SpinHost, TrackedRenderer, find_marked,
};

// ── Stub host ───────────────────────────────────────────────────────────

struct StubHost {
    dom: Dom,
    input: NodeId,
    settings: RefCell<Settings>,
    observers: KeyedListeners<SettingKey, SettingValue>,
    up: RefCell<Vec<NodeId>>,
    down: RefCell<Vec<NodeId>>,
}

impl StubHost {
    fn new(dom: &Dom, input: NodeId, partial: PartialSettings) -> Self {
        Self {
            dom: dom.clone(),
            input,
            settings: RefCell::new(sanitize(&partial, &Settings::default())),
            observers: KeyedListeners::new(),
            up: RefCell::new(Vec::new()),
            down: RefCell::new(Vec::new()),
        }
    }

    fn update(&self, partial: PartialSettings) {
        let previous = self.settings.borrow().clone();
        let next = sanitize(&partial, &previous);
        *self.settings.borrow_mut() = next.clone();
        for key in previous.changed_keys(&next) {
            self.observers.emit(&key, &next.get(key));
        }
    }
}

impl SpinHost for StubHost {
    fn dom(&self) -> Dom {
        self.dom.clone()
    }

    fn input(&self) -> NodeId {
        self.input
    }

    fn settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    fn attach_up_events(&self, button: NodeId) {
        self.up.borrow_mut().push(button);
    }

    fn attach_down_events(&self, button: NodeId) {
        self.down.borrow_mut().push(button);
    }

    fn observe_setting(&self, key: SettingKey, handler: SettingHandler) -> Subscription {
        self.observers.subscribe(key, move |v| handler(v))
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────

fn form_fixture() -> (Dom, NodeId) {
    let dom = Dom::new();
    let form = dom.append_element(dom.body(), "form", &[("id", "order")]);
    dom.append_element(form, "label", &[("for", "qty")]);
    let input = dom.append_element(form, "input", &[("id", "qty"), ("type", "number")]);
    dom.append_element(form, "p", &[("class", "hint")]);
    (dom, input)
}

fn skins() -> Vec<Box<dyn Renderer>> {
    vec![
        Box::new(InputGroupRenderer::new()),
        Box::new(TrackedRenderer::new()),
    ]
}

fn cycle(renderer: &mut dyn Renderer, host: &StubHost, times: usize) {
    for _ in 0..times {
        renderer.init(host);
        assert!(renderer.wrapper().is_some(), "{} built no wrapper", renderer.name());
        renderer.teardown(&host.dom);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Injected wrapper round trip
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn injected_round_trip_restores_markup() {
    for mut skin in skins() {
        for vertical in [false, true] {
            let (dom, input) = form_fixture();
            let before = dom.outer_html(dom.body());
            let nodes = dom.node_count();
            let host = StubHost::new(
                &dom,
                input,
                PartialSettings::new()
                    .with(SettingKey::VerticalButtons, vertical)
                    .with(SettingKey::Prefix, "$"),
            );

            cycle(skin.as_mut(), &host, 3);
            assert_eq!(dom.outer_html(dom.body()), before, "{}", skin.name());
            assert_eq!(dom.node_count(), nodes, "{} leaked nodes", skin.name());
            assert!(skin.wrapper().is_none());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Adopted container round trip
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn input_group_adopts_and_releases_caller_group() {
    let dom = Dom::new();
    let group = dom.append_element(dom.body(), "div", &[("class", "input-group mine")]);
    let caller_span = dom.append_element(group, "span", &[("class", "input-group-text")]);
    let input = dom.append_element(group, "input", &[]);
    let before = dom.outer_html(dom.body());

    let host = StubHost::new(&dom, input, PartialSettings::new());
    let mut skin = InputGroupRenderer::new();
    skin.init(&host);
    assert_eq!(skin.wrapper(), Some(group));
    assert_eq!(
        dom.get_attribute(group, MARKER_ATTR).as_deref(),
        Some(MarkerRole::WrapperAdvanced.as_str())
    );
    assert!(dom.has_class(group, "spinbox-enhanced"));

    skin.teardown(&dom);
    assert_eq!(dom.outer_html(dom.body()), before);
    assert!(dom.exists(caller_span));
}

#[test]
fn tracked_restores_caller_container_byte_for_byte() {
    let dom = Dom::new();
    let group = dom.append_element(
        dom.body(),
        "div",
        &[
            (CONTAINER_ATTR, ""),
            ("class", "  wide   box "),
            ("role", "region"),
        ],
    );
    let input = dom.append_element(group, "input", &[("class", "form-control")]);
    let before = dom.outer_html(dom.body());

    let host = StubHost::new(&dom, input, PartialSettings::new());
    let mut skin = TrackedRenderer::new();
    skin.init(&host);
    assert_eq!(skin.wrapper(), Some(group));
    assert_eq!(dom.get_attribute(group, "role").as_deref(), Some("group"));
    assert!(dom.has_class(input, "spinbox-input"));
    assert!(skin.pending_ops() > 0);

    skin.teardown(&dom);
    assert_eq!(dom.outer_html(dom.body()), before);
    assert_eq!(skin.pending_ops(), 0);
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Markup contract
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn input_group_horizontal_markup() {
    let dom = Dom::new();
    let input = dom.append_element(dom.body(), "input", &[("type", "number")]);
    let host = StubHost::new(&dom, input, PartialSettings::new());
    let mut skin = InputGroupRenderer::new();
    skin.init(&host);

    let expected = concat!(
        r#"<div data-spinbox-injected="wrapper" class="input-group spinbox">"#,
        r#"<button data-spinbox-injected="down" type="button" class="btn btn-outline-secondary spinbox-down" tabindex="-1">"#,
        "\u{2212}</button>",
        r#"<span data-spinbox-injected="prefix" class="input-group-text spinbox-prefix" style="display:none"></span>"#,
        r#"<input type="number">"#,
        r#"<span data-spinbox-injected="postfix" class="input-group-text spinbox-postfix" style="display:none"></span>"#,
        r#"<button data-spinbox-injected="up" type="button" class="btn btn-outline-secondary spinbox-up" tabindex="-1">+</button>"#,
        "</div>",
    );
    assert_eq!(dom.inner_html(dom.body()), expected);
}

#[test]
fn vertical_buttons_share_a_marked_stack() {
    for mut skin in skins() {
        let (dom, input) = form_fixture();
        let host = StubHost::new(
            &dom,
            input,
            PartialSettings::new().with(SettingKey::VerticalButtons, true),
        );
        skin.init(&host);

        let stack = find_marked(&dom, dom.body(), MarkerRole::VerticalWrapper)
            .unwrap_or_else(|| panic!("{}: no vertical wrapper", skin.name()));
        let up = find_marked(&dom, stack, MarkerRole::Up).unwrap();
        let down = find_marked(&dom, stack, MarkerRole::Down).unwrap();
        assert_eq!(dom.children(stack), vec![up, down]);
        assert_eq!(dom.text_content(up), "+");
        skin.teardown(&dom);
    }
}

#[test]
fn focusable_buttons_have_no_tabindex() {
    for mut skin in skins() {
        let (dom, input) = form_fixture();
        let host = StubHost::new(
            &dom,
            input,
            PartialSettings::new().with(SettingKey::FocusableButtons, true),
        );
        skin.init(&host);
        let up = find_marked(&dom, dom.body(), MarkerRole::Up).unwrap();
        assert!(!dom.has_attribute(up, "tabindex"), "{}", skin.name());

        host.update(PartialSettings::new().with(SettingKey::FocusableButtons, false));
        assert_eq!(dom.get_attribute(up, "tabindex").as_deref(), Some("-1"));
        skin.teardown(&dom);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Bindings and observers
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn every_cycle_attaches_fresh_buttons() {
    for mut skin in skins() {
        let (dom, input) = form_fixture();
        let host = StubHost::new(&dom, input, PartialSettings::new());
        cycle(skin.as_mut(), &host, 2);
        skin.init(&host);

        let up = find_marked(&dom, dom.body(), MarkerRole::Up).unwrap();
        let down = find_marked(&dom, dom.body(), MarkerRole::Down).unwrap();
        assert_eq!(host.up.borrow().len(), 3);
        assert_eq!(host.down.borrow().len(), 3);
        assert_eq!(host.up.borrow().last(), Some(&up));
        assert_eq!(host.down.borrow().last(), Some(&down));
        skin.teardown(&dom);
    }
}

#[test]
fn cosmetic_settings_patch_in_place() {
    for mut skin in skins() {
        let (dom, input) = form_fixture();
        let host = StubHost::new(&dom, input, PartialSettings::new());
        skin.init(&host);
        let prefix = find_marked(&dom, dom.body(), MarkerRole::Prefix).unwrap();
        let up = find_marked(&dom, dom.body(), MarkerRole::Up).unwrap();
        assert_eq!(dom.get_attribute(prefix, "style").as_deref(), Some("display:none"));

        host.update(
            PartialSettings::new()
                .with(SettingKey::Prefix, "$")
                .with(SettingKey::ButtonUpTxt, "Up")
                .with(SettingKey::ButtonUpClass, "btn-lg"),
        );
        assert_eq!(dom.text_content(prefix), "$");
        assert!(!dom.has_attribute(prefix, "style"));
        assert_eq!(dom.text_content(up), "Up");
        assert!(dom.has_class(up, "btn-lg"), "{}", skin.name());
        assert!(dom.has_class(up, "spinbox-up"));
        assert_eq!(
            find_marked(&dom, dom.body(), MarkerRole::Up),
            Some(up),
            "cosmetic updates must not rebuild"
        );

        skin.teardown(&dom);
        assert_eq!(host.observers.total(), 0, "teardown drops observers");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Contract violations are absorbed
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn teardown_without_init_and_double_teardown() {
    for mut skin in skins() {
        let (dom, input) = form_fixture();
        let before = dom.outer_html(dom.body());
        skin.teardown(&dom);

        let host = StubHost::new(&dom, input, PartialSettings::new());
        skin.init(&host);
        skin.teardown(&dom);
        skin.teardown(&dom);
        assert_eq!(dom.outer_html(dom.body()), before);
    }
}

#[test]
fn init_twice_rebuilds_once() {
    for mut skin in skins() {
        let (dom, input) = form_fixture();
        let before = dom.outer_html(dom.body());
        let host = StubHost::new(&dom, input, PartialSettings::new());
        skin.init(&host);
        skin.init(&host);
        assert_eq!(
            dom.find_by_attribute(dom.body(), MARKER_ATTR, Some("up")).len(),
            1,
            "{}",
            skin.name()
        );
        skin.teardown(&dom);
        assert_eq!(dom.outer_html(dom.body()), before);
    }
}

#[test]
fn detached_input_builds_nothing() {
    for mut skin in skins() {
        let dom = Dom::new();
        let input = dom.create_element("input");
        let host = StubHost::new(&dom, input, PartialSettings::new());
        let nodes = dom.node_count();
        skin.init(&host);
        assert!(skin.wrapper().is_none());
        assert!(host.up.borrow().is_empty());
        skin.teardown(&dom);
        assert_eq!(dom.node_count(), nodes);
    }
}
