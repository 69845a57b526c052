#![forbid(unsafe_code)]

//! Reference skins.
//!
//! Both skins build the same affordances (prefix, postfix, up and down
//! buttons, optionally stacked vertically) and differ in markup vocabulary
//! and in the lifecycle helper they compose:
//!
//! | Skin                   | Helper                                    |
//! |------------------------|-------------------------------------------|
//! | [`InputGroupRenderer`] | [`InjectedSweep`](crate::sweep::InjectedSweep) |
//! | [`TrackedRenderer`]    | [`UndoStack`](crate::undo::UndoStack)     |

mod input_group;
mod tracked;

pub use input_group::{ADOPT_CLASS, InputGroupRenderer};
pub use tracked::{CONTAINER_ATTR, TrackedRenderer};

use std::cell::RefCell;
use std::rc::Rc;

use spinbox_core::{SettingKey, SettingValue, Settings, Subscription};
use spinbox_dom::{Dom, NodeId};

use crate::protocol::SpinHost;

/// Class vocabulary of one skin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Look {
    pub wrapper: &'static str,
    pub enhanced: &'static str,
    pub prefix: &'static str,
    pub postfix: &'static str,
    pub vertical: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

/// Elements built by a skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Parts {
    pub up: NodeId,
    pub down: NodeId,
    pub prefix: NodeId,
    pub postfix: NodeId,
}

/// Space-joined non-empty class fragments.
pub(crate) fn join_classes(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Affix text; an empty affix is hidden.
pub(crate) fn set_affix_text(dom: &Dom, node: NodeId, text: &str) {
    dom.set_text_content(node, text);
    if text.is_empty() {
        dom.set_attribute(node, "style", "display:none");
    } else {
        dom.remove_attribute(node, "style");
    }
}

pub(crate) fn set_focusable(dom: &Dom, button: NodeId, focusable: bool) {
    if focusable {
        dom.remove_attribute(button, "tabindex");
    } else {
        dom.set_attribute(button, "tabindex", "-1");
    }
}

/// Up button classes and text for the current layout.
pub(crate) fn up_face(look: &Look, s: &Settings) -> (String, String) {
    if s.verticalbuttons {
        (
            join_classes(&[s.buttonup_class.as_str(), s.verticalupclass.as_str(), look.up]),
            s.verticalup.clone(),
        )
    } else {
        (join_classes(&[s.buttonup_class.as_str(), look.up]), s.buttonup_txt.clone())
    }
}

/// Down button classes and text for the current layout.
pub(crate) fn down_face(look: &Look, s: &Settings) -> (String, String) {
    if s.verticalbuttons {
        (
            join_classes(&[s.buttondown_class.as_str(), s.verticaldownclass.as_str(), look.down]),
            s.verticaldown.clone(),
        )
    } else {
        (join_classes(&[s.buttondown_class.as_str(), look.down]), s.buttondown_txt.clone())
    }
}

/// Subscribe to every cosmetic setting and patch `parts` in place.
///
/// Handlers share a settings mirror so that a class built from two settings
/// (button class plus vertical class) stays correct when either changes.
pub(crate) fn observe_cosmetics(
    host: &dyn SpinHost,
    look: Look,
    parts: Parts,
) -> Vec<Subscription> {
    let dom = host.dom();
    let mirror = Rc::new(RefCell::new(host.settings()));
    let mut subs = Vec::new();

    let keys = [
        SettingKey::Prefix,
        SettingKey::Postfix,
        SettingKey::PrefixExtraClass,
        SettingKey::PostfixExtraClass,
        SettingKey::ButtonUpClass,
        SettingKey::ButtonDownClass,
        SettingKey::ButtonUpTxt,
        SettingKey::ButtonDownTxt,
        SettingKey::VerticalUpClass,
        SettingKey::VerticalDownClass,
        SettingKey::VerticalUp,
        SettingKey::VerticalDown,
        SettingKey::FocusableButtons,
    ];
    for key in keys {
        let dom = dom.clone();
        let mirror = Rc::clone(&mirror);
        subs.push(host.observe_setting(
            key,
            Box::new(move |value: &SettingValue| {
                let mut s = mirror.borrow_mut();
                mirror_into(&mut s, key, value);
                apply_cosmetic(&dom, &look, parts, &s, key);
            }),
        ));
    }
    subs
}

fn mirror_into(s: &mut Settings, key: SettingKey, value: &SettingValue) {
    let text = || value.as_text().unwrap_or_default().to_string();
    match key {
        SettingKey::Prefix => s.prefix = text(),
        SettingKey::Postfix => s.postfix = text(),
        SettingKey::PrefixExtraClass => s.prefix_extraclass = text(),
        SettingKey::PostfixExtraClass => s.postfix_extraclass = text(),
        SettingKey::ButtonUpClass => s.buttonup_class = text(),
        SettingKey::ButtonDownClass => s.buttondown_class = text(),
        SettingKey::ButtonUpTxt => s.buttonup_txt = text(),
        SettingKey::ButtonDownTxt => s.buttondown_txt = text(),
        SettingKey::VerticalUpClass => s.verticalupclass = text(),
        SettingKey::VerticalDownClass => s.verticaldownclass = text(),
        SettingKey::VerticalUp => s.verticalup = text(),
        SettingKey::VerticalDown => s.verticaldown = text(),
        SettingKey::FocusableButtons => s.focusablebuttons = value.as_bool().unwrap_or(false),
        _ => {}
    }
}

fn apply_cosmetic(dom: &Dom, look: &Look, parts: Parts, s: &Settings, key: SettingKey) {
    match key {
        SettingKey::Prefix => set_affix_text(dom, parts.prefix, &s.prefix),
        SettingKey::Postfix => set_affix_text(dom, parts.postfix, &s.postfix),
        SettingKey::PrefixExtraClass => {
            dom.set_attribute(
                parts.prefix,
                "class",
                &join_classes(&[look.prefix, s.prefix_extraclass.as_str()]),
            );
        }
        SettingKey::PostfixExtraClass => {
            dom.set_attribute(
                parts.postfix,
                "class",
                &join_classes(&[look.postfix, s.postfix_extraclass.as_str()]),
            );
        }
        SettingKey::FocusableButtons => {
            set_focusable(dom, parts.up, s.focusablebuttons);
            set_focusable(dom, parts.down, s.focusablebuttons);
        }
        _ => {
            let (up_class, up_text) = up_face(look, s);
            let (down_class, down_text) = down_face(look, s);
            dom.set_attribute(parts.up, "class", &up_class);
            dom.set_attribute(parts.down, "class", &down_class);
            dom.set_text_content(parts.up, &up_text);
            dom.set_text_content(parts.down, &down_text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_skips_blank_fragments() {
        assert_eq!(join_classes(&["btn ", "", "  ", "x"]), "btn x");
        assert_eq!(join_classes(&[]), "");
    }

    #[test]
    fn faces_follow_layout() {
        let look = InputGroupRenderer::LOOK;
        let mut s = Settings {
            verticalupclass: "vu".into(),
            ..Settings::default()
        };
        assert_eq!(up_face(&look, &s).0, "btn btn-outline-secondary spinbox-up");
        s.verticalbuttons = true;
        assert_eq!(up_face(&look, &s).0, "btn btn-outline-secondary vu spinbox-up");
        assert_eq!(down_face(&look, &s).1, "\u{2212}");
    }
}
