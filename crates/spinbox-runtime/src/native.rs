#![forbid(unsafe_code)]

//! Native `type` / `min` / `max` / `step` attribute management.
//!
//! On a `type="number"` input the engine mirrors sanitized bounds into the
//! native attributes so the platform's own validation agrees with the
//! engine. When a display transform produces non-numeric text, the input
//! type is relaxed to `text` so the platform accepts it.
//!
//! # Invariants
//!
//! 1. The original values of the four attributes (or their absence) are
//!    captured once, before any write.
//! 2. [`NativeAttrs::restore`] puts every captured attribute back in place
//!    (same value, same position when it still exists).
//! 3. Non-number inputs are never touched.

use spinbox_core::{Settings, is_numeric_text};
use spinbox_dom::{Dom, NodeId};

const MANAGED: [&str; 4] = ["type", "min", "max", "step"];

/// Captured native attributes of one input.
#[derive(Debug, Clone, Default)]
pub(crate) struct NativeAttrs {
    /// Value and attribute position of each managed attribute.
    original: [Option<(String, usize)>; 4],
    numeric: bool,
    relaxed: bool,
}

impl NativeAttrs {
    pub(crate) fn capture(dom: &Dom, input: NodeId) -> Self {
        let original = MANAGED.map(|name| {
            let value = dom.get_attribute(input, name)?;
            Some((value, dom.attribute_index(input, name)?))
        });
        let numeric = original[0]
            .as_ref()
            .is_some_and(|(t, _)| t.trim().eq_ignore_ascii_case("number"));
        Self {
            original,
            numeric,
            relaxed: false,
        }
    }

    pub(crate) fn is_relaxed(&self) -> bool {
        self.relaxed
    }

    /// Mirror sanitized bounds into `min` / `max` / `step`.
    pub(crate) fn sync_bounds(&self, dom: &Dom, input: NodeId, settings: &Settings) {
        if !self.numeric {
            return;
        }
        for (name, value) in [
            ("min", settings.min),
            ("max", settings.max),
            ("step", Some(settings.step)),
        ] {
            match value {
                Some(v) => {
                    dom.set_attribute(input, name, &v.to_string());
                }
                None => {
                    dom.remove_attribute(input, name);
                }
            }
        }
    }

    /// Relax or re-tighten the input type for the display text just written.
    pub(crate) fn sync_display(&mut self, dom: &Dom, input: NodeId, display: &str) {
        if !self.numeric {
            return;
        }
        let numeric_text = display.trim().is_empty() || is_numeric_text(display);
        if !numeric_text && !self.relaxed {
            dom.set_attribute(input, "type", "text");
            self.relaxed = true;
            tracing::debug!(message = "spinbox.native.relaxed", input = input.raw());
        } else if numeric_text && self.relaxed {
            dom.set_attribute(input, "type", "number");
            self.relaxed = false;
        }
    }

    /// Put the captured attributes back.
    pub(crate) fn restore(&mut self, dom: &Dom, input: NodeId) {
        if !self.numeric {
            return;
        }
        // Absent ones first, so re-inserted indices line up with the capture.
        for (name, original) in MANAGED.iter().zip(&self.original) {
            if original.is_none() {
                dom.remove_attribute(input, name);
            }
        }
        let mut present: Vec<(&str, &(String, usize))> = MANAGED
            .iter()
            .zip(&self.original)
            .filter_map(|(name, original)| Some((*name, original.as_ref()?)))
            .collect();
        present.sort_by_key(|(_, (_, index))| *index);
        for (name, (value, index)) in present {
            dom.insert_attribute(input, *index, name, value);
        }
        self.relaxed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sync_then_restore_is_exact() {
        let dom = Dom::new();
        let input = dom.append_element(
            dom.body(),
            "input",
            &[("min", "1"), ("id", "q"), ("type", "number"), ("step", "any")],
        );
        let before = dom.outer_html(input);

        let mut native = NativeAttrs::capture(&dom, input);
        let settings = Settings {
            min: None,
            max: Some(40.0),
            step: 0.5,
            ..Settings::default()
        };
        native.sync_bounds(&dom, input, &settings);
        assert_eq!(dom.get_attribute(input, "min"), None);
        assert_eq!(dom.get_attribute(input, "max").as_deref(), Some("40"));
        assert_eq!(dom.get_attribute(input, "step").as_deref(), Some("0.5"));

        native.sync_display(&dom, input, "$12");
        assert!(native.is_relaxed());
        assert_eq!(dom.get_attribute(input, "type").as_deref(), Some("text"));

        native.restore(&dom, input);
        assert_eq!(dom.outer_html(input), before);
    }

    #[test]
    fn relax_and_tighten_follow_display() {
        let dom = Dom::new();
        let input = dom.append_element(dom.body(), "input", &[("type", "number")]);
        let mut native = NativeAttrs::capture(&dom, input);
        native.sync_display(&dom, input, "12 kg");
        assert!(native.is_relaxed());
        native.sync_display(&dom, input, "12");
        assert!(!native.is_relaxed());
        assert_eq!(dom.get_attribute(input, "type").as_deref(), Some("number"));
    }

    #[test]
    fn text_inputs_are_left_alone() {
        let dom = Dom::new();
        let input = dom.append_element(dom.body(), "input", &[("type", "text")]);
        let before = dom.outer_html(input);
        let mut native = NativeAttrs::capture(&dom, input);
        native.sync_bounds(&dom, input, &Settings::default());
        native.sync_display(&dom, input, "$5");
        native.restore(&dom, input);
        assert_eq!(dom.outer_html(input), before);
    }
}
