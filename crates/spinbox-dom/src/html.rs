#![forbid(unsafe_code)]

//! Markup serialization for snapshot comparisons.
//!
//! Output is deterministic: attributes keep document order, text is escaped,
//! and void elements (`input`, `br`, ...) have no closing tag. The `value`
//! property is not serialized, only the `value` attribute.

use crate::dom::Dom;
use crate::node::{NodeId, NodeKind, Tree};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

impl Dom {
    /// Serialize `node` and its subtree.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        self.with_tree(|tree| {
            let mut out = String::new();
            write_node(tree, node, &mut out);
            out
        })
    }

    /// Serialize the children of `node`.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        self.with_tree(|tree| {
            let mut out = String::new();
            if let Some(data) = tree.get(node) {
                for child in &data.children {
                    write_node(tree, *child, &mut out);
                }
            }
            out
        })
    }
}

fn write_node(tree: &Tree, node: NodeId, out: &mut String) {
    let Some(data) = tree.get(node) else {
        return;
    };
    match &data.kind {
        NodeKind::Document => {
            for child in &data.children {
                write_node(tree, *child, out);
            }
        }
        NodeKind::Text(text) => escape_into(text, false, out),
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            for child in &data.children {
                write_node(tree, *child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
