//! HTML serialization of output nodes.

use core::fmt::Write;

use crate::config::RenderConfig;
use crate::node::{ERROR_STYLE, ERROR_TAG, OutputNode};
use crate::render::render_nodes;
use crate::source::JsomlSource;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Serializes one node as HTML.
#[must_use]
pub fn to_html(node: &OutputNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

/// Renders `source` and serializes every resulting node, concatenated.
pub async fn render_to_html(source: impl Into<JsomlSource>, config: &RenderConfig) -> String {
    let mut out = String::new();
    for node in render_nodes(source, config).await {
        write_node(&mut out, &node);
    }
    out
}

fn write_node(out: &mut String, node: &OutputNode) {
    match node {
        OutputNode::Text { text } => out.push_str(&escape_html(text)),
        OutputNode::Error(error) => {
            let style = ERROR_STYLE
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(
                out,
                "<{ERROR_TAG} style=\"{}\">{}</{ERROR_TAG}>",
                escape_html(&style),
                escape_html(&error.message)
            );
        }
        OutputNode::Element(element) => {
            let _ = write!(out, "<{}", element.tag);
            for (name, value) in &element.attributes {
                let _ = write!(out, " {name}=\"{}\"", escape_html(value));
            }
            if !element.style.is_empty() {
                let _ = write!(out, " style=\"{}\"", escape_html(&element.style.to_css()));
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&element.tag.to_ascii_lowercase().as_str()) {
                return;
            }

            for child in &element.children {
                write_node(out, child);
            }
            let _ = write!(out, "</{}>", element.tag);
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
