//! Output nodes produced by the render engine.
//!
//! These are plain values. A [`Surface`](crate::Surface) turns them into real
//! platform nodes.

use core::fmt;

use heck::ToKebabCase;
use indexmap::IndexMap;
use serde::Serialize;

/// Tag used when an [`ErrorNode`] is realized on a surface.
pub const ERROR_TAG: &str = "div";

/// Style properties applied to a realized [`ErrorNode`].
pub const ERROR_STYLE: [(&str, &str); 3] = [
    ("color", "yellow"),
    ("background", "red"),
    ("font-weight", "bold"),
];

/// One rendered node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputNode {
    /// A text node.
    Text {
        /// Text content.
        text: String,
    },
    /// An element with attributes, style and children.
    Element(Element),
    /// A visible diagnostic standing in for a fragment that failed.
    Error(ErrorNode),
}

impl OutputNode {
    /// Creates a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Builds the diagnostic node substituted for a failed fragment.
    pub fn error(reason: impl fmt::Display) -> Self {
        Self::Error(ErrorNode::new(reason))
    }

    /// Returns `true` if this node is a diagnostic.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the element if this node is one.
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    ///
    /// Diagnostics contribute their message.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { text } => out.push_str(text),
            Self::Error(error) => out.push_str(&error.message),
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Collects every diagnostic below (and including) this node, depth-first.
    #[must_use]
    pub fn errors(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.collect_errors(&mut Vec::new(), &mut diagnostics);
        diagnostics
    }

    fn collect_errors(&self, path: &mut Vec<String>, out: &mut Vec<Diagnostic>) {
        match self {
            Self::Text { .. } => {}
            Self::Error(error) => out.push(Diagnostic {
                path: path.join(" > "),
                message: error.message.clone(),
            }),
            Self::Element(element) => {
                path.push(element.tag.clone());
                for child in &element.children {
                    child.collect_errors(path, out);
                }
                path.pop();
            }
        }
    }
}

/// A diagnostic located by the chain of ancestor tags leading to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Ancestor tags joined with `" > "`; empty at the top level.
    pub path: String,
    /// Error message carried by the node.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Visible diagnostic for a failed fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNode {
    /// Stringified failure reason.
    pub message: String,
}

impl ErrorNode {
    /// Creates a diagnostic from any displayable reason.
    pub fn new(reason: impl fmt::Display) -> Self {
        Self {
            message: reason.to_string(),
        }
    }
}

/// An element under construction or fully rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Element name.
    pub tag: String,
    /// Attributes in first-set order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Inline style.
    #[serde(skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    /// Child nodes in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutputNode>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            style: Style::default(),
            children: Vec::new(),
        }
    }

    /// Replaces all children with a single text node.
    ///
    /// An empty string leaves the element without children.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(OutputNode::Text { text });
        }
    }

    /// Sets an attribute. Re-setting keeps the attribute's original position.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Appends a child.
    pub fn append(&mut self, child: OutputNode) {
        self.children.push(child);
    }
}

impl From<Element> for OutputNode {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

/// Inline style of an element.
///
/// Raw style text and merged properties behave like a platform style object:
/// assigning raw text discards previously merged properties, merging
/// overwrites individual properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Style {
    /// Raw style text, stored verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Individually merged properties, keyed by CSS property name.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
}

impl Style {
    /// Returns `true` if no style has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.properties.is_empty()
    }

    /// Replaces the whole style with raw text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
        self.properties.clear();
    }

    /// Sets one property. camelCase names are converted to CSS names.
    pub fn set_property(&mut self, name: &str, value: impl Into<String>) {
        self.properties.insert(css_property_name(name), value.into());
    }

    /// Removes one property.
    pub fn remove_property(&mut self, name: &str) {
        self.properties.shift_remove(&css_property_name(name));
    }

    /// Returns a merged property value.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(&css_property_name(name))
            .map(String::as_str)
    }

    /// Serializes the style as a declaration list.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut declarations: Vec<String> = Vec::new();
        if let Some(text) = self.text.as_deref() {
            let text = text.trim().trim_end_matches(';');
            if !text.is_empty() {
                declarations.push(text.to_string());
            }
        }
        declarations.extend(
            self.properties
                .iter()
                .map(|(name, value)| format!("{name}: {value}")),
        );
        declarations.join("; ")
    }
}

/// Script-style vendor prefixes that map to a leading dash in CSS.
const VENDOR_PREFIXES: [&str; 5] = ["Webkit", "webkit", "Moz", "moz", "ms"];

/// Converts a script-style property name (`fontWeight`) to its CSS form (`font-weight`).
///
/// Vendor prefixes gain a leading dash (`WebkitTransition` is
/// `-webkit-transition`) and `cssFloat` is `float`. Custom properties and
/// names that already contain a dash are kept verbatim.
#[must_use]
pub fn css_property_name(name: &str) -> String {
    if name == "cssFloat" {
        return "float".to_string();
    }
    if name.starts_with("--") || name.contains('-') || !name.chars().any(char::is_uppercase) {
        return name.to_string();
    }

    let vendor = VENDOR_PREFIXES.iter().any(|prefix| {
        name.strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(char::is_uppercase)
    });
    if vendor {
        format!("-{}", name.to_kebab_case())
    } else {
        name.to_kebab_case()
    }
}

/// Returns `true` if `name` can name an element or attribute.
///
/// Mirrors the platform's create-element and set-attribute checks: a name
/// starts with a letter, `_` or `:` and continues with letters, digits, `-`,
/// `.`, `_` or `:`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
}
