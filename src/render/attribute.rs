//! Attribute dispatch for sigil-prefixed mapping keys.

use crate::error::RenderError;
use crate::node::{Element, is_valid_name};
use crate::source::{JsomlSource, JsomlValue, Mapping};

/// Prefix marking a mapping key as an attribute rather than a nested tag.
pub const ATTRIBUTE_SIGIL: char = '$';

/// How an attribute name is applied to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeKind<'a> {
    /// `$text`: replaces the element's content with text.
    Text,
    /// `$style`: raw style text or a property mapping.
    Style,
    /// Anything else: a plain attribute.
    Generic(&'a str),
}

impl<'a> AttributeKind<'a> {
    const fn classify(name: &'a str) -> Self {
        match name.as_bytes() {
            b"text" => Self::Text,
            b"style" => Self::Style,
            _ => Self::Generic(name),
        }
    }
}

/// Resolves an attribute value and applies it to `element`.
///
/// # Errors
///
/// Returns [`RenderError::Attribute`] when the value shape is not supported
/// for this attribute, and [`RenderError::Unresolved`] when a pending value
/// fails to settle.
pub(super) async fn apply_attribute(
    element: &mut Element,
    name: &str,
    source: JsomlSource,
) -> Result<(), RenderError> {
    let value = source.resolve().await?;

    match (AttributeKind::classify(name), value) {
        (AttributeKind::Text, JsomlValue::Text(text)) => element.set_text(text),
        (AttributeKind::Style, JsomlValue::Text(css)) => element.style.set_text(css),
        (AttributeKind::Style, JsomlValue::Mapping(properties)) => {
            merge_style(element, name, properties).await?;
        }
        (AttributeKind::Generic(attribute), JsomlValue::Text(value))
            if is_valid_name(attribute) =>
        {
            element.set_attribute(attribute, value);
        }
        _ => return Err(rejected(element, name)),
    }

    Ok(())
}

/// Shallow-merges `properties` onto the element's style, later keys winning.
async fn merge_style(
    element: &mut Element,
    name: &str,
    properties: Mapping,
) -> Result<(), RenderError> {
    for (property, source) in properties {
        if property.is_empty() {
            return Err(rejected(element, name));
        }
        match source.resolve().await? {
            JsomlValue::Text(value) => element.style.set_property(&property, value),
            JsomlValue::Number(value) => element.style.set_property(&property, value.to_string()),
            JsomlValue::Bool(value) => element.style.set_property(&property, value.to_string()),
            JsomlValue::Null => element.style.remove_property(&property),
            JsomlValue::Mapping(_) | JsomlValue::List(_) => return Err(rejected(element, name)),
        }
    }
    Ok(())
}

fn rejected(element: &Element, attribute: &str) -> RenderError {
    RenderError::Attribute {
        attribute: attribute.to_string(),
        tag: element.tag.clone(),
    }
}
