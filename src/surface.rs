//! The platform side: turning [`OutputNode`]s into real nodes.

use crate::config::RenderConfig;
use crate::node::{ERROR_STYLE, ERROR_TAG, OutputNode};
use crate::render::render_nodes;
use crate::source::JsomlSource;

/// Capabilities a platform must provide to materialize output nodes.
///
/// Implemented by [`MemorySurface`](crate::MemorySurface) for headless use and
/// by the browser backend over DOM nodes.
pub trait Surface {
    /// Any node that can be placed in the tree.
    type Node;
    /// An element node that can carry attributes, style and children.
    type Element;
    /// Platform failure.
    type Error: core::error::Error;

    /// Creates an element with the given tag name.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the tag name.
    fn create_element(&mut self, tag: &str) -> Result<Self::Element, Self::Error>;

    /// Creates a text node.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot allocate the node.
    fn create_text_node(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

    /// Replaces an element's content with text.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is unknown to the platform.
    fn set_text_content(&mut self, element: &Self::Element, text: &str)
    -> Result<(), Self::Error>;

    /// Sets a named attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the attribute name.
    fn set_attribute(
        &mut self,
        element: &Self::Element,
        name: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    /// Replaces the element's inline style with raw style text.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is unknown to the platform.
    fn set_style_text(&mut self, element: &Self::Element, css: &str) -> Result<(), Self::Error>;

    /// Merges one property into the element's inline style.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is unknown to the platform.
    fn set_style_property(
        &mut self,
        element: &Self::Element,
        name: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    /// Appends a child to an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses the insertion.
    fn append_child(&mut self, parent: &Self::Element, child: Self::Node)
    -> Result<(), Self::Error>;

    /// Replaces every child of `target` with `children` in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses the replacement.
    fn replace_children(
        &mut self,
        target: &Self::Element,
        children: Vec<Self::Node>,
    ) -> Result<(), Self::Error>;

    /// Converts an element handle into a generic node handle.
    fn into_node(&mut self, element: Self::Element) -> Self::Node;
}

/// Materializes one output node, and its descendants, on a surface.
///
/// Error nodes become a highlighted `div` carrying the failure message.
///
/// # Errors
///
/// Returns the first platform failure.
pub fn realize<S: Surface + ?Sized>(
    surface: &mut S,
    node: &OutputNode,
) -> Result<S::Node, S::Error> {
    match node {
        OutputNode::Text { text } => surface.create_text_node(text),
        OutputNode::Error(error) => {
            let element = surface.create_element(ERROR_TAG)?;
            surface.set_text_content(&element, &error.message)?;
            for (name, value) in ERROR_STYLE {
                surface.set_style_property(&element, name, value)?;
            }
            Ok(surface.into_node(element))
        }
        OutputNode::Element(source) => {
            let element = surface.create_element(&source.tag)?;
            for (name, value) in &source.attributes {
                surface.set_attribute(&element, name, value)?;
            }
            if let Some(css) = source.style.text.as_deref() {
                surface.set_style_text(&element, css)?;
            }
            for (name, value) in &source.style.properties {
                surface.set_style_property(&element, name, value)?;
            }
            for child in &source.children {
                let child = realize(surface, child)?;
                surface.append_child(&element, child)?;
            }
            Ok(surface.into_node(element))
        }
    }
}

/// Renders `source` and replaces the children of `target` with the result.
///
/// The whole output is rendered and realized before `target` is touched, so
/// the replacement is a single step. Use [`render`](crate::render) directly
/// to insert nodes as they become available.
///
/// # Errors
///
/// Returns the first platform failure; `target` is left unchanged in that case.
pub async fn mount<S: Surface + ?Sized>(
    surface: &mut S,
    target: &S::Element,
    source: impl Into<JsomlSource>,
    config: &RenderConfig,
) -> Result<(), S::Error> {
    let nodes = render_nodes(source, config).await;
    tracing::debug!(count = nodes.len(), "mounting rendered nodes");

    let children = nodes
        .iter()
        .map(|node| realize(surface, node))
        .collect::<Result<Vec<_>, _>>()?;
    surface.replace_children(target, children)
}
