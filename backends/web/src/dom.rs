use crate::error::WebError;

use jsoml::Surface;
use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, Document, Element, HtmlElement, Node, SvgElement, Window};

/// The element a JSOML document is mounted into.
#[derive(Debug, Clone)]
pub struct DomRoot {
    document: Document,
    element: Element,
}

impl DomRoot {
    /// Creates a [`DomRoot`] pointing at the provided element id.
    ///
    /// # Errors
    ///
    /// Returns an error if no document is available or the id is unknown.
    pub fn new(root_id: &str) -> Result<Self, WebError> {
        let window: Window = web_sys::window().ok_or(WebError::DomUnavailable)?;
        let document: Document = window.document().ok_or(WebError::DomUnavailable)?;

        let element = document
            .get_element_by_id(root_id)
            .ok_or_else(|| WebError::RootNotFound(root_id.to_string()))?;

        Ok(Self { document, element })
    }

    /// Returns the DOM element representing the mounting point.
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    /// Returns the owning document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Creates a surface that builds nodes in this root's document.
    #[must_use]
    pub fn surface(&self) -> DomSurface {
        DomSurface::new(self.document.clone())
    }
}

/// [`Surface`] over real DOM nodes.
#[derive(Debug, Clone)]
pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    /// Creates a surface that allocates nodes from `document`.
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }
}

fn inline_style(element: &Element) -> Option<CssStyleDeclaration> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        return Some(html.style());
    }
    element.dyn_ref::<SvgElement>().map(SvgElement::style)
}

impl Surface for DomSurface {
    type Node = Node;
    type Element = Element;
    type Error = WebError;

    fn create_element(&mut self, tag: &str) -> Result<Element, WebError> {
        Ok(self.document.create_element(tag)?)
    }

    fn create_text_node(&mut self, text: &str) -> Result<Node, WebError> {
        Ok(self.document.create_text_node(text).into())
    }

    fn set_text_content(&mut self, element: &Element, text: &str) -> Result<(), WebError> {
        element.set_text_content(Some(text));
        Ok(())
    }

    fn set_attribute(
        &mut self,
        element: &Element,
        name: &str,
        value: &str,
    ) -> Result<(), WebError> {
        Ok(element.set_attribute(name, value)?)
    }

    fn set_style_text(&mut self, element: &Element, css: &str) -> Result<(), WebError> {
        match inline_style(element) {
            Some(style) => style.set_css_text(css),
            None => element.set_attribute("style", css)?,
        }
        Ok(())
    }

    fn set_style_property(
        &mut self,
        element: &Element,
        name: &str,
        value: &str,
    ) -> Result<(), WebError> {
        let style = inline_style(element).ok_or_else(|| {
            WebError::Js(format!("<{}> has no inline style", element.tag_name()))
        })?;
        Ok(style.set_property(name, value)?)
    }

    fn append_child(&mut self, parent: &Element, child: Node) -> Result<(), WebError> {
        parent.append_child(&child)?;
        Ok(())
    }

    fn replace_children(&mut self, target: &Element, children: Vec<Node>) -> Result<(), WebError> {
        let nodes: js_sys::Array = children.into_iter().collect();
        target.replace_children_with_node(&nodes);
        Ok(())
    }

    fn into_node(&mut self, element: Element) -> Node {
        element.into()
    }
}
