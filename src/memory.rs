//! A headless [`Surface`] backed by an arena of nodes.

use indexmap::IndexMap;
use thiserror::Error;

use crate::node::{Element, OutputNode, Style, is_valid_name};
use crate::surface::Surface;

/// Handle to a node owned by a [`MemorySurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Failure reported by a [`MemorySurface`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The handle does not belong to this surface.
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    /// The handle points at a text node where an element is required.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    /// The name cannot be used as a tag or attribute name.
    #[error("'{0}' is not a valid name")]
    InvalidName(String),
}

#[derive(Debug)]
enum Slot {
    Text(String),
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
        style: Style,
        children: Vec<NodeId>,
    },
}

/// In-memory node tree.
///
/// # Example
///
/// ```rust
/// use jsoml::{MemorySurface, RenderConfig, mount};
///
/// let mut surface = MemorySurface::new();
/// let root = surface.create_root("main");
/// let source: jsoml::JsomlSource = r#"{"p": "hi"}"#.parse().unwrap();
/// let config = RenderConfig::default();
/// futures::executor::block_on(mount(&mut surface, &root, source, &config)).unwrap();
/// assert_eq!(surface.children(root).unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemorySurface {
    slots: Vec<Slot>,
}

impl MemorySurface {
    /// Creates an empty surface.
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Creates a detached element to mount into.
    pub fn create_root(&mut self, tag: &str) -> NodeId {
        self.push(Slot::Element {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            style: Style::default(),
            children: Vec::new(),
        })
    }

    /// Number of nodes ever allocated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no node was allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Children of an element.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is unknown or not an element.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], MemoryError> {
        match self.slot(id)? {
            Slot::Element { children, .. } => Ok(children),
            Slot::Text(_) => Err(MemoryError::NotAnElement(id)),
        }
    }

    /// Copies the subtree rooted at `id` back into an [`OutputNode`].
    ///
    /// # Errors
    ///
    /// Returns an error if `id` or one of its descendants is unknown.
    pub fn snapshot(&self, id: NodeId) -> Result<OutputNode, MemoryError> {
        match self.slot(id)? {
            Slot::Text(text) => Ok(OutputNode::text(text.clone())),
            Slot::Element {
                tag,
                attributes,
                style,
                children,
            } => {
                let mut element = Element::new(tag.clone());
                element.attributes.clone_from(attributes);
                element.style.clone_from(style);
                element.children = children
                    .iter()
                    .map(|child| self.snapshot(*child))
                    .collect::<Result<_, _>>()?;
                Ok(element.into())
            }
        }
    }

    fn push(&mut self, slot: Slot) -> NodeId {
        self.slots.push(slot);
        NodeId(self.slots.len() - 1)
    }

    fn slot(&self, id: NodeId) -> Result<&Slot, MemoryError> {
        self.slots.get(id.0).ok_or(MemoryError::UnknownNode(id))
    }

    fn element_mut(
        &mut self,
        id: NodeId,
    ) -> Result<(&mut IndexMap<String, String>, &mut Style, &mut Vec<NodeId>), MemoryError> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Element {
                attributes,
                style,
                children,
                ..
            }) => Ok((attributes, style, children)),
            Some(Slot::Text(_)) => Err(MemoryError::NotAnElement(id)),
            None => Err(MemoryError::UnknownNode(id)),
        }
    }
}

impl Surface for MemorySurface {
    type Node = NodeId;
    type Element = NodeId;
    type Error = MemoryError;

    fn create_element(&mut self, tag: &str) -> Result<NodeId, MemoryError> {
        if !is_valid_name(tag) {
            return Err(MemoryError::InvalidName(tag.to_string()));
        }
        Ok(self.create_root(tag))
    }

    fn create_text_node(&mut self, text: &str) -> Result<NodeId, MemoryError> {
        Ok(self.push(Slot::Text(text.to_string())))
    }

    fn set_text_content(&mut self, element: &NodeId, text: &str) -> Result<(), MemoryError> {
        self.element_mut(*element)?;
        let replacement = if text.is_empty() {
            Vec::new()
        } else {
            vec![self.push(Slot::Text(text.to_string()))]
        };
        let (_, _, children) = self.element_mut(*element)?;
        *children = replacement;
        Ok(())
    }

    fn set_attribute(
        &mut self,
        element: &NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), MemoryError> {
        if !is_valid_name(name) {
            return Err(MemoryError::InvalidName(name.to_string()));
        }
        let (attributes, _, _) = self.element_mut(*element)?;
        attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_style_text(&mut self, element: &NodeId, css: &str) -> Result<(), MemoryError> {
        let (_, style, _) = self.element_mut(*element)?;
        style.set_text(css);
        Ok(())
    }

    fn set_style_property(
        &mut self,
        element: &NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), MemoryError> {
        let (_, style, _) = self.element_mut(*element)?;
        style.set_property(name, value);
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: NodeId) -> Result<(), MemoryError> {
        self.slot(child)?;
        let (_, _, children) = self.element_mut(*parent)?;
        children.push(child);
        Ok(())
    }

    fn replace_children(
        &mut self,
        target: &NodeId,
        children: Vec<NodeId>,
    ) -> Result<(), MemoryError> {
        for child in &children {
            self.slot(*child)?;
        }
        let (_, _, current) = self.element_mut(*target)?;
        *current = children;
        Ok(())
    }

    fn into_node(&mut self, element: NodeId) -> NodeId {
        element
    }
}
