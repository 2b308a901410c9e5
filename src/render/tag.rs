//! Per-tag rendering.

use futures::future::LocalBoxFuture;
use futures::{FutureExt, StreamExt};

use super::attribute::{ATTRIBUTE_SIGIL, apply_attribute};
use super::{RenderStream, substitute};
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::node::{Element, OutputNode, is_valid_name};
use crate::source::{JsomlSource, JsomlValue};

/// Renders one `(tag, value)` pair into a single node.
///
/// Never fails: any error is replaced by an error node for this tag only.
pub(super) fn render_tag<'a>(
    tag: String,
    source: JsomlSource,
    config: &'a RenderConfig,
    depth: usize,
) -> LocalBoxFuture<'a, OutputNode> {
    async move {
        tracing::trace!(%tag, depth, "rendering tag");
        match build_element(&tag, source, config, depth).await {
            Ok(element) => OutputNode::Element(element),
            Err(error) => substitute(&error),
        }
    }
    .boxed_local()
}

async fn build_element(
    tag: &str,
    source: JsomlSource,
    config: &RenderConfig,
    depth: usize,
) -> Result<Element, RenderError> {
    config.check_tag(tag, depth)?;

    if !is_valid_name(tag) {
        return Err(RenderError::InvalidTagName {
            tag: tag.to_string(),
        });
    }

    let mut element = Element::new(tag);

    match source.resolve().await? {
        JsomlValue::Text(text) => element.set_text(text),
        JsomlValue::List(entries) => {
            for entry in entries {
                let mut children = RenderStream::new(entry, config, depth + 1);
                while let Some(child) = children.next().await {
                    element.append(child);
                }
            }
        }
        JsomlValue::Mapping(mapping) => {
            for (key, value) in mapping {
                if let Some(attribute) = key.strip_prefix(ATTRIBUTE_SIGIL) {
                    // An attribute failure aborts the whole element.
                    apply_attribute(&mut element, attribute, value).await?;
                } else {
                    // A child failure stays with the child.
                    let child = render_tag(key, value, config, depth + 1).await;
                    element.append(child);
                }
            }
        }
        other => {
            return Err(RenderError::UnsupportedContent {
                tag: tag.to_string(),
                kind: other.kind(),
            });
        }
    }

    Ok(element)
}
