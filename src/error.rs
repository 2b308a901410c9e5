//! Render failures.
//!
//! Every variant is caught at its smallest enclosing unit and turned into an
//! [`ErrorNode`](crate::ErrorNode) whose message is the variant's `Display`
//! text. None of them escape [`render`](crate::render).

use thiserror::Error;

use crate::source::ResolveError;

/// Reason a fragment of a document could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The top-level source (or a list entry) is neither a string nor a mapping.
    #[error("Cannot render '{kind}'. Expected one of string or mapping")]
    UnsupportedShape {
        /// Shape that was found.
        kind: &'static str,
    },
    /// A tag's value is a scalar other than a string.
    #[error("Cannot render '{kind}' as content of tag '{tag}'")]
    UnsupportedContent {
        /// Tag whose content was rejected.
        tag: String,
        /// Shape that was found.
        kind: &'static str,
    },
    /// The tag is on the exclude list.
    #[error("Tag '{tag}' is not allowed (via exclude list)")]
    TagExcluded {
        /// Offending tag name.
        tag: String,
    },
    /// An include list is configured and the tag is not on it.
    #[error("Tag '{tag}' is not allowed (via include list)")]
    TagNotIncluded {
        /// Offending tag name.
        tag: String,
    },
    /// The tag sits deeper than the configured maximum.
    #[error("Max depth reached")]
    MaxDepthReached {
        /// Depth of the offending tag.
        depth: usize,
        /// Configured maximum.
        max_depth: usize,
    },
    /// The tag name cannot name an element.
    #[error("Tag '{tag}' is not a valid element name")]
    InvalidTagName {
        /// Offending tag name.
        tag: String,
    },
    /// An attribute value has an unsupported shape or the attribute name is invalid.
    #[error("Attribute '{attribute}' could not be rendered on tag '{tag}'")]
    Attribute {
        /// Attribute name with the sigil stripped.
        attribute: String,
        /// Tag under construction.
        tag: String,
    },
    /// A pending source value failed to settle.
    #[error("Source could not be resolved: {0}")]
    Unresolved(#[from] ResolveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_messages() {
        let excluded = RenderError::TagExcluded {
            tag: "script".to_string(),
        };
        assert_eq!(
            excluded.to_string(),
            "Tag 'script' is not allowed (via exclude list)"
        );

        let depth = RenderError::MaxDepthReached {
            depth: 3,
            max_depth: 2,
        };
        assert_eq!(depth.to_string(), "Max depth reached");
    }

    #[test]
    fn test_unresolved_wraps_reason() {
        let error = RenderError::from(ResolveError::new("timed out"));
        assert_eq!(error.to_string(), "Source could not be resolved: timed out");
    }
}
