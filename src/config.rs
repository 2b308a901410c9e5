//! Render policy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Maximum nesting depth applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Policy applied to every tag of one render invocation.
///
/// The configuration is borrowed immutably for the whole traversal.
///
/// # Example
///
/// ```rust
/// use jsoml::RenderConfig;
///
/// let config = RenderConfig::default()
///     .with_excluded_tags(["script", "iframe"])
///     .with_max_depth(32);
/// assert!(config.check_tag("div", 0).is_ok());
/// assert!(config.check_tag("script", 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Tags allowed to render. `None` or an empty set allows every tag.
    pub included_tags: Option<BTreeSet<String>>,
    /// Tags that never render. Takes precedence over `included_tags`.
    pub excluded_tags: Option<BTreeSet<String>>,
    /// Deepest nesting level that still renders. `None` disables the guard.
    pub max_depth: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            included_tags: None,
            excluded_tags: None,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl RenderConfig {
    /// Restricts rendering to the given tags.
    #[must_use]
    pub fn with_included_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Prevents the given tags from rendering.
    #[must_use]
    pub fn with_excluded_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the deepest nesting level that still renders.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Disables the depth guard.
    #[must_use]
    pub const fn without_depth_limit(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or contains unknown keys.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Applies the tag policy: exclusion, then inclusion, then the depth guard.
    ///
    /// A tag at exactly `max_depth` passes.
    ///
    /// # Errors
    ///
    /// Returns the first policy the tag violates.
    pub fn check_tag(&self, tag: &str, depth: usize) -> Result<(), RenderError> {
        if self
            .excluded_tags
            .as_ref()
            .is_some_and(|excluded| excluded.contains(tag))
        {
            return Err(RenderError::TagExcluded {
                tag: tag.to_string(),
            });
        }

        if self
            .included_tags
            .as_ref()
            .is_some_and(|included| !included.is_empty() && !included.contains(tag))
        {
            return Err(RenderError::TagNotIncluded {
                tag: tag.to_string(),
            });
        }

        if let Some(max_depth) = self.max_depth
            && depth > max_depth
        {
            return Err(RenderError::MaxDepthReached { depth, max_depth });
        }

        Ok(())
    }
}
