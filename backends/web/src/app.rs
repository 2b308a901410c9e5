use futures::FutureExt;
use jsoml::{JsomlSource, RenderConfig};

use crate::{dom::DomRoot, error::WebError};

/// Builder for [`JsomlView`].
#[derive(Debug, Clone)]
pub struct JsomlViewBuilder {
    root_id: String,
    config: RenderConfig,
}

impl JsomlViewBuilder {
    /// Creates a builder mounting into the element with the given id.
    #[must_use]
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            config: RenderConfig::default(),
        }
    }

    /// Sets the render policy.
    #[must_use]
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Finalises the builder and creates a [`JsomlView`].
    ///
    /// # Errors
    ///
    /// Returns an error if the DOM root element cannot be found.
    pub fn build(self) -> Result<JsomlView, WebError> {
        Ok(JsomlView {
            root: DomRoot::new(&self.root_id)?,
            config: self.config,
        })
    }
}

/// A DOM element whose children are driven by JSOML documents.
///
/// Every render replaces the element's children in one step.
#[wasm_bindgen]
#[derive(Debug)]
pub struct JsomlView {
    root: DomRoot,
    config: RenderConfig,
}

impl JsomlView {
    /// Returns the mounting root.
    #[must_use]
    pub const fn root(&self) -> &DomRoot {
        &self.root
    }

    /// Returns the render policy.
    #[must_use]
    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replaces the render policy.
    pub fn replace_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    /// Renders `source` and replaces the root's children, awaiting pending values.
    ///
    /// # Errors
    ///
    /// Returns an error if a DOM operation fails; the root is left unchanged.
    pub async fn mount(&self, source: impl Into<JsomlSource>) -> Result<(), WebError> {
        let mut surface = self.root.surface();
        jsoml::mount(&mut surface, self.root.element(), source, &self.config).await
    }
}

use wasm_bindgen::prelude::*;

/// Media type to request documents with, as the `Accept` header of a fetch.
#[wasm_bindgen(js_name = mediaType)]
#[must_use]
pub fn media_type() -> String {
    jsoml::MEDIA_TYPE.to_string()
}

#[wasm_bindgen]
impl JsomlView {
    /// Convenience constructor exposed to JavaScript callers.
    ///
    /// # Errors
    ///
    /// Returns an error if the DOM root element cannot be found.
    #[wasm_bindgen(constructor)]
    pub fn new(root_id: &str) -> Result<Self, WebError> {
        console_error_panic_hook::set_once();
        JsomlViewBuilder::new(root_id).build()
    }

    /// Replaces the render policy with one parsed from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has unknown keys.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, json: &str) -> Result<(), WebError> {
        self.config = RenderConfig::from_json_str(json)
            .map_err(|e| WebError::InvalidDocument(e.to_string()))?;
        Ok(())
    }

    /// Parses a JSON document and renders it into the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a DOM operation fails.
    #[wasm_bindgen(js_name = renderJson)]
    pub fn render_json(&self, json: &str) -> Result<(), WebError> {
        let source = json
            .parse::<JsomlSource>()
            .map_err(|e| WebError::InvalidDocument(e.to_string()))?;
        tracing::debug!(root = %self.root.element().id(), "rendering JSON document");
        self.mount(source).now_or_never().ok_or(WebError::Pending)?
    }
}
