#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Web/WASM surface for JSOML documents.
//!
//! [`DomSurface`] implements [`jsoml::Surface`] over `web-sys` nodes, so any
//! rendered [`jsoml::OutputNode`] can be materialized in the browser.
//! [`JsomlView`] binds a surface to a mounting element and is exported to
//! JavaScript through `wasm_bindgen`.

mod app;
mod dom;
mod error;

pub use app::{JsomlView, JsomlViewBuilder, media_type};
pub use dom::{DomRoot, DomSurface};
pub use error::WebError;
