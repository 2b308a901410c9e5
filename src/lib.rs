#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::future_not_send)]

pub mod config;
pub mod error;
pub mod html;
mod memory;
pub mod node;
mod render;
pub mod source;
mod surface;

pub use config::{DEFAULT_MAX_DEPTH, RenderConfig};
pub use error::RenderError;
pub use memory::{MemoryError, MemorySurface, NodeId};
pub use node::{Diagnostic, Element, ErrorNode, OutputNode, Style};
pub use render::{ATTRIBUTE_SIGIL, RenderStream, render, render_nodes};
pub use source::{
    JsomlSource, JsomlValue, List, MEDIA_TYPE, Mapping, PendingValue, ResolveError,
};
pub use surface::{Surface, mount, realize};

pub use tracing as log;
