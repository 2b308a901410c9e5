//! The render engine.
//!
//! [`render`] walks a [`JsomlSource`] depth-first, left to right, and yields
//! one [`OutputNode`] per top-level fragment. Pending values are awaited in
//! the order they are encountered; siblings are never resolved concurrently.
//!
//! Failures never escape the engine. Each one is converted into an error node
//! at the smallest unit that owns it:
//!
//! - an unsupported top-level shape or list entry becomes one error node;
//! - a tag that violates the policy, or whose content fails, becomes one error
//!   node while its siblings keep rendering;
//! - a failing attribute replaces the *whole* element being built.

mod attribute;
mod tag;

use core::pin::Pin;
use core::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::stream::FusedStream;
use futures::{FutureExt, Stream, StreamExt};

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::node::OutputNode;
use crate::source::{JsomlSource, JsomlValue, Mapping, ResolveError};

pub use attribute::ATTRIBUTE_SIGIL;

/// Renders a source into a lazy sequence of output nodes.
///
/// A plain string yields one text node, a mapping yields one node per entry
/// in key order, and any other shape yields a single error node. The stream
/// is single-pass; earlier nodes are available before later pending values
/// have settled.
///
/// # Example
///
/// ```rust
/// use futures::StreamExt;
/// use jsoml::{JsomlSource, OutputNode, RenderConfig, render};
///
/// let source: JsomlSource = r#"{"p": "hello"}"#.parse().unwrap();
/// let config = RenderConfig::default();
/// let nodes: Vec<OutputNode> = futures::executor::block_on(render(source, &config).collect());
/// assert_eq!(nodes.len(), 1);
/// ```
pub fn render(source: impl Into<JsomlSource>, config: &RenderConfig) -> RenderStream<'_> {
    let span = tracing::debug_span!("render", max_depth = ?config.max_depth);
    span.in_scope(|| tracing::debug!("rendering source"));
    RenderStream {
        span,
        ..RenderStream::new(source.into(), config, 0)
    }
}

/// Renders a source and collects every node.
pub async fn render_nodes(
    source: impl Into<JsomlSource>,
    config: &RenderConfig,
) -> Vec<OutputNode> {
    render(source, config).collect().await
}

/// Lazy, single-pass sequence of output nodes returned by [`render`].
#[must_use = "streams do nothing unless polled"]
pub struct RenderStream<'a> {
    config: &'a RenderConfig,
    depth: usize,
    state: State<'a>,
    // Entered on every poll; nested streams run inside their parent's span.
    span: tracing::Span,
}

enum State<'a> {
    Start(JsomlSource),
    Resolving(LocalBoxFuture<'static, Result<JsomlValue, ResolveError>>),
    Entries(<Mapping as IntoIterator>::IntoIter),
    Rendering(
        LocalBoxFuture<'a, OutputNode>,
        <Mapping as IntoIterator>::IntoIter,
    ),
    Done,
}

impl<'a> RenderStream<'a> {
    pub(crate) fn new(source: JsomlSource, config: &'a RenderConfig, depth: usize) -> Self {
        Self {
            config,
            depth,
            state: State::Start(source),
            span: tracing::Span::none(),
        }
    }
}

impl Stream for RenderStream<'_> {
    type Item = OutputNode;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let _entered = this.span.enter();
        loop {
            match core::mem::replace(&mut this.state, State::Done) {
                State::Start(source) => {
                    this.state = State::Resolving(source.resolve().boxed_local());
                }
                State::Resolving(mut resolving) => match resolving.poll_unpin(cx) {
                    Poll::Pending => {
                        this.state = State::Resolving(resolving);
                        return Poll::Pending;
                    }
                    Poll::Ready(Ok(JsomlValue::Text(text))) => {
                        return Poll::Ready(Some(OutputNode::text(text)));
                    }
                    Poll::Ready(Ok(JsomlValue::Mapping(mapping))) => {
                        this.state = State::Entries(mapping.into_iter());
                    }
                    Poll::Ready(Ok(other)) => {
                        let error = RenderError::UnsupportedShape { kind: other.kind() };
                        return Poll::Ready(Some(substitute(&error)));
                    }
                    Poll::Ready(Err(error)) => {
                        return Poll::Ready(Some(substitute(&error.into())));
                    }
                },
                State::Entries(mut entries) => match entries.next() {
                    Some((tag, value)) => {
                        let rendering = tag::render_tag(tag, value, this.config, this.depth);
                        this.state = State::Rendering(rendering, entries);
                    }
                    None => return Poll::Ready(None),
                },
                State::Rendering(mut rendering, entries) => match rendering.poll_unpin(cx) {
                    Poll::Pending => {
                        this.state = State::Rendering(rendering, entries);
                        return Poll::Pending;
                    }
                    Poll::Ready(node) => {
                        this.state = State::Entries(entries);
                        return Poll::Ready(Some(node));
                    }
                },
                State::Done => return Poll::Ready(None),
            }
        }
    }
}

impl FusedStream for RenderStream<'_> {
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Done)
    }
}

impl core::fmt::Debug for RenderStream<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderStream")
            .field("depth", &self.depth)
            .field("span", &self.span)
            .field("terminated", &self.is_terminated())
            .finish_non_exhaustive()
    }
}

/// Converts a failure into the error node that takes its place.
fn substitute(error: &RenderError) -> OutputNode {
    tracing::warn!(%error, "substituting error node");
    OutputNode::error(error)
}

#[cfg(test)]
mod tests;
