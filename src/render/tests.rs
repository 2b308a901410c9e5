use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::stream::FusedStream;
use futures::{FutureExt, StreamExt};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

use super::*;
use crate::node::Element;

fn json(text: &str) -> JsomlSource {
    text.parse().expect("test document should be valid JSON")
}

fn render_all(source: JsomlSource, config: &RenderConfig) -> Vec<OutputNode> {
    block_on(render_nodes(source, config))
}

fn element(node: &OutputNode) -> &Element {
    node.as_element()
        .unwrap_or_else(|| panic!("expected an element, got {node:?}"))
}

fn nested_document(depth: usize) -> String {
    format!(r#"{}"leaf"{}"#, r#"{"div": "#.repeat(depth), "}".repeat(depth))
}

/// Counts nested `div` elements down to the first non-element child.
fn nesting(node: &OutputNode) -> (usize, &OutputNode) {
    let mut levels = 0;
    let mut current = node;
    while let OutputNode::Element(element) = current {
        assert_eq!(element.tag, "div");
        assert_eq!(element.children.len(), 1);
        levels += 1;
        current = &element.children[0];
    }
    (levels, current)
}

/// Runs `f` on a thread with room for a full-depth render in debug builds.
fn on_large_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(64 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

/// Records the name of every span entered.
#[derive(Clone, Default)]
struct EnteredSpans(Arc<Mutex<Vec<&'static str>>>);

impl<S> Layer<S> for EnteredSpans
where
    S: tracing::Subscriber + for<'l> LookupSpan<'l>,
{
    fn on_enter(&self, id: &tracing::span::Id, ctx: tracing_subscriber::layer::Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            self.0.lock().unwrap().push(span.name());
        }
    }
}

/// Returns `Pending` once, waking itself, then completes.
struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[test]
fn test_plain_string_yields_one_text_node() {
    let nodes = render_all(JsomlSource::text("hello"), &RenderConfig::default());
    assert_eq!(nodes, vec![OutputNode::text("hello")]);
}

#[test]
fn test_mapping_yields_one_node_per_key_in_order() {
    let source = json(r#"{"h1": "title", "p": "body", "footer": "end"}"#);
    let nodes = render_all(source, &RenderConfig::default());
    let tags: Vec<_> = nodes.iter().map(|n| element(n).tag.as_str()).collect();
    assert_eq!(tags, ["h1", "p", "footer"]);
}

#[test]
fn test_count_holds_under_total_failure() {
    let source = json(r#"{"a": "1", "b": "2", "c": "3"}"#);
    let config = RenderConfig::default().with_excluded_tags(["a", "b", "c"]);
    let nodes = render_all(source, &config);
    assert_eq!(nodes.len(), 3);
    assert!(nodes.iter().all(OutputNode::is_error));
}

#[test]
fn test_unsupported_top_level_shapes() {
    let config = RenderConfig::default();
    for (text, kind) in [("5", "number"), ("true", "boolean"), ("null", "null"), ("[]", "list")] {
        let nodes = render_all(json(text), &config);
        assert_eq!(
            nodes,
            vec![OutputNode::error(format!(
                "Cannot render '{kind}'. Expected one of string or mapping"
            ))]
        );
    }
}

#[test]
fn test_empty_mapping_yields_nothing() {
    let nodes = render_all(json("{}"), &RenderConfig::default());
    assert!(nodes.is_empty());
}

#[test]
fn test_tag_at_max_depth_renders_and_below_does_not() {
    let resolved = Rc::new(Cell::new(false));
    let flag = Rc::clone(&resolved);
    let mut c = Mapping::new();
    c.push(
        "d",
        JsomlSource::deferred(async move {
            flag.set(true);
            JsomlSource::text("never")
        }),
    );
    let source = JsomlSource::mapping([(
        "a",
        JsomlSource::mapping([("b", JsomlSource::mapping([("c", JsomlSource::from(c))]))]),
    )]);

    let nodes = render_all(source, &RenderConfig::default().with_max_depth(1));
    let a = element(&nodes[0]);
    let b = element(&a.children[0]);
    assert_eq!(b.tag, "b");
    assert_eq!(b.children, vec![OutputNode::error("Max depth reached")]);
    assert!(!resolved.get());
}

#[test]
fn test_list_fan_out_counts_as_one_level() {
    let source = json(r#"{"ul": [{"li": "one"}, {"li": "two"}]}"#);

    let shallow = render_all(
        json(r#"{"ul": [{"li": "one"}]}"#),
        &RenderConfig::default().with_max_depth(0),
    );
    let ul = element(&shallow[0]);
    assert_eq!(ul.children, vec![OutputNode::error("Max depth reached")]);

    let nodes = render_all(source, &RenderConfig::default().with_max_depth(1));
    let ul = element(&nodes[0]);
    assert_eq!(ul.children.len(), 2);
    assert_eq!(element(&ul.children[1]).tag, "li");
}

#[test]
fn test_excluded_tag_degrades_everywhere() {
    let source = json(r#"{"div": {"x": "inner", "p": "kept"}, "x": "outer", "span": "also kept"}"#);
    let config = RenderConfig::default().with_excluded_tags(["x"]);
    let nodes = render_all(source, &config);

    assert_eq!(nodes.len(), 3);
    let div = element(&nodes[0]);
    assert_eq!(
        div.children[0],
        OutputNode::error("Tag 'x' is not allowed (via exclude list)")
    );
    assert_eq!(element(&div.children[1]).tag, "p");
    assert!(nodes[1].is_error());
    assert_eq!(element(&nodes[2]).tag, "span");
}

#[test]
fn test_include_list_only_renders_listed_tags() {
    let source = json(r#"{"y": {"y": "ok", "z": "no"}, "z": "no"}"#);
    let config = RenderConfig::default().with_included_tags(["y"]);
    let nodes = render_all(source, &config);

    let outer = element(&nodes[0]);
    assert_eq!(element(&outer.children[0]).tag, "y");
    assert_eq!(
        outer.children[1],
        OutputNode::error("Tag 'z' is not allowed (via include list)")
    );
    assert!(nodes[1].is_error());
}

#[test]
fn test_raw_style_text() {
    let nodes = render_all(json(r#"{"p": {"$style": "color:red"}}"#), &RenderConfig::default());
    assert_eq!(element(&nodes[0]).style.text.as_deref(), Some("color:red"));
}

#[test]
fn test_style_mapping_is_merged() {
    let source = json(r#"{"p": {"$style": {"color": "red", "fontWeight": "bold"}}}"#);
    let nodes = render_all(source, &RenderConfig::default());
    let style = &element(&nodes[0]).style;
    assert_eq!(style.property("color"), Some("red"));
    assert_eq!(style.property("fontWeight"), Some("bold"));
}

#[test]
fn test_bad_style_replaces_whole_element() {
    let source = json(r#"{"div": {"span": "rendered first", "$style": 5}, "p": "sibling"}"#);
    let nodes = render_all(source, &RenderConfig::default());
    assert_eq!(
        nodes[0],
        OutputNode::error("Attribute 'style' could not be rendered on tag 'div'")
    );
    assert_eq!(element(&nodes[1]).tag, "p");
}

#[test]
fn test_attribute_failure_aborts_element_but_child_failure_is_isolated() {
    let config = RenderConfig::default().with_excluded_tags(["script"]);

    let child_failure = render_all(json(r#"{"div": {"script": "x", "p": "ok"}}"#), &config);
    let div = element(&child_failure[0]);
    assert_eq!(div.children.len(), 2);
    assert!(div.children[0].is_error());
    assert_eq!(element(&div.children[1]).tag, "p");

    let attribute_failure = render_all(json(r#"{"div": {"p": "ok", "$title": ["x"]}}"#), &config);
    assert_eq!(attribute_failure.len(), 1);
    assert!(attribute_failure[0].is_error());
}

#[test]
fn test_list_children_in_order() {
    let nodes = render_all(json(r#"{"div": ["a", "b"]}"#), &RenderConfig::default());
    assert_eq!(
        element(&nodes[0]).children,
        vec![OutputNode::text("a"), OutputNode::text("b")]
    );
}

#[test]
fn test_list_entries_fail_independently() {
    let source = json(r#"{"div": ["a", 7, {"b": "c"}, {"b": "c"}]}"#);
    let nodes = render_all(source, &RenderConfig::default());
    let div = element(&nodes[0]);
    assert_eq!(div.children.len(), 4);
    assert!(div.children[1].is_error());
    assert_eq!(div.children[2], div.children[3]);
}

#[test]
fn test_attributes_and_children_together() {
    let text = r#"{"div": {"$id": "x", "span": "hi"}}"#;
    let nodes = render_all(json(text), &RenderConfig::default());
    let div = element(&nodes[0]);
    assert_eq!(div.attribute("id"), Some("x"));
    assert_eq!(div.children.len(), 1);
    let span = element(&div.children[0]);
    assert_eq!(span.tag, "span");
    assert_eq!(span.children, vec![OutputNode::text("hi")]);

    assert_eq!(nodes, render_all(json(text), &RenderConfig::default()));
}

#[test]
fn test_text_attribute_replaces_earlier_children() {
    let source = json(r#"{"p": {"b": "bold", "$text": "plain", "i": "after"}}"#);
    let nodes = render_all(source, &RenderConfig::default());
    let p = element(&nodes[0]);
    assert_eq!(p.children[0], OutputNode::text("plain"));
    assert_eq!(element(&p.children[1]).tag, "i");
}

#[test]
fn test_scalar_tag_content_is_an_error() {
    let nodes = render_all(json(r#"{"p": 3, "b": "ok"}"#), &RenderConfig::default());
    assert_eq!(
        nodes[0],
        OutputNode::error("Cannot render 'number' as content of tag 'p'")
    );
    assert!(!nodes[1].is_error());
}

#[test]
fn test_invalid_tag_name_is_isolated() {
    let nodes = render_all(
        json(r#"{"div": {"bad tag": "x", "ok": "y"}}"#),
        &RenderConfig::default(),
    );
    let div = element(&nodes[0]);
    assert_eq!(
        div.children[0],
        OutputNode::error("Tag 'bad tag' is not a valid element name")
    );
    assert_eq!(element(&div.children[1]).tag, "ok");
}

#[test]
fn test_pending_values_everywhere() {
    let source = JsomlSource::deferred(async {
        JsomlSource::mapping([(
            "section",
            JsomlSource::deferred(async {
                JsomlSource::mapping([
                    ("$class", JsomlSource::deferred(async { JsomlSource::text("card") })),
                    (
                        "ul",
                        JsomlSource::list([JsomlSource::deferred(async {
                            YieldNow(false).await;
                            JsomlSource::text("item")
                        })]),
                    ),
                ])
            }),
        )])
    });

    let nodes = render_all(source, &RenderConfig::default());
    let section = element(&nodes[0]);
    assert_eq!(section.attribute("class"), Some("card"));
    assert_eq!(
        element(&section.children[0]).children,
        vec![OutputNode::text("item")]
    );
}

#[test]
fn test_failed_resolution_is_isolated() {
    let failing = || JsomlSource::pending(async { Err::<JsomlSource, _>("offline") });

    let top = render_all(failing(), &RenderConfig::default());
    assert_eq!(
        top,
        vec![OutputNode::error("Source could not be resolved: offline")]
    );

    let source = JsomlSource::mapping([
        ("a", failing()),
        ("b", JsomlSource::list([failing(), JsomlSource::text("fine")])),
    ]);
    let nodes = render_all(source, &RenderConfig::default());
    assert!(nodes[0].is_error());
    let b = element(&nodes[1]);
    assert!(b.children[0].is_error());
    assert_eq!(b.children[1], OutputNode::text("fine"));
}

#[test]
fn test_siblings_resolve_sequentially() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let entry = |name: &'static str| {
        let log = Rc::clone(&log);
        JsomlSource::deferred(async move {
            log.borrow_mut().push(format!("{name}:start"));
            YieldNow(false).await;
            log.borrow_mut().push(format!("{name}:end"));
            JsomlSource::text(name)
        })
    };
    let source = JsomlSource::mapping([("a", entry("a")), ("b", entry("b"))]);

    render_all(source, &RenderConfig::default());
    assert_eq!(*log.borrow(), ["a:start", "a:end", "b:start", "b:end"]);
}

#[test]
fn test_earlier_nodes_are_available_before_later_ones_settle() {
    let (sender, receiver) = oneshot::channel::<JsomlSource>();
    let source = JsomlSource::mapping([
        ("first", JsomlSource::text("ready")),
        (
            "second",
            JsomlSource::pending(async move { receiver.await.map_err(|_| "cancelled") }),
        ),
    ]);
    let config = RenderConfig::default();
    let mut stream = render(source, &config);

    let first = stream.next().now_or_never().flatten();
    assert_eq!(element(&first.unwrap()).tag, "first");
    assert!(stream.next().now_or_never().is_none());

    sender.send(JsomlSource::text("late")).unwrap();
    let second = block_on(stream.next()).unwrap();
    assert_eq!(second.text_content(), "late");
    assert!(block_on(stream.next()).is_none());
    assert!(stream.is_terminated());
}

#[test]
fn test_parsed_document_renders_down_to_max_depth() {
    // Top-level tags sit at depth 0, so 257 nested tags reach depth 256.
    let levels = on_large_stack(|| {
        [256, 257].map(|depth| {
            let nodes = render_all(json(&nested_document(depth)), &RenderConfig::default());
            assert_eq!(nodes.len(), 1);
            assert!(nodes[0].errors().is_empty());
            let (levels, innermost) = nesting(&nodes[0]);
            assert_eq!(innermost, &OutputNode::text("leaf"));
            levels
        })
    });
    assert_eq!(levels, [256, 257]);
}

#[test]
fn test_parsed_document_past_max_depth_reports_once() {
    let (levels, errors) = on_large_stack(|| {
        let nodes = render_all(json(&nested_document(300)), &RenderConfig::default());
        let (levels, innermost) = nesting(&nodes[0]);
        assert_eq!(innermost, &OutputNode::error("Max depth reached"));
        (levels, nodes[0].errors().len())
    });
    assert_eq!(levels, 257);
    assert_eq!(errors, 1);
}

#[test]
fn test_very_deep_mapping_is_cut_at_max_depth() {
    let (levels, errors) = on_large_stack(|| {
        let mut source = JsomlSource::text("leaf");
        for _ in 0..200_000 {
            source = JsomlSource::mapping([("div", source)]);
        }
        let nodes = render_all(source, &RenderConfig::default());
        let (levels, innermost) = nesting(&nodes[0]);
        assert!(innermost.is_error());
        (levels, nodes[0].errors().len())
    });
    assert_eq!(levels, 257);
    assert_eq!(errors, 1);
}

#[test]
fn test_render_runs_inside_its_span() {
    let entered = EnteredSpans::default();
    let subscriber = tracing_subscriber::registry().with(entered.clone());
    let nodes = tracing::subscriber::with_default(subscriber, || {
        render_all(json(r#"{"p": "a", "b": "c"}"#), &RenderConfig::default())
    });
    assert_eq!(nodes.len(), 2);

    let names = entered.0.lock().unwrap();
    assert!(!names.is_empty());
    assert!(names.iter().all(|name| *name == "render"));
}
