//! The JSOML source grammar.
//!
//! A document is a [`JsomlSource`]: either a value that is already available
//! ([`JsomlValue`]) or a [`PendingValue`] that must be awaited before it can be
//! inspected. Every position inside a mapping or a list is itself a
//! [`JsomlSource`], so a provider may defer any part of the tree.

use core::fmt;
use core::future::Future;
use core::mem;
use core::str::FromStr;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Number;

/// Media type under which content providers deliver JSOML documents.
///
/// Send it as the `Accept` header when fetching a document:
///
/// ```rust
/// assert_eq!(jsoml::MEDIA_TYPE, "application/json+jsoml");
/// assert!(jsoml::MEDIA_TYPE.ends_with("+jsoml"));
/// ```
pub const MEDIA_TYPE: &str = "application/json+jsoml";

/// Error produced when a [`PendingValue`] fails to settle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ResolveError(String);

impl ResolveError {
    /// Creates a resolve error from any displayable reason.
    pub fn new(reason: impl fmt::Display) -> Self {
        Self(reason.to_string())
    }

    /// Returns the reason the value could not be resolved.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// A source value that has not been resolved yet.
pub struct PendingValue(LocalBoxFuture<'static, Result<JsomlSource, ResolveError>>);

impl PendingValue {
    /// Suspends until the value settles.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure if the value cannot be produced.
    pub async fn settle(self) -> Result<JsomlSource, ResolveError> {
        self.0.await
    }
}

impl fmt::Debug for PendingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PendingValue(..)")
    }
}

/// A position in a JSOML document: available now, or still resolving.
#[derive(Debug)]
pub enum JsomlSource {
    /// A value that can be inspected immediately.
    Ready(JsomlValue),
    /// A value that requires suspension before inspection.
    Pending(PendingValue),
}

impl JsomlSource {
    /// Wraps a fallible future as a pending source.
    pub fn pending<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<JsomlSource, E>> + 'static,
        E: fmt::Display,
    {
        Self::Pending(PendingValue(
            future.map(|result| result.map_err(ResolveError::new)).boxed_local(),
        ))
    }

    /// Wraps an infallible future as a pending source.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = JsomlSource> + 'static,
    {
        Self::Pending(PendingValue(future.map(Ok).boxed_local()))
    }

    /// Creates a text source.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Ready(JsomlValue::Text(text.into()))
    }

    /// Creates a mapping source from ordered entries.
    pub fn mapping<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Ready(JsomlValue::Mapping(entries.into_iter().collect()))
    }

    /// Creates a list source.
    pub fn list<V: Into<Self>>(entries: impl IntoIterator<Item = V>) -> Self {
        Self::Ready(JsomlValue::List(entries.into_iter().collect()))
    }

    /// Suspends until a ready value is available.
    ///
    /// A pending value may itself settle to another pending value; resolution
    /// continues until a [`JsomlValue`] is reached.
    ///
    /// # Errors
    ///
    /// Returns the first failure reported by a pending value along the way.
    pub async fn resolve(self) -> Result<JsomlValue, ResolveError> {
        let mut source = self;
        loop {
            match source {
                Self::Ready(value) => return Ok(value),
                Self::Pending(pending) => source = pending.settle().await?,
            }
        }
    }
}

/// A resolved JSOML value.
///
/// Only [`JsomlValue::Text`], [`JsomlValue::Mapping`] and [`JsomlValue::List`]
/// carry renderable content. The scalar variants exist so that wire input of
/// an unsupported shape can be reported instead of rejected at parse time.
#[derive(Debug)]
pub enum JsomlValue {
    /// JSON `null`.
    Null,
    /// A JSON boolean.
    Bool(bool),
    /// A JSON number.
    Number(Number),
    /// A string.
    Text(String),
    /// An ordered mapping of keys to nested sources.
    Mapping(Mapping),
    /// An ordered list of nested sources.
    List(List),
}

impl JsomlValue {
    /// Name of this value's shape as used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
            Self::Mapping(_) => "mapping",
            Self::List(_) => "list",
        }
    }
}

/// Ordered `(key, value)` entries of a mapping.
///
/// Keys are visited in insertion order. Duplicate keys are kept as separate
/// entries.
#[derive(Debug, Default)]
pub struct Mapping {
    entries: Vec<(String, JsomlSource)>,
}

impl Mapping {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<JsomlSource>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl<K: Into<String>, V: Into<JsomlSource>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Mapping {
    type Item = (String, JsomlSource);
    type IntoIter = std::vec::IntoIter<(String, JsomlSource)>;

    fn into_iter(mut self) -> Self::IntoIter {
        mem::take(&mut self.entries).into_iter()
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            drop_nested(
                mem::take(&mut self.entries)
                    .into_iter()
                    .map(|(_, value)| value)
                    .collect(),
            );
        }
    }
}

/// Ordered entries of a list.
#[derive(Debug, Default)]
pub struct List {
    entries: Vec<JsomlSource>,
}

impl List {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn push(&mut self, value: impl Into<JsomlSource>) {
        self.entries.push(value.into());
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Into<JsomlSource>> FromIterator<V> for List {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for List {
    type Item = JsomlSource;
    type IntoIter = std::vec::IntoIter<JsomlSource>;

    fn into_iter(mut self) -> Self::IntoIter {
        mem::take(&mut self.entries).into_iter()
    }
}

impl Drop for List {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            drop_nested(mem::take(&mut self.entries));
        }
    }
}

/// Drops nested sources from an explicit work stack instead of recursing, so
/// arbitrarily deep documents can be released.
fn drop_nested(mut stack: Vec<JsomlSource>) {
    while let Some(source) = stack.pop() {
        match source {
            JsomlSource::Ready(JsomlValue::Mapping(mut mapping)) => {
                stack.extend(mem::take(&mut mapping.entries).into_iter().map(|(_, value)| value));
            }
            JsomlSource::Ready(JsomlValue::List(mut list)) => stack.append(&mut list.entries),
            _ => {}
        }
    }
}

impl From<JsomlValue> for JsomlSource {
    fn from(value: JsomlValue) -> Self {
        Self::Ready(value)
    }
}

impl From<Mapping> for JsomlSource {
    fn from(value: Mapping) -> Self {
        Self::Ready(JsomlValue::Mapping(value))
    }
}

impl From<List> for JsomlSource {
    fn from(value: List) -> Self {
        Self::Ready(JsomlValue::List(value))
    }
}

impl From<&str> for JsomlSource {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for JsomlSource {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl<V: Into<Self>> From<Vec<V>> for JsomlSource {
    fn from(value: Vec<V>) -> Self {
        Self::list(value)
    }
}

impl From<serde_json::Value> for JsomlValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().collect()),
            Value::Object(object) => Self::Mapping(object.into_iter().collect()),
        }
    }
}

impl From<serde_json::Value> for JsomlSource {
    fn from(value: serde_json::Value) -> Self {
        Self::Ready(value.into())
    }
}

impl<'de> Deserialize<'de> for JsomlSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SourceVisitor)
    }
}

struct SourceVisitor;

impl<'de> Visitor<'de> for SourceVisitor {
    type Value = JsomlSource;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSOML document")
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsomlSource, E> {
        Ok(JsomlValue::Null.into())
    }

    fn visit_none<E: de::Error>(self) -> Result<JsomlSource, E> {
        Ok(JsomlValue::Null.into())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<JsomlSource, D::Error> {
        JsomlSource::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<JsomlSource, E> {
        Ok(JsomlValue::Bool(value).into())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<JsomlSource, E> {
        Ok(JsomlValue::Number(value.into()).into())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<JsomlSource, E> {
        Ok(JsomlValue::Number(value.into()).into())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<JsomlSource, E> {
        Ok(Number::from_f64(value).map_or(JsomlValue::Null, JsomlValue::Number).into())
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<JsomlSource, E> {
        Ok(JsomlSource::text(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<JsomlSource, E> {
        Ok(JsomlSource::text(value))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsomlSource, A::Error> {
        let mut list = List::new();
        while let Some(entry) = seq.next_element::<JsomlSource>()? {
            list.push(entry);
        }
        Ok(list.into())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsomlSource, A::Error> {
        let mut mapping = Mapping::new();
        while let Some((key, value)) = map.next_entry::<String, JsomlSource>()? {
            mapping.push(key, value);
        }
        Ok(mapping.into())
    }
}

impl FromStr for JsomlSource {
    type Err = serde_json::Error;

    /// Parses a JSON document of any nesting depth.
    ///
    /// Nesting is limited by [`RenderConfig::max_depth`](crate::RenderConfig)
    /// at render time, not by the parser.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut json = serde_json::Deserializer::from_str(s);
        json.disable_recursion_limit();
        let source = Self::deserialize(serde_stacker::Deserializer::new(&mut json))?;
        json.end()?;
        Ok(source)
    }
}
