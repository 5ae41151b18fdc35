//! Per-entity element parsing for list responses.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Boxed error returned by element parsers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type ParseFn<T> = dyn Fn(&Value) -> Result<T, BoxError> + Send + Sync;

/// Turns one JSON element of a list response into a `T`.
///
/// Collections are generic over the element type; the parser is injected at
/// construction instead of subclassing per entity.
pub struct ElementParser<T> {
    parse: Arc<ParseFn<T>>,
}

impl<T: 'static> ElementParser<T> {
    /// Build a parser from a closure.
    pub fn from_fn<F, E>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let parse = move |value: &Value| -> Result<T, BoxError> { f(value).map_err(Into::into) };
        Self {
            parse: Arc::new(parse),
        }
    }
}

impl<T> ElementParser<T> {
    /// Parse one element.
    pub fn parse(&self, value: &Value) -> Result<T, BoxError> {
        (self.parse)(value)
    }
}

impl<T: DeserializeOwned + 'static> ElementParser<T> {
    /// Parser that deserializes each element with serde.
    pub fn deserialize() -> Self {
        Self::from_fn(|value: &Value| T::deserialize(value))
    }
}

impl<T> Clone for ElementParser<T> {
    fn clone(&self) -> Self {
        Self {
            parse: Arc::clone(&self.parse),
        }
    }
}

impl<T> fmt::Debug for ElementParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementParser")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

/// Elements that can be looked up by their server-side identifier.
pub trait Identifiable {
    /// The element's identifier.
    fn id(&self) -> &str;
}

/// Parse the array stored under `field` in a list response.
///
/// An absent or `null` field yields an empty list. Elements the parser
/// rejects are skipped and logged.
pub(crate) fn parse_elements<T>(document: &Value, field: &str, parser: &ElementParser<T>) -> Vec<T> {
    let elements = match document.get(field) {
        Some(Value::Array(elements)) => elements,
        None | Some(Value::Null) => return Vec::new(),
        Some(other) => {
            warn!(field, kind = value_kind(other), "List field is not an array, treating as empty");
            return Vec::new();
        }
    };

    elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| match parser.parse(element) {
            Ok(item) => Some(item),
            Err(error) => {
                warn!(field, index, error = %error, "Skipping element that failed to parse");
                None
            }
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
