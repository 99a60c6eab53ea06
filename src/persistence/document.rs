//! Per-tenant configuration document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// Indentation used when rendering a document for storage.
const INDENT: &[u8] = b"    ";

/// A JSON object mapping string keys to arbitrary JSON values.
///
/// Reads are null-safe: looking up an absent key yields [`Value::Null`]
/// instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(Map<String, Value>);

impl ConfigDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses stored content. The top-level value must be an object.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `content` is not a JSON object.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Renders the document with four-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error only if a value cannot be serialized.
    pub fn to_pretty_string(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::with_capacity(128);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(serde::ser::Error::custom)
    }

    /// Returns the value at `key`, or [`Value::Null`] if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&NULL)
    }

    /// Returns the value at `key` if it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).as_str()
    }

    /// Sets `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns `true` if `key` is present (even if its value is null).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the document has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ConfigDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<ConfigDocument> for Value {
    fn from(doc: ConfigDocument) -> Self {
        Self::Object(doc.0)
    }
}
