//! Decode boundary between raw JSON payloads and the typed models.
//!
//! - Pure: no I/O, no logging, no caching. Every call yields an independent value.
//! - Errors carry the path of the offending field (via `serde_path_to_error`).
//! - Optional fields may be absent or `null`; only required fields and type
//!   mismatches fail a decode.

use core::fmt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::error::Category;
use serde_json::Value;
use std::error::Error;

/// The single failure kind of this layer: a payload did not match the schema.
#[derive(Debug)]
pub struct SchemaValidationError {
    entity: &'static str,
    path: String,
    missing_field: Option<String>,
    source: serde_json::Error,
}

impl SchemaValidationError {
    fn new(entity: &'static str, path: String, source: serde_json::Error) -> Self {
        let missing_field = missing_field_name(&source);
        SchemaValidationError {
            entity,
            path,
            missing_field,
            source,
        }
    }

    /// Short type name of the model being decoded (e.g. `Shutter`).
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Dotted path of the offending value; empty when the failure is at the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when a required field was absent from the payload.
    pub fn is_missing_field(&self) -> bool {
        self.missing_field.is_some()
    }

    /// Wire key of the absent required field, relative to [`path`](Self::path).
    pub fn missing_field(&self) -> Option<&str> {
        self.missing_field.as_deref()
    }

    fn prefixed(mut self, prefix: &str) -> Self {
        self.path = if self.path.is_empty() {
            prefix.to_string()
        } else if self.path.starts_with('[') {
            format!("{}{}", prefix, self.path)
        } else {
            format!("{}.{}", prefix, self.path)
        };
        self
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "invalid {} payload: {}", self.entity, self.source)
        } else {
            write!(f, "invalid {} payload at `{}`: {}", self.entity, self.path, self.source)
        }
    }
}

impl Error for SchemaValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

// serde reports absent fields as data errors shaped "missing field `name`".
fn missing_field_name(err: &serde_json::Error) -> Option<String> {
    if err.classify() != Category::Data {
        return None;
    }
    let message = err.to_string();
    let rest = message.strip_prefix("missing field `")?;
    rest.split_once('`').map(|(name, _)| name.to_string())
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn render_path(path: &serde_path_to_error::Path) -> String {
    let rendered = path.to_string();
    if rendered == "." { String::new() } else { rendered }
}

/// Decode a single model from an already-parsed JSON value.
pub fn decode<T: DeserializeOwned>(raw: Value) -> Result<T, SchemaValidationError> {
    serde_path_to_error::deserialize(raw).map_err(|e| {
        let path = render_path(e.path());
        SchemaValidationError::new(short_type_name::<T>(), path, e.into_inner())
    })
}

/// Parse JSON text and decode it. Malformed JSON is reported with an empty path.
pub fn decode_str<T: DeserializeOwned>(raw: &str) -> Result<T, SchemaValidationError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| SchemaValidationError::new(short_type_name::<T>(), String::new(), e))?;
    decode(value)
}

/// Decode a list endpoint response.
///
/// Accepts a bare array, a single object, or a `{"data": ...}` envelope whose
/// `data` is either of those. Element errors include the element index.
pub fn decode_collection<T: DeserializeOwned>(raw: Value) -> Result<Vec<T>, SchemaValidationError> {
    let (prefix, inner) = match raw {
        Value::Object(mut map) if map.contains_key("data") && !looks_like_entity(&map) => {
            let data = map.remove("data").unwrap_or(Value::Null);
            ("data", data)
        }
        other => ("", other),
    };

    match inner {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| decode::<T>(item).map_err(|e| e.prefixed(&format!("{prefix}[{i}]"))))
            .collect(),
        Value::Null if !prefix.is_empty() => Ok(Vec::new()),
        single => decode::<T>(single).map(|v| vec![v]).map_err(|e| {
            if prefix.is_empty() { e } else { e.prefixed(prefix) }
        }),
    }
}

// A bare entity always carries an `id`; an envelope does not.
fn looks_like_entity(map: &serde_json::Map<String, Value>) -> bool {
    map.contains_key("id")
}

/// Serialize a model back to JSON using the original wire keys.
pub fn encode<T: Serialize>(value: &T) -> Result<Value, SchemaValidationError> {
    serde_json::to_value(value).map_err(|e| SchemaValidationError::new(short_type_name::<T>(), String::new(), e))
}
