//! Normalized resource representation
//!
//! A [`Resource`] is the backend-agnostic record an enumerator produces for
//! one discovered cloud object. The engine core never interprets the
//! attribute payload beyond passing it along in order; shape belongs to the
//! backend that produced it and to the downstream writer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One discovered cloud object in vendor-neutral form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Canonical resource type string (registry vocabulary).
    pub resource_type: String,
    /// Backend-assigned identifier.
    pub id: String,
    /// Human-readable name, when the backend exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw attribute object as returned by the backend listing call.
    pub attributes: Value,
}

impl Resource {
    pub fn new(resource_type: &str, id: impl Into<String>, attributes: Value) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            id: id.into(),
            name: None,
            attributes,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read the tags stored under the backend-designated attribute key.
    ///
    /// Backends disagree on tag shape; the three forms seen in the wild are
    /// supported: an object map, a list of `{"key": .., "value": ..}`
    /// objects, and a list of `"key=value"` strings.
    pub fn tags(&self, tag_key: &str) -> Vec<(String, String)> {
        extract_tags(&self.attributes, tag_key)
    }
}

/// Tag extraction over a raw attribute object; shared with [`Filter::keep`].
///
/// [`Filter::keep`]: crate::filter::Filter::keep
pub(crate) fn extract_tags(attributes: &Value, tag_key: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let Some(raw) = attributes.get(tag_key) else {
        return out;
    };

    match raw {
        Value::Object(map) => {
            for (k, v) in map {
                if let Some(s) = v.as_str() {
                    out.push((k.clone(), s.to_string()));
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    // [{"key": "env", "value": "prod"}]
                    Value::Object(map) => {
                        if let (Some(k), Some(v)) = (
                            map.get("key").and_then(Value::as_str),
                            map.get("value").and_then(Value::as_str),
                        ) {
                            out.push((k.to_string(), v.to_string()));
                        }
                    }
                    // ["env=prod"]
                    Value::String(s) => {
                        if let Some((k, v)) = s.split_once('=') {
                            out.push((k.to_string(), v.to_string()));
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    out
}
