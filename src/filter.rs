//! Resource filtering
//!
//! A [`Filter`] decides whether a discovered resource is kept, based on
//! include/exclude resource-type lists, target identifiers, and `name:value`
//! tag selectors. The engine passes the filter through to enumerators
//! unmodified; each enumerator calls [`Filter::keep`] per candidate before
//! including it in its result.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::DiscoveryError;
use crate::resource::extract_tags;

/// One `name:value` tag selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    /// Parse a selector of the form `name:value`. The value may itself
    /// contain `:`; only the first separator splits.
    pub fn parse(raw: &str) -> Result<Self, DiscoveryError> {
        match raw.split_once(':') {
            Some((name, value)) if !name.is_empty() => Ok(Tag {
                name: name.to_string(),
                value: value.to_string(),
            }),
            _ => Err(DiscoveryError::Configuration(format!(
                "invalid tag selector {raw:?}, expected NAME:VALUE"
            ))),
        }
    }
}

/// Keep/drop policy for one discovery session.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    include: Vec<String>,
    exclude: Vec<String>,
    targets: Vec<String>,
    tags: Vec<Tag>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict discovery to these resource types. Empty means all.
    pub fn with_include(mut self, types: Vec<String>) -> Self {
        self.include = types;
        self
    }

    /// Drop these resource types. Exclusion wins over inclusion.
    pub fn with_exclude(mut self, types: Vec<String>) -> Self {
        self.exclude = types;
        self
    }

    /// Restrict discovery to resources with these identifiers.
    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// Parse and attach `name:value` selectors, failing on the first
    /// malformed one.
    pub fn with_tag_selectors(self, raw: &[String]) -> Result<Self, DiscoveryError> {
        let tags = raw
            .iter()
            .map(|s| Tag::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.with_tags(tags))
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Whether a resource type survives the include/exclude lists.
    pub fn allows_type(&self, resource_type: &str) -> bool {
        if self.exclude.iter().any(|t| t == resource_type) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|t| t == resource_type)
    }

    /// Whether one candidate resource is kept.
    ///
    /// `attributes` is the raw attribute object the enumerator built;
    /// `tag_key` is the backend's canonical tag attribute name (see
    /// [`Provider::tag_key`]). Target identifiers match the attribute
    /// object's `id` field. All configured tag selectors must match.
    ///
    /// [`Provider::tag_key`]: crate::provider::Provider::tag_key
    pub fn keep(&self, resource_type: &str, attributes: &Value, tag_key: &str) -> bool {
        if !self.allows_type(resource_type) {
            return false;
        }

        if !self.targets.is_empty() {
            let id = attributes.get("id").and_then(Value::as_str).unwrap_or("");
            if !self.targets.iter().any(|t| t == id) {
                return false;
            }
        }

        if !self.tags.is_empty() {
            let tags: BTreeMap<String, String> =
                extract_tags(attributes, tag_key).into_iter().collect();
            for selector in &self.tags {
                if tags.get(&selector.name) != Some(&selector.value) {
                    return false;
                }
            }
        }

        true
    }
}
