//! Backend facade contract
//!
//! [`Provider`] is the uniform object everything else programs against.
//! Each cloud backend implements it once; the rest of the system treats all
//! clouds identically through this trait. Only [`Provider::resources`] may
//! fail for data-dependent reasons; every other operation is pure
//! introspection over state validated at construction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DiscoveryError;
use crate::filter::Filter;
use crate::resource::Resource;

/// Trait for cloud discovery backends
///
/// Backend instances are explicit values, constructed once and passed to
/// every caller; several independently-scoped instances (different regions,
/// different accounts) may coexist in one process.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable lowercase backend name, used for logging and for keying
    /// writer output.
    fn name(&self) -> &'static str;

    /// Upstream provider source address, for writer annotation.
    fn source(&self) -> &'static str;

    /// Version of the upstream provider schema this backend tracks.
    fn version(&self) -> &'static str;

    /// Canonical strings for every supported resource type, in registry
    /// order.
    fn resource_types(&self) -> Vec<&'static str>;

    /// Capability probe: does this backend support `resource_type` at all.
    fn has_resource_type(&self, resource_type: &str) -> bool;

    /// Enumerate resources of one type. The only entry point through which
    /// resources are ever fetched; no caller reaches enumerators directly.
    ///
    /// An empty result is a valid outcome meaning the account has zero
    /// matching resources, and is distinct from any error.
    async fn resources(
        &self,
        resource_type: &str,
        filter: &Filter,
    ) -> Result<Vec<Resource>, DiscoveryError>;

    /// Backend-specific post-processing of a discovered value before it
    /// reaches the writer (for example stripping server-assigned,
    /// non-reproducible attributes). Identity by default; overrides must be
    /// idempotent.
    fn fix_resource(&self, resource_type: &str, value: Value) -> Result<Value, DiscoveryError> {
        let _ = resource_type;
        Ok(value)
    }

    /// Region (or equivalent scope descriptor) this instance was built for.
    fn region(&self) -> &str;

    /// Non-sensitive construction-time configuration, for writer annotation
    /// and diagnostics.
    fn configuration(&self) -> &BTreeMap<String, String>;

    /// Attribute name under which this backend exposes tags on a
    /// [`Resource`]; lets tag-based filtering stay backend-agnostic.
    fn tag_key(&self) -> &'static str {
        "tags"
    }
}
