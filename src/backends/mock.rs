//! Mock backend for testing
//!
//! A configurable backend with canned results, error injection, and
//! invocation recording, used to test the engine core without any cloud.
//!
//! # Example
//! ```
//! use cloudharvest::backends::mock::MockBackend;
//! use cloudharvest::Resource;
//! use serde_json::json;
//!
//! let mock = MockBackend::new()
//!     .with_resources("x_compute", vec![
//!         Resource::new("x_compute", "i-1", json!({"id": "i-1"})),
//!     ]);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::cache::Cache;
use crate::dispatch::{Dispatcher, ReaderFuture};
use crate::error::DiscoveryError;
use crate::filter::Filter;
use crate::provider::Provider;
use crate::registry::{Registry, ResourceKind};
use crate::resource::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockResourceType {
    Compute,
    Network,
    /// Registered in the extended registry but never bound to a reader;
    /// exercises the missing-binding failure path.
    Orphan,
}

impl ResourceKind for MockResourceType {
    fn as_str(&self) -> &'static str {
        match self {
            MockResourceType::Compute => "x_compute",
            MockResourceType::Network => "x_network",
            MockResourceType::Orphan => "x_orphan",
        }
    }
}

const KINDS: &[MockResourceType] = &[MockResourceType::Compute, MockResourceType::Network];

const KINDS_WITH_ORPHAN: &[MockResourceType] = &[
    MockResourceType::Compute,
    MockResourceType::Network,
    MockResourceType::Orphan,
];

/// Mock backend implementing the full facade contract.
pub struct MockBackend {
    dispatcher: Dispatcher<MockResourceType, MockBackend>,
    results: HashMap<String, Vec<Resource>>,
    errors: HashMap<String, String>,
    cancelled: HashSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
    region: String,
    configuration: BTreeMap<String, String>,
    cache: Option<Box<dyn Cache>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_kinds(KINDS)
    }

    /// Variant whose registry also contains `x_orphan`, a kind with no
    /// reader bound.
    pub fn with_orphan_kind() -> Self {
        Self::with_kinds(KINDS_WITH_ORPHAN)
    }

    fn with_kinds(kinds: &'static [MockResourceType]) -> Self {
        let dispatcher = Dispatcher::new(Registry::new(kinds))
            .bind(MockResourceType::Compute, compute_reader)
            .bind(MockResourceType::Network, network_reader);

        let mut configuration = BTreeMap::new();
        configuration.insert("region".to_string(), "test-1".to_string());

        Self {
            dispatcher,
            results: HashMap::new(),
            errors: HashMap::new(),
            cancelled: HashSet::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            region: "test-1".to_string(),
            configuration,
            cache: None,
        }
    }

    /// Canned resources the reader for `resource_type` will return (after
    /// filtering).
    pub fn with_resources(mut self, resource_type: &str, resources: Vec<Resource>) -> Self {
        self.results.insert(resource_type.to_string(), resources);
        self
    }

    /// Configure the reader for `resource_type` to fail.
    pub fn with_error(mut self, resource_type: &str, message: &str) -> Self {
        self.errors
            .insert(resource_type.to_string(), message.to_string());
        self
    }

    /// Configure the reader for `resource_type` to report cancellation.
    pub fn with_cancelled(mut self, resource_type: &str) -> Self {
        self.cancelled.insert(resource_type.to_string());
        self
    }

    /// Back the readers with a cache; each successful read is memoized and
    /// served from the cache on repeat calls.
    pub fn with_cache(mut self, cache: impl Cache + 'static) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    /// Resource-type strings of every reader invocation, in call order.
    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    fn read(&self, resource_type: &'static str, filter: &Filter) -> Result<Vec<Resource>, DiscoveryError> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .push(resource_type.to_string());

        if self.cancelled.contains(resource_type) {
            return Err(DiscoveryError::Cancelled {
                resource_type: String::new(),
            });
        }
        if let Some(message) = self.errors.get(resource_type) {
            return Err(DiscoveryError::backend_msg(message.clone()));
        }

        let all = match &self.cache {
            Some(cache) => match cache.get(resource_type) {
                Some(cached) => cached,
                None => {
                    let fresh = self.results.get(resource_type).cloned().unwrap_or_default();
                    cache.set(resource_type, fresh.clone());
                    fresh
                }
            },
            None => self.results.get(resource_type).cloned().unwrap_or_default(),
        };

        Ok(all
            .into_iter()
            .filter(|r| filter.keep(&r.resource_type, &r.attributes, self.tag_key()))
            .collect())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_reader<'a>(backend: &'a MockBackend, filter: &'a Filter) -> ReaderFuture<'a> {
    Box::pin(async move { backend.read("x_compute", filter) })
}

fn network_reader<'a>(backend: &'a MockBackend, filter: &'a Filter) -> ReaderFuture<'a> {
    Box::pin(async move { backend.read("x_network", filter) })
}

#[async_trait]
impl Provider for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn source(&self) -> &'static str {
        "cloudharvest/mock"
    }

    fn version(&self) -> &'static str {
        "0.0.0"
    }

    fn resource_types(&self) -> Vec<&'static str> {
        self.dispatcher.registry().list()
    }

    fn has_resource_type(&self, resource_type: &str) -> bool {
        self.dispatcher.registry().contains(resource_type)
    }

    async fn resources(
        &self,
        resource_type: &str,
        filter: &Filter,
    ) -> Result<Vec<Resource>, DiscoveryError> {
        if resource_type.is_empty() {
            return Err(DiscoveryError::UnsupportedResourceType {
                resource_type: String::new(),
            });
        }
        self.dispatcher.dispatch(resource_type, self, filter).await
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn configuration(&self) -> &BTreeMap<String, String> {
        &self.configuration
    }
}
