//! Huawei Cloud backend
//!
//! Implements the [`Provider`] contract over the region/project-scoped
//! Huawei Cloud REST APIs: ECS servers, VPCs and subnets, elastic IPs, EVS
//! volumes, NAT gateways, and OBS buckets.

mod api;
mod readers;
pub mod resource_types;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cache::MemoryCache;
use crate::dispatch::Dispatcher;
use crate::error::DiscoveryError;
use crate::filter::Filter;
use crate::provider::Provider;
use crate::registry::ResourceKind;
use crate::resource::Resource;

use api::HuaweiApiClient;
pub use resource_types::HuaweiResourceType;

/// Version of the upstream Terraform provider schema this backend tracks.
const VERSION: &str = "1.78.0";

/// Server-assigned compute attributes that change between reads and would
/// make generated configuration non-reproducible.
const VOLATILE_COMPUTE_ATTRIBUTES: &[&str] = &[
    "created",
    "updated",
    "progress",
    "hostId",
    "host_status",
    "OS-EXT-SRV-ATTR:host",
    "OS-SRV-USG:launched_at",
    "OS-SRV-USG:terminated_at",
];

/// Construction-time configuration for one backend instance.
///
/// Named typed fields rather than a loose option map; validation happens in
/// [`HuaweiCloudProvider::new`], so a misconfigured backend fails before any
/// discovery call is possible.
#[derive(Debug, Clone)]
pub struct HuaweiCloudConfig {
    pub region: String,
    pub project_id: String,
    pub access_key: String,
    pub secret_key: String,
    pub security_token: Option<String>,
    /// Route every service at one base URL instead of the per-service
    /// regional endpoints. Used by tests.
    pub endpoint_override: Option<String>,
}

impl HuaweiCloudConfig {
    pub fn new(
        region: impl Into<String>,
        project_id: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            project_id: project_id.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            security_token: None,
            endpoint_override: None,
        }
    }

    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = Some(token.into());
        self
    }

    pub fn with_endpoint(mut self, base_url: impl Into<String>) -> Self {
        self.endpoint_override = Some(base_url.into());
        self
    }

    fn validate(&self) -> Result<(), DiscoveryError> {
        for (name, value) in [
            ("region", &self.region),
            ("project-id", &self.project_id),
            ("access-key", &self.access_key),
            ("secret-key", &self.secret_key),
        ] {
            if value.is_empty() {
                return Err(DiscoveryError::Configuration(format!(
                    "required field {name:?} is empty"
                )));
            }
        }
        Ok(())
    }
}

/// Huawei Cloud implementation of the backend facade.
///
/// An explicit value: construct one per region/project scope and share it
/// freely; all state is immutable after construction.
pub struct HuaweiCloudProvider {
    config: HuaweiCloudConfig,
    configuration: BTreeMap<String, String>,
    client: HuaweiApiClient,
    dispatcher: Dispatcher<HuaweiResourceType, HuaweiCloudProvider>,
    cache: MemoryCache,
}

impl HuaweiCloudProvider {
    pub fn new(config: HuaweiCloudConfig) -> Result<Self, DiscoveryError> {
        Self::with_cancellation(config, CancellationToken::new())
    }

    /// Construct with an externally owned cancellation token. The token is
    /// observed by every enumerator; cancelling it makes in-flight and
    /// subsequent discovery calls return [`DiscoveryError::Cancelled`].
    pub fn with_cancellation(
        config: HuaweiCloudConfig,
        cancel: CancellationToken,
    ) -> Result<Self, DiscoveryError> {
        config.validate()?;

        info!(region = %config.region, project_id = %config.project_id, "configuring huaweicloud backend");

        let client = HuaweiApiClient::new(&config, cancel)?;

        // Introspection map deliberately omits credential fields.
        let mut configuration = BTreeMap::new();
        configuration.insert("region".to_string(), config.region.clone());
        configuration.insert("project_id".to_string(), config.project_id.clone());

        Ok(Self {
            config,
            configuration,
            client,
            dispatcher: readers::dispatcher(),
            cache: MemoryCache::new(),
        })
    }

    pub(super) fn client(&self) -> &HuaweiApiClient {
        &self.client
    }

    pub(super) fn cache(&self) -> &MemoryCache {
        &self.cache
    }

    pub(super) fn cache_key(&self, resource_type: &str) -> String {
        format!(
            "{resource_type}:{}:{}",
            self.config.region, self.config.project_id
        )
    }
}

#[async_trait]
impl Provider for HuaweiCloudProvider {
    fn name(&self) -> &'static str {
        "huaweicloud"
    }

    fn source(&self) -> &'static str {
        "hashicorp/huaweicloud"
    }

    fn version(&self) -> &'static str {
        VERSION
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

    fn fix_resource(&self, resource_type: &str, mut value: Value) -> Result<Value, DiscoveryError> {
        if resource_type == HuaweiResourceType::ComputeInstance.as_str() {
            if let Some(attrs) = value.as_object_mut() {
                for key in VOLATILE_COMPUTE_ATTRIBUTES {
                    attrs.remove(*key);
                }
            }
        }
        Ok(value)
    }

    fn region(&self) -> &str {
        &self.config.region
    }

    fn configuration(&self) -> &BTreeMap<String, String> {
        &self.configuration
    }

    fn tag_key(&self) -> &'static str {
        "tags"
    }
}
