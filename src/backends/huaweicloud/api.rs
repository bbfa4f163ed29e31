//! Huawei Cloud REST client
//!
//! Thin HTTP layer the enumerators call. Endpoints are region- and
//! project-scoped (`https://<service>.<region>.myhuaweicloud.com`); tests
//! point every service at one mock server through the endpoint override.
//!
//! Credential material travels as opaque headers. Full AK/SK request
//! signing is out of scope here (it belongs to the credential layer), which
//! keeps this client a plain JSON GET machine.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::DiscoveryError;

use super::HuaweiCloudConfig;

/// Page size for list calls. Every listing endpoint used here accepts
/// `limit` up to at least 200.
const PAGE_LIMIT: usize = 100;

/// How a listing endpoint pages its results.
#[derive(Debug, Clone, Copy)]
pub enum Pagination {
    /// `marker=<id of last item>` (VPC, subnet, EIP, NAT).
    Marker,
    /// `offset=<page number>`, starting at 1 (ECS v1).
    PageOffset,
    /// `offset=<item count>` (EVS v2).
    ItemOffset,
    /// Single request, no paging parameters (OBS bucket listing).
    None,
}

pub struct HuaweiApiClient {
    http: Client,
    region: String,
    project_id: String,
    security_token: Option<String>,
    endpoint_override: Option<String>,
    cancel: CancellationToken,
}

impl HuaweiApiClient {
    pub fn new(
        config: &HuaweiCloudConfig,
        cancel: CancellationToken,
    ) -> Result<Self, DiscoveryError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DiscoveryError::Configuration(format!("http client: {e}")))?;

        Ok(Self {
            http,
            region: config.region.clone(),
            project_id: config.project_id.clone(),
            security_token: config.security_token.clone(),
            endpoint_override: config.endpoint_override.clone(),
            cancel,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn service_url(&self, service: &str, path: &str) -> String {
        match &self.endpoint_override {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => format!("https://{service}.{}.myhuaweicloud.com{path}", self.region),
        }
    }

    /// One GET returning the raw response body as text. Races the request
    /// against the context's cancellation token; callers after cancellation
    /// get [`DiscoveryError::Cancelled`] promptly instead of a completed
    /// backend call.
    pub async fn get_text(
        &self,
        service: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String, DiscoveryError> {
        if self.cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled {
                resource_type: String::new(),
            });
        }

        let url = self.service_url(service, path);
        trace!(%url, "huaweicloud GET");

        let mut request = self.http.get(&url).query(query);
        request = request.header("X-Project-Id", &self.project_id);
        if let Some(token) = &self.security_token {
            request = request.header("X-Security-Token", token);
        }

        let response = tokio::select! {
            _ = self.cancel.cancelled() => {
                return Err(DiscoveryError::Cancelled { resource_type: String::new() });
            }
            result = request.send() => result?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::backend_msg(format!(
                "GET {url} returned {status}"
            )));
        }

        Ok(response.text().await?)
    }

    /// One GET parsed as JSON.
    pub async fn get_json(
        &self,
        service: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, DiscoveryError> {
        let body = self.get_text(service, path, query).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Page through a JSON listing endpoint, collecting the array found
    /// under `items_key` across pages.
    pub async fn list_all(
        &self,
        service: &str,
        path: &str,
        items_key: &str,
        pagination: Pagination,
    ) -> Result<Vec<Value>, DiscoveryError> {
        let mut items: Vec<Value> = Vec::new();
        let mut marker: Option<String> = None;
        let mut page = 1usize;

        loop {
            let mut query: Vec<(&str, String)> = Vec::new();
            match pagination {
                Pagination::Marker => {
                    query.push(("limit", PAGE_LIMIT.to_string()));
                    if let Some(m) = &marker {
                        query.push(("marker", m.clone()));
                    }
                }
                Pagination::PageOffset => {
                    query.push(("limit", PAGE_LIMIT.to_string()));
                    query.push(("offset", page.to_string()));
                }
                Pagination::ItemOffset => {
                    query.push(("limit", PAGE_LIMIT.to_string()));
                    query.push(("offset", items.len().to_string()));
                }
                Pagination::None => {}
            }

            let response = self.get_json(service, path, &query).await?;
            let batch = response
                .get(items_key)
                .and_then(Value::as_array)
                .cloned()
                .ok_or_else(|| {
                    DiscoveryError::backend_msg(format!(
                        "response from {path} missing {items_key:?} array"
                    ))
                })?;

            let len = batch.len();
            items.extend(batch);
            debug!(path, page, fetched = len, total = items.len(), "listed page");

            if matches!(pagination, Pagination::None) || len < PAGE_LIMIT {
                break;
            }

            // A full marker page must carry a new marker id; a page without
            // one (or repeating the previous marker) would request the same
            // page forever, so treat it as a malformed response.
            if matches!(pagination, Pagination::Marker) {
                let next = items
                    .last()
                    .and_then(|item| item.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                match next {
                    Some(next) if marker.as_deref() != Some(next.as_str()) => {
                        marker = Some(next);
                    }
                    _ => {
                        return Err(DiscoveryError::backend_msg(format!(
                            "full page from {path} carries no advancing marker id"
                        )));
                    }
                }
            }
            page += 1;
        }

        Ok(items)
    }
}
