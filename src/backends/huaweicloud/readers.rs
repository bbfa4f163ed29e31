//! Per-type enumerators and their binding table
//!
//! Each reader pages through one listing endpoint, maps the raw items into
//! [`Resource`] records, and applies the session filter per candidate. The
//! unfiltered listing is cached per `<type>:<region>:<project>` so repeated
//! passes within one session (different filters included) never repeat the
//! backend calls.

use serde_json::Value;
use tracing::debug;

use crate::cache::Cache;
use crate::dispatch::{Dispatcher, ReaderFuture};
use crate::filter::Filter;
use crate::registry::ResourceKind;
use crate::resource::Resource;
use crate::{DiscoveryError, Provider};

use super::api::Pagination;
use super::resource_types::{self, HuaweiResourceType};
use super::HuaweiCloudProvider;

/// Reader-binding table, built once per provider instance. Every kind in
/// [`resource_types::RESOURCE_TYPES`] must be bound here.
pub(super) fn dispatcher() -> Dispatcher<HuaweiResourceType, HuaweiCloudProvider> {
    Dispatcher::new(resource_types::registry())
        .bind(HuaweiResourceType::ComputeInstance, compute_instances)
        .bind(HuaweiResourceType::Vpc, vpcs)
        .bind(HuaweiResourceType::VpcSubnet, vpc_subnets)
        .bind(HuaweiResourceType::Eip, eips)
        .bind(HuaweiResourceType::EvsVolume, evs_volumes)
        .bind(HuaweiResourceType::NatGateway, nat_gateways)
        .bind(HuaweiResourceType::ObsBucket, obs_buckets)
}

fn compute_instances<'a>(p: &'a HuaweiCloudProvider, f: &'a Filter) -> ReaderFuture<'a> {
    Box::pin(list_service(
        p,
        f,
        HuaweiResourceType::ComputeInstance,
        ServiceListing {
            service: "ecs",
            path: "/v1/{project_id}/cloudservers/detail",
            items_key: "servers",
            pagination: Pagination::PageOffset,
        },
    ))
}

fn vpcs<'a>(p: &'a HuaweiCloudProvider, f: &'a Filter) -> ReaderFuture<'a> {
    Box::pin(list_service(
        p,
        f,
        HuaweiResourceType::Vpc,
        ServiceListing {
            service: "vpc",
            path: "/v1/{project_id}/vpcs",
            items_key: "vpcs",
            pagination: Pagination::Marker,
        },
    ))
}

fn vpc_subnets<'a>(p: &'a HuaweiCloudProvider, f: &'a Filter) -> ReaderFuture<'a> {
    Box::pin(list_service(
        p,
        f,
        HuaweiResourceType::VpcSubnet,
        ServiceListing {
            service: "vpc",
            path: "/v1/{project_id}/subnets",
            items_key: "subnets",
            pagination: Pagination::Marker,
        },
    ))
}

fn eips<'a>(p: &'a HuaweiCloudProvider, f: &'a Filter) -> ReaderFuture<'a> {
    Box::pin(list_service(
        p,
        f,
        HuaweiResourceType::Eip,
        ServiceListing {
            service: "vpc",
            path: "/v1/{project_id}/publicips",
            items_key: "publicips",
            pagination: Pagination::Marker,
        },
    ))
}

fn evs_volumes<'a>(p: &'a HuaweiCloudProvider, f: &'a Filter) -> ReaderFuture<'a> {
    Box::pin(list_service(
        p,
        f,
        HuaweiResourceType::EvsVolume,
        ServiceListing {
            service: "evs",
            path: "/v2/{project_id}/cloudvolumes/detail",
            items_key: "volumes",
            pagination: Pagination::ItemOffset,
        },
    ))
}

fn nat_gateways<'a>(p: &'a HuaweiCloudProvider, f: &'a Filter) -> ReaderFuture<'a> {
    Box::pin(list_service(
        p,
        f,
        HuaweiResourceType::NatGateway,
        ServiceListing {
            service: "nat",
            path: "/v2/{project_id}/nat_gateways",
            items_key: "nat_gateways",
            pagination: Pagination::Marker,
        },
    ))
}

/// One JSON listing endpoint.
struct ServiceListing {
    service: &'static str,
    /// Path template; `{project_id}` is substituted at call time.
    path: &'static str,
    items_key: &'static str,
    pagination: Pagination,
}

async fn list_service(
    provider: &HuaweiCloudProvider,
    filter: &Filter,
    kind: HuaweiResourceType,
    listing: ServiceListing,
) -> Result<Vec<Resource>, DiscoveryError> {
    let resource_type = kind.as_str();
    let cache_key = provider.cache_key(resource_type);

    let all = match provider.cache().get(&cache_key) {
        Some(cached) => {
            debug!(resource_type, "serving listing from cache");
            cached
        }
        None => {
            let path = listing
                .path
                .replace("{project_id}", provider.client().project_id());
            let raw = provider
                .client()
                .list_all(listing.service, &path, listing.items_key, listing.pagination)
                .await?;

            let resources: Vec<Resource> = raw
                .into_iter()
                .map(|item| into_resource(resource_type, item))
                .collect();
            provider.cache().set(&cache_key, resources.clone());
            resources
        }
    };

    Ok(apply_filter(all, filter, provider.tag_key()))
}

/// OBS is the odd one out: an S3-compatible endpoint answering the bucket
/// listing as XML rather than JSON.
fn obs_buckets<'a>(p: &'a HuaweiCloudProvider, f: &'a Filter) -> ReaderFuture<'a> {
    Box::pin(async move {
        let kind = HuaweiResourceType::ObsBucket;
        let resource_type = kind.as_str();
        let cache_key = p.cache_key(resource_type);

        let all = match p.cache().get(&cache_key) {
            Some(cached) => cached,
            None => {
                let body = p.client().get_text("obs", "/", &[]).await?;
                let resources: Vec<Resource> = parse_bucket_names(&body)
                    .into_iter()
                    .map(|name| {
                        let attributes = serde_json::json!({ "id": name, "bucket": name });
                        Resource::new(resource_type, name.clone(), attributes).with_name(name)
                    })
                    .collect();
                p.cache().set(&cache_key, resources.clone());
                resources
            }
        };

        Ok(apply_filter(all, f, p.tag_key()))
    })
}

fn into_resource(resource_type: &str, item: Value) -> Resource {
    let id = item
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let name = item.get("name").and_then(Value::as_str).map(str::to_string);

    let mut resource = Resource::new(resource_type, id, item);
    if let Some(name) = name {
        resource = resource.with_name(name);
    }
    resource
}

fn apply_filter(all: Vec<Resource>, filter: &Filter, tag_key: &str) -> Vec<Resource> {
    all.into_iter()
        .filter(|r| filter.keep(&r.resource_type, &r.attributes, tag_key))
        .collect()
}

/// Pull `<Name>` values out of an S3-style `ListAllMyBucketsResult`
/// document. The payload is flat and fixed-shape, so a scan is enough; no
/// XML dependency for one endpoint.
fn parse_bucket_names(xml: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<Name>") {
        let after = &rest[start + "<Name>".len()..];
        let Some(end) = after.find("</Name>") else {
            break;
        };
        let name = after[..end].trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
        rest = &after[end..];
    }
    names
}
