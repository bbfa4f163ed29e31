//! Integration tests for the Huawei Cloud backend using wiremock

use cloudharvest::backends::huaweicloud::{HuaweiCloudConfig, HuaweiCloudProvider};
use cloudharvest::{DiscoveryError, Filter, Provider};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> HuaweiCloudProvider {
    let config = HuaweiCloudConfig::new("cn-north-1", "p1", "ak", "sk")
        .with_endpoint(server.uri());
    HuaweiCloudProvider::new(config).expect("provider construction should succeed")
}

fn servers_page(range: std::ops::Range<usize>) -> Value {
    let servers: Vec<Value> = range
        .map(|i| {
            json!({
                "id": format!("i-{i}"),
                "name": format!("web-{i}"),
                "status": "ACTIVE",
                "tags": ["env=prod"]
            })
        })
        .collect();
    json!({ "count": servers.len(), "servers": servers })
}

#[tokio::test]
async fn test_compute_instances_paginate_until_short_page() {
    let server = MockServer::start().await;

    // full first page (100 items), short second page
    Mock::given(method("GET"))
        .and(path("/v1/p1/cloudservers/detail"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(servers_page(0..100)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/p1/cloudservers/detail"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(servers_page(100..103)))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let resources = provider
        .resources("huaweicloud_compute_instance", &Filter::default())
        .await
        .unwrap();

    assert_eq!(resources.len(), 103);
    // enumerator order preserved across pages
    assert_eq!(resources[0].id, "i-0");
    assert_eq!(resources[102].id, "i-102");
    assert_eq!(resources[0].name.as_deref(), Some("web-0"));
}

#[tokio::test]
async fn test_vpc_listing_maps_attributes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/p1/vpcs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [
                {"id": "vpc-1", "name": "prod", "cidr": "10.0.0.0/16"},
                {"id": "vpc-2", "name": "dev", "cidr": "10.1.0.0/16"}
            ]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let resources = provider
        .resources("huaweicloud_vpc", &Filter::default())
        .await
        .unwrap();

    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0].resource_type, "huaweicloud_vpc");
    assert_eq!(resources[0].attributes["cidr"], "10.0.0.0/16");
}

#[tokio::test]
async fn test_empty_listing_is_successful_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/p1/subnets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"subnets": []})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let resources = provider
        .resources("huaweicloud_vpc_subnet", &Filter::default())
        .await
        .unwrap();
    assert!(resources.is_empty());
}

#[tokio::test]
async fn test_tag_filter_applied_per_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/p1/cloudservers/detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "servers": [
                {"id": "i-1", "name": "web-1", "tags": ["env=prod"]},
                {"id": "i-2", "name": "scratch", "tags": ["env=dev"]}
            ]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let filter = Filter::new()
        .with_tag_selectors(&["env:prod".to_string()])
        .unwrap();
    let resources = provider
        .resources("huaweicloud_compute_instance", &filter)
        .await
        .unwrap();

    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].id, "i-1");
}

#[tokio::test]
async fn test_cache_prevents_duplicate_backend_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/p1/publicips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "publicips": [{"id": "eip-1", "public_ip_address": "1.2.3.4"}]
        })))
        .expect(1) // second discovery must be served from cache
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let first = provider
        .resources("huaweicloud_vpc_eip", &Filter::default())
        .await
        .unwrap();
    let second = provider
        .resources("huaweicloud_vpc_eip", &Filter::default())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[tokio::test]
async fn test_cached_listing_reevaluated_under_new_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/p1/vpcs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [
                {"id": "vpc-1", "name": "prod"},
                {"id": "vpc-2", "name": "dev"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let all = provider
        .resources("huaweicloud_vpc", &Filter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    // narrower filter on the second pass, still one backend call
    let targeted = Filter::new().with_targets(vec!["vpc-2".to_string()]);
    let filtered = provider
        .resources("huaweicloud_vpc", &targeted)
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, "vpc-2");
}

#[tokio::test]
async fn test_full_page_without_marker_id_fails_instead_of_looping() {
    let server = MockServer::start().await;

    // a full page whose items carry no id can never advance the marker
    let vpcs: Vec<Value> = (0..100)
        .map(|i| json!({"name": format!("vpc-{i}"), "cidr": "10.0.0.0/16"}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/v1/p1/vpcs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vpcs": vpcs})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let result = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        provider.resources("huaweicloud_vpc", &Filter::default()),
    )
    .await
    .expect("listing must terminate, not repeat the same request");

    match result {
        Err(DiscoveryError::BackendCall {
            resource_type,
            source,
        }) => {
            assert_eq!(resource_type, "huaweicloud_vpc");
            assert!(source.to_string().contains("marker"));
        }
        other => panic!("expected BackendCall, got {other:?}"),
    }
    // exactly one request: the loop must not retry the identical page
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_marker_pagination_advances_through_full_pages() {
    let server = MockServer::start().await;

    let first: Vec<Value> = (0..100)
        .map(|i| json!({"id": format!("eip-{i}"), "public_ip_address": "1.2.3.4"}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/v1/p1/publicips"))
        .and(query_param("marker", "eip-99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "publicips": [{"id": "eip-100", "public_ip_address": "1.2.3.5"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/p1/publicips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"publicips": first})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let resources = provider
        .resources("huaweicloud_vpc_eip", &Filter::default())
        .await
        .unwrap();

    assert_eq!(resources.len(), 101);
    assert_eq!(resources[100].id, "eip-100");
}

#[tokio::test]
async fn test_authorization_failure_wrapped_with_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/p1/nat_gateways"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    match provider
        .resources("huaweicloud_nat_gateway", &Filter::default())
        .await
    {
        Err(DiscoveryError::BackendCall {
            resource_type,
            source,
        }) => {
            assert_eq!(resource_type, "huaweicloud_nat_gateway");
            assert!(source.to_string().contains("401"));
        }
        other => panic!("expected BackendCall, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_response_is_backend_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/p1/cloudvolumes/detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": []})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    match provider
        .resources("huaweicloud_evs_volume", &Filter::default())
        .await
    {
        Err(DiscoveryError::BackendCall { source, .. }) => {
            assert!(source.to_string().contains("volumes"));
        }
        other => panic!("expected BackendCall, got {other:?}"),
    }
}

#[tokio::test]
async fn test_obs_bucket_listing_parses_xml() {
    let server = MockServer::start().await;

    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult>
  <Buckets>
    <Bucket><Name>logs</Name></Bucket>
    <Bucket><Name>backups</Name></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let resources = provider
        .resources("huaweicloud_obs_bucket", &Filter::default())
        .await
        .unwrap();

    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0].id, "logs");
    assert_eq!(resources[1].name.as_deref(), Some("backups"));
}

#[tokio::test]
async fn test_cancellation_short_circuits_discovery() {
    let server = MockServer::start().await;
    // no mocks mounted: a real request would 404, but none may be sent

    let token = CancellationToken::new();
    let config = HuaweiCloudConfig::new("cn-north-1", "p1", "ak", "sk")
        .with_endpoint(server.uri());
    let provider = HuaweiCloudProvider::with_cancellation(config, token.clone()).unwrap();

    token.cancel();

    match provider
        .resources("huaweicloud_vpc", &Filter::default())
        .await
    {
        Err(DiscoveryError::Cancelled { resource_type }) => {
            assert_eq!(resource_type, "huaweicloud_vpc");
        }
        other => panic!("expected Cancelled, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unsupported_type_never_reaches_backend() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    match provider
        .resources("huaweicloud_unknown_widget", &Filter::default())
        .await
    {
        Err(DiscoveryError::UnsupportedResourceType { resource_type }) => {
            assert_eq!(resource_type, "huaweicloud_unknown_widget");
        }
        other => panic!("expected UnsupportedResourceType, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_discovery_against_one_provider() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/p1/vpcs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [{"id": "vpc-1", "name": "prod"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/p1/subnets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subnets": [{"id": "subnet-1", "name": "prod-a"}, {"id": "subnet-2", "name": "prod-b"}]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let no_filter = Filter::default();

    let (vpcs, subnets) = tokio::join!(
        provider.resources("huaweicloud_vpc", &no_filter),
        provider.resources("huaweicloud_vpc_subnet", &no_filter),
    );

    let vpcs = vpcs.unwrap();
    let subnets = subnets.unwrap();
    assert_eq!(vpcs.len(), 1);
    assert!(vpcs.iter().all(|r| r.resource_type == "huaweicloud_vpc"));
    assert_eq!(subnets.len(), 2);
    assert!(subnets.iter().all(|r| r.resource_type == "huaweicloud_vpc_subnet"));
}
