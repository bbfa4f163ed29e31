//! cloudharvest library
//!
//! A pluggable cloud-resource discovery engine: it enumerates live resources
//! in a cloud account and normalizes them into a vendor-neutral
//! representation for downstream infrastructure-as-code tooling.
//!
//! # Architecture
//!
//! - [`registry`] - closed, declaration-ordered resource-type vocabulary per backend
//! - [`dispatch`] - routes a requested type to its bound enumerator
//! - [`provider`] - the facade contract every backend implements
//! - [`filter`] / [`cache`] - keep/drop policy and per-session memoization,
//!   consumed by enumerators
//! - [`backends`] - concrete backends (Huawei Cloud, plus a mock for tests)
//!
//! Adding a cloud means adding one module under [`backends`]; the shared
//! pipeline is never touched.

pub mod backends;
pub mod cache;
pub mod dispatch;
pub mod filter;
pub mod provider;
pub mod registry;
pub mod resource;

mod error;

pub use error::DiscoveryError;
pub use filter::{Filter, Tag};
pub use provider::Provider;
pub use resource::Resource;
