//! Resource reader dispatcher
//!
//! Routes a requested resource type to the enumerator bound to it. The
//! dispatcher's whole job is type-safe routing plus uniform error wrapping:
//! it never retries, never filters, never caches. Those concerns belong to
//! the enumerators and the filter/cache collaborators they call.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::error::DiscoveryError;
use crate::filter::Filter;
use crate::registry::{Registry, ResourceKind};
use crate::resource::Resource;

/// Boxed future returned by an enumerator.
pub type ReaderFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Resource>, DiscoveryError>> + Send + 'a>>;

/// An enumerator bound to one resource type.
///
/// Plain function pointer rather than a boxed closure: a reader table is a
/// static association built once at backend construction, not a runtime
/// plugin surface.
pub type ResourceReader<P> = for<'a> fn(&'a P, &'a Filter) -> ReaderFuture<'a>;

/// Reader-binding table for one backend.
///
/// Holds no mutable state after construction; dispatching different types
/// concurrently against one backend context is safe.
pub struct Dispatcher<K: ResourceKind, P> {
    registry: Registry<K>,
    readers: HashMap<K, ResourceReader<P>>,
}

impl<K: ResourceKind, P> Dispatcher<K, P> {
    pub fn new(registry: Registry<K>) -> Self {
        Self {
            registry,
            readers: HashMap::new(),
        }
    }

    /// Bind an enumerator to a resource type. Every registered type must end
    /// up with exactly one binding; binding a kind the registry does not
    /// list is a table typo, caught here like the registry catches
    /// duplicates.
    pub fn bind(mut self, kind: K, reader: ResourceReader<P>) -> Self {
        debug_assert!(
            self.registry.contains(kind.as_str()),
            "binding reader for {:?}, which is not in the registry",
            kind.as_str()
        );
        self.readers.insert(kind, reader);
        self
    }

    pub fn registry(&self) -> &Registry<K> {
        &self.registry
    }

    /// Route one discovery request.
    ///
    /// Resolves the type string first, so an unrecognized type fails before
    /// any backend state is touched. A registered type with no binding is a
    /// fatal [`MissingReaderBinding`], never an empty result: "misconfigured
    /// table" and "backend has zero such resources" are different outcomes.
    ///
    /// [`MissingReaderBinding`]: DiscoveryError::MissingReaderBinding
    pub async fn dispatch(
        &self,
        resource_type: &str,
        backend: &P,
        filter: &Filter,
    ) -> Result<Vec<Resource>, DiscoveryError> {
        let kind = self.registry.resolve(resource_type)?;

        let reader = self
            .readers
            .get(&kind)
            .ok_or(DiscoveryError::MissingReaderBinding {
                resource_type: kind.as_str(),
            })?;

        debug!(resource_type, "dispatching resource reader");

        match reader(backend, filter).await {
            Ok(resources) => {
                debug!(
                    resource_type,
                    count = resources.len(),
                    "resource reader finished"
                );
                Ok(resources)
            }
            Err(err) => Err(err.with_resource_type(kind.as_str())),
        }
    }
}
