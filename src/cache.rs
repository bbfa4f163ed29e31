//! Enumeration cache
//!
//! Memoizes the results of expensive listing calls within one discovery
//! session, keyed by an enumerator-chosen string (typically
//! `<resource_type>:<region>:<project>`). The engine prescribes no eviction
//! or TTL; correct use just prevents duplicate backend calls when the same
//! listing is needed more than once (for example while resolving
//! dependencies between types).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::resource::Resource;

/// Key-value store consumed by enumerators. Implementations must be safe
/// for concurrent use.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<Resource>>;
    fn set(&self, key: &str, resources: Vec<Resource>);
}

/// In-memory cache; cloning yields a handle to the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<RwLock<HashMap<String, Vec<Resource>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<Resource>> {
        self.inner
            .read()
            .expect("cache lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, resources: Vec<Resource>) {
        self.inner
            .write()
            .expect("cache lock poisoned")
            .insert(key.to_string(), resources);
    }
}
