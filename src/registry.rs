//! Resource type registry
//!
//! A backend's resource vocabulary is a closed, declaration-ordered set of
//! type strings, fixed at compile time. Keeping the set closed means a typo
//! in a requested type is an explicit [`UnsupportedResourceType`] error
//! instead of a silently empty result.
//!
//! [`UnsupportedResourceType`]: crate::DiscoveryError::UnsupportedResourceType

use crate::error::DiscoveryError;

/// A backend's typed resource-type token.
///
/// Implementors are plain fieldless enums; `as_str` returns the one
/// canonical lowercase vendor-prefixed string for the token. The mapping
/// must be injective; [`Registry::new`] checks it.
pub trait ResourceKind: Copy + Eq + std::hash::Hash + Send + Sync + 'static {
    fn as_str(&self) -> &'static str;
}

/// Ordered, closed set of resource types for one backend.
///
/// Iteration order is declaration order and is the order presented to end
/// users; it is stable across runs.
#[derive(Debug, Clone, Copy)]
pub struct Registry<K: ResourceKind> {
    kinds: &'static [K],
}

impl<K: ResourceKind> Registry<K> {
    /// Build a registry over a static table of kinds.
    ///
    /// # Panics
    ///
    /// Panics if two entries share a canonical string. Duplicate entries are
    /// a programming error in the backend's type table, caught at
    /// construction rather than surfacing as ambiguous lookups.
    pub fn new(kinds: &'static [K]) -> Self {
        for (i, kind) in kinds.iter().enumerate() {
            for other in &kinds[i + 1..] {
                assert!(
                    kind.as_str() != other.as_str(),
                    "duplicate resource type {:?} in registry",
                    kind.as_str()
                );
            }
        }
        Self { kinds }
    }

    /// Canonical strings for every registered kind, in declaration order.
    pub fn list(&self) -> Vec<&'static str> {
        self.kinds.iter().map(|k| k.as_str()).collect()
    }

    /// The typed kinds themselves, in declaration order.
    pub fn kinds(&self) -> &'static [K] {
        self.kinds
    }

    /// Resolve a type string to its token. Exact, case-sensitive match only;
    /// anything else is a user input error.
    pub fn resolve(&self, resource_type: &str) -> Result<K, DiscoveryError> {
        self.kinds
            .iter()
            .find(|k| k.as_str() == resource_type)
            .copied()
            .ok_or_else(|| DiscoveryError::UnsupportedResourceType {
                resource_type: resource_type.to_string(),
            })
    }

    /// Capability probe built on [`resolve`](Registry::resolve).
    pub fn contains(&self, resource_type: &str) -> bool {
        self.resolve(resource_type).is_ok()
    }
}
