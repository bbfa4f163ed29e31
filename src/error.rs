//! Error types for cloudharvest

use thiserror::Error;

/// Main error type for discovery operations
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The requested type string does not resolve in the resource type
    /// registry. User-input error, never retried.
    #[error("unsupported resource type {resource_type:?}")]
    UnsupportedResourceType { resource_type: String },

    /// A registered type has no enumerator bound. Internal-consistency
    /// error; must never be downgraded to an empty result.
    #[error("no reader bound for registered resource type {resource_type:?}")]
    MissingReaderBinding { resource_type: &'static str },

    /// Failure raised by the underlying vendor call (network, authorization,
    /// rate limiting, malformed response). Carries the resource type it
    /// happened under once the dispatcher has attached it.
    #[error("backend call failed for resource type {resource_type:?}")]
    BackendCall {
        resource_type: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Cancellation fired mid-enumeration. Distinct from `BackendCall` so
    /// callers can tell "gave up" from "failed".
    #[error("discovery of resource type {resource_type:?} was cancelled")]
    Cancelled { resource_type: String },

    /// Required backend configuration is absent or invalid. Detected at
    /// construction, before any discovery call is possible.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DiscoveryError {
    /// Wrap an arbitrary backend failure, without resource-type context yet.
    /// The dispatcher attaches the type via [`with_resource_type`].
    ///
    /// [`with_resource_type`]: DiscoveryError::with_resource_type
    pub fn backend<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DiscoveryError::BackendCall {
            resource_type: String::new(),
            source: Box::new(source),
        }
    }

    /// Backend failure from a plain message (malformed response, unexpected
    /// status code).
    pub fn backend_msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        DiscoveryError::BackendCall {
            resource_type: String::new(),
            source: message.into(),
        }
    }

    /// Attach the resource type being discovered to errors that carry one.
    /// Other variants pass through untouched.
    pub fn with_resource_type(self, resource_type: &str) -> Self {
        match self {
            DiscoveryError::BackendCall { source, .. } => DiscoveryError::BackendCall {
                resource_type: resource_type.to_string(),
                source,
            },
            DiscoveryError::Cancelled { .. } => DiscoveryError::Cancelled {
                resource_type: resource_type.to_string(),
            },
            other => other,
        }
    }

    /// True for errors a caller may not retry or ignore: programming errors
    /// in the registry/binding tables.
    pub fn is_internal(&self) -> bool {
        matches!(self, DiscoveryError::MissingReaderBinding { .. })
    }
}

impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        DiscoveryError::backend(err)
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::backend(err)
    }
}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        DiscoveryError::backend(err)
    }
}
