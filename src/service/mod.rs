//! # Services
//!
//! A service is the smallest unit of message processing. Workflows run their
//! services in order; `split-join` runs copies of a nested service concurrently
//! through a [`ServiceWorkerPool`](crate::pool::ServiceWorkerPool).
//!
//! Services are described by a serde-tagged [`ServiceDefinition`]. A definition is
//! immutable and acts as the prototype from which live services are created.

pub mod builtin;
pub mod definition;
pub mod split_join;

use crate::lifecycle::{ComponentLifecycle, LifecycleError};
use crate::message::Message;
use crate::pool::PoolError;
use thiserror::Error;

pub use builtin::{AddMetadata, AlwaysFail, LogMessage, NullService, ReplaceText, ServiceList};
pub use definition::{ServiceDefinition, ServiceKind};
pub use split_join::SplitJoinService;

/// Errors raised while processing a message
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service {service} failed: {reason}")]
    Failed { service: String, reason: String },

    #[error("Service {service} is not available: {reason}")]
    Unavailable { service: String, reason: String },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Helper function to create a processing failure
pub fn service_failure(service: impl Into<String>, reason: impl Into<String>) -> ServiceError {
    ServiceError::Failed {
        service: service.into(),
        reason: reason.into(),
    }
}

/// A message-processing component with its own lifecycle
pub trait Service: ComponentLifecycle {
    fn unique_id(&self) -> &str;

    /// Process `message` in place
    fn do_service(&mut self, message: &mut Message) -> ServiceResult<()>;

    /// Whether this instance may be reused for another message
    fn is_valid(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for dyn Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("unique_id", &self.unique_id())
            .finish()
    }
}

/// Immutable description from which identical services can be created repeatedly
pub trait ServicePrototype: Send + Sync {
    /// A fresh, uninitialised service
    fn create_service(&self) -> ServiceResult<Box<dyn Service>>;

    /// Short human-readable name used in pool and thread names
    fn describe(&self) -> String;
}
