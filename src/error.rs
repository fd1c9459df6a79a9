use crate::config::ConfigurationError;
use crate::lifecycle::LifecycleError;
use crate::pool::PoolError;
use crate::runtime::{ManagementError, ObjectName};
use crate::service::ServiceError;
use crate::validation::ValidationError;
use std::error::Error as StdError;
use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("\n{0}")]
    Validation(#[from] ValidationError),

    #[error("[{0}] already exists in the registry, remove it first")]
    Collision(ObjectName),

    #[error("[{0}] is not registered")]
    NotFound(ObjectName),

    #[error("[{0}] has been destroyed and cannot be added again")]
    Destroyed(ObjectName),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Management error: {0}")]
    Management(#[from] ManagementError),

    #[error("No {0} is configured")]
    MissingCollaborator(&'static str),

    #[error("{0}")]
    Core(String),
}

impl AdapterError {
    /// This error and every `source()` beneath it, joined into one line
    pub fn flatten(&self) -> String {
        flatten_chain(self)
    }

    /// Collapse any error into a single-message [`AdapterError::Core`]
    pub fn flattened<E: StdError + ?Sized>(error: &E) -> Self {
        AdapterError::Core(flatten_chain(error))
    }
}

fn flatten_chain<E: StdError + ?Sized>(error: &E) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // transparent wrappers repeat their source's message
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

pub type Result<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_walks_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let error = AdapterError::from(io);
        assert_eq!(error.flatten(), "I/O error: missing.json");

        let flattened = AdapterError::flattened(&error);
        assert!(matches!(flattened, AdapterError::Core(ref m) if m == "I/O error: missing.json"));
    }

    #[test]
    fn test_collision_message_names_identity() {
        let name = ObjectName::adapter("dup").unwrap();
        let message = AdapterError::Collision(name.clone()).to_string();
        assert!(message.contains(&name.to_string()));
    }
}
