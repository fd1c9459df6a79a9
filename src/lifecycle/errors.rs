use super::events::LifecycleEvent;
use super::states::ComponentState;
use thiserror::Error;

/// Errors raised while driving a component through its lifecycle
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Invalid lifecycle transition for {component}: cannot {event} from {from}")]
    InvalidTransition {
        component: String,
        from: ComponentState,
        event: LifecycleEvent,
    },

    #[error("Failed to initialise {component}: {reason}")]
    InitFailed { component: String, reason: String },

    #[error("Failed to start {component}: {reason}")]
    StartFailed { component: String, reason: String },

    #[error("Component error: {0}")]
    Component(String),
}

/// Result type alias for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Helper function to create component-level failures from lifecycle hooks
pub fn component_error(msg: impl Into<String>) -> LifecycleError {
    LifecycleError::Component(msg.into())
}
