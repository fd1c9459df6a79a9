// Lifecycle module for managed components
//
// Every adapter, channel, workflow, service and pooled worker is driven through the
// same closed -> initialised -> started -> stopped state graph.

pub mod collection;
pub mod errors;
pub mod events;
pub mod machine;
pub mod states;

// Re-export main types for convenient access
pub use collection::ManagedCollection;
pub use errors::{component_error, LifecycleError, LifecycleResult};
pub use events::LifecycleEvent;
pub use machine::{ComponentLifecycle, Managed};
pub use states::ComponentState;
