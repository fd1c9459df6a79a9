//! # Runtime Constants
//!
//! Well-known names and defaults shared by the registry, the management boundary
//! and the built-in services.

use std::time::Duration;

/// Metadata keys the runtime writes onto messages
pub mod metadata {
    /// Set on every fragment produced by a split, holds the parent message id
    pub const PARENT_MESSAGE_ID: &str = "_parentMessageId";
    /// Set by a workflow before its services run
    pub const WORKFLOW_ID: &str = "_workflowId";
    pub const CHANNEL_ID: &str = "_channelId";
}

/// Management naming
pub mod management {
    pub const DOMAIN: &str = "com.adapter.runtime";
    pub const ADAPTER_TYPE: &str = "Adapter";
    pub const REGISTRY_TYPE: &str = "AdapterRegistry";
    pub const DEFAULT_REGISTRY_ID: &str = "AdapterRegistry";
}

/// Bootstrap configuration defaults
pub mod bootstrap {
    pub const ENV_PREFIX: &str = "ADAPTER";
    pub const ENV_SEPARATOR: &str = "__";
    pub const DEFAULT_CONFIG_FILE: &str = "bootstrap.toml";
    pub const VARIABLE_SUBSTITUTION: &str = "variable-substitution";
}

/// Default separator used by `split-join`
pub const DEFAULT_SPLIT_SEPARATOR: &str = "\n";

/// How long `split-join` waits for in-flight fragments when it is closed
pub const DEFAULT_EXECUTOR_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Thread name prefix for split-join executors
pub const EXECUTOR_THREAD_PREFIX: &str = "split-join";
