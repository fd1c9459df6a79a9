//! Builders for adapter configuration and registries used across test suites

use adapter_runtime::adapter::{AdapterDefinition, ChannelDefinition, WorkflowDefinition};
use adapter_runtime::config::BootstrapConfig;
use adapter_runtime::runtime::{AdapterRegistry, ManagementServer};
use adapter_runtime::service::{ServiceDefinition, ServiceKind};
use serde_json::{json, Value};
use std::sync::Arc;

/// Registry on its own management server so suites never share names
pub fn isolated_registry() -> AdapterRegistry {
    registry_with(BootstrapConfig::default())
}

pub fn registry_with(config: BootstrapConfig) -> AdapterRegistry {
    AdapterRegistry::builder(config)
        .management_server(Arc::new(ManagementServer::new()))
        .build()
        .expect("Failed to build test registry")
}

/// Builder for adapter configuration documents
pub struct AdapterConfigBuilder {
    unique_id: Option<String>,
    channels: Vec<Value>,
}

impl AdapterConfigBuilder {
    pub fn new(unique_id: &str) -> Self {
        Self {
            unique_id: Some(unique_id.to_string()),
            channels: Vec::new(),
        }
    }

    /// Builder with no `uniqueId` at all
    pub fn anonymous() -> Self {
        Self {
            unique_id: None,
            channels: Vec::new(),
        }
    }

    pub fn with_workflow(mut self, channel: &str, workflow: &str, services: Vec<Value>) -> Self {
        self.channels.push(json!({
            "uniqueId": channel,
            "workflows": [{ "uniqueId": workflow, "services": services }]
        }));
        self
    }

    pub fn with_raw_channel(mut self, channel: Value) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn build_value(self) -> Value {
        let mut document = json!({ "channels": self.channels });
        if let Some(id) = self.unique_id {
            document["uniqueId"] = Value::String(id);
        }
        document
    }

    pub fn build(self) -> String {
        self.build_value().to_string()
    }
}

pub fn replace_text(search: &str, replacement: &str) -> Value {
    json!({ "type": "replace-text", "search": search, "replacement": replacement })
}

pub fn split_join(pool_size: i64, nested: Value) -> Value {
    json!({ "type": "split-join", "poolSize": pool_size, "service": nested })
}

/// Single-channel adapter whose workflow `w` replaces `a` with `b`
pub fn simple_adapter_json(unique_id: &str) -> String {
    AdapterConfigBuilder::new(unique_id)
        .with_workflow("c", "w", vec![replace_text("a", "b")])
        .build()
}

/// Adapter whose workflow `fan-out` runs `replace-text` under a split-join
pub fn split_join_adapter_json(unique_id: &str, pool_size: i64) -> String {
    AdapterConfigBuilder::new(unique_id)
        .with_workflow(
            "in",
            "fan-out",
            vec![split_join(pool_size, replace_text("a", "b"))],
        )
        .build()
}

/// The definition equivalent of [`simple_adapter_json`]
pub fn simple_definition(unique_id: &str) -> AdapterDefinition {
    AdapterDefinition::new(unique_id).with_channel(
        ChannelDefinition::new("c").with_workflow(WorkflowDefinition::new("w").with_service(
            ServiceDefinition::new(ServiceKind::ReplaceText {
                search: "a".into(),
                replacement: "b".into(),
            }),
        )),
    )
}
