//! Serde model for adapter configuration
//!
//! ```json
//! {
//!   "uniqueId": "orders",
//!   "channels": [{
//!     "uniqueId": "inbound",
//!     "autoStart": true,
//!     "workflows": [{ "uniqueId": "normalise", "services": [{ "type": "null-service" }] }]
//!   }]
//! }
//! ```
//!
//! Identifiers are optional at the serde level so that validation, not the
//! deserializer, reports them missing alongside every other violation.

use crate::service::ServiceDefinition;
use crate::validation::{child_path, Validate, Violations};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub channels: Vec<ChannelDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
    #[serde(default)]
    pub workflows: Vec<WorkflowDefinition>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
}

fn default_auto_start() -> bool {
    true
}

impl AdapterDefinition {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: Some(unique_id.into()),
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: ChannelDefinition) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn unique_id(&self) -> &str {
        self.unique_id.as_deref().unwrap_or_default()
    }
}

impl Default for ChannelDefinition {
    fn default() -> Self {
        Self {
            unique_id: None,
            auto_start: default_auto_start(),
            workflows: Vec::new(),
        }
    }
}

impl ChannelDefinition {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: Some(unique_id.into()),
            ..Self::default()
        }
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn with_workflow(mut self, workflow: WorkflowDefinition) -> Self {
        self.workflows.push(workflow);
        self
    }

    pub fn unique_id(&self) -> &str {
        self.unique_id.as_deref().unwrap_or_default()
    }
}

impl WorkflowDefinition {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: Some(unique_id.into()),
            services: Vec::new(),
        }
    }

    pub fn with_service(mut self, service: ServiceDefinition) -> Self {
        self.services.push(service);
        self
    }

    pub fn unique_id(&self) -> &str {
        self.unique_id.as_deref().unwrap_or_default()
    }
}

impl Validate for AdapterDefinition {
    fn collect_violations(&self, path: &str, violations: &mut Violations) {
        violations.require_non_blank(&child_path(path, "uniqueId"), self.unique_id.as_deref());

        let channels_path = child_path(path, "channels");
        violations.require_unique(
            &channels_path,
            self.channels.iter().filter_map(|c| c.unique_id.as_deref()),
        );
        for (index, channel) in self.channels.iter().enumerate() {
            channel.collect_violations(&format!("{channels_path}[{index}]"), violations);
        }
    }
}

impl Validate for ChannelDefinition {
    fn collect_violations(&self, path: &str, violations: &mut Violations) {
        violations.require_non_blank(&child_path(path, "uniqueId"), self.unique_id.as_deref());

        let workflows_path = child_path(path, "workflows");
        violations.require_unique(
            &workflows_path,
            self.workflows.iter().filter_map(|w| w.unique_id.as_deref()),
        );
        for (index, workflow) in self.workflows.iter().enumerate() {
            workflow.collect_violations(&format!("{workflows_path}[{index}]"), violations);
        }
    }
}

impl Validate for WorkflowDefinition {
    fn collect_violations(&self, path: &str, violations: &mut Violations) {
        violations.require_non_blank(&child_path(path, "uniqueId"), self.unique_id.as_deref());
        for (index, service) in self.services.iter().enumerate() {
            service.collect_violations(&child_path(path, format!("services[{index}]")), violations);
        }
    }
}
