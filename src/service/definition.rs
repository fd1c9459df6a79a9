//! Serde model for service configuration
//!
//! ```json
//! { "type": "split-join", "uniqueId": "fan-out", "poolSize": 4,
//!   "service": { "type": "replace-text", "search": "a", "replacement": "b" } }
//! ```

use super::builtin::{AddMetadata, AlwaysFail, LogMessage, NullService, ReplaceText, ServiceList};
use super::split_join::SplitJoinService;
use super::{Service, ServicePrototype, ServiceResult};
use crate::validation::{child_path, Validate, Violations};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// One configured service; the prototype for every instance created from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(flatten)]
    pub kind: ServiceKind,
}

/// The built-in service kinds
///
/// Most fields default so that a missing value is reported by validation rather than
/// rejected by the deserializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServiceKind {
    NullService,
    AddMetadata {
        #[serde(default)]
        metadata: BTreeMap<String, String>,
    },
    ReplaceText {
        #[serde(default)]
        search: String,
        #[serde(default)]
        replacement: String,
    },
    LogMessage {
        #[serde(default)]
        prefix: String,
    },
    AlwaysFail {
        #[serde(default)]
        message: String,
    },
    ServiceList {
        #[serde(default)]
        services: Vec<ServiceDefinition>,
    },
    SplitJoin {
        #[serde(default)]
        pool_size: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        separator: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shutdown_timeout_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service: Option<Box<ServiceDefinition>>,
    },
}

impl ServiceKind {
    /// The `type` tag as it appears in configuration
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NullService => "null-service",
            Self::AddMetadata { .. } => "add-metadata",
            Self::ReplaceText { .. } => "replace-text",
            Self::LogMessage { .. } => "log-message",
            Self::AlwaysFail { .. } => "always-fail",
            Self::ServiceList { .. } => "service-list",
            Self::SplitJoin { .. } => "split-join",
        }
    }
}

impl ServiceDefinition {
    pub fn new(kind: ServiceKind) -> Self {
        Self {
            unique_id: None,
            kind,
        }
    }

    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Configured id, or a generated one of the form `<type>-<8 hex>`
    pub fn resolve_unique_id(&self) -> String {
        match &self.unique_id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => {
                let suffix = Uuid::new_v4().simple().to_string();
                format!("{}-{}", self.kind.type_name(), &suffix[..8])
            }
        }
    }
}

impl ServicePrototype for ServiceDefinition {
    fn create_service(&self) -> ServiceResult<Box<dyn Service>> {
        let id = self.resolve_unique_id();
        let service: Box<dyn Service> = match &self.kind {
            ServiceKind::NullService => Box::new(NullService::new(id)),
            ServiceKind::AddMetadata { metadata } => {
                Box::new(AddMetadata::new(id, metadata.clone()))
            }
            ServiceKind::ReplaceText {
                search,
                replacement,
            } => Box::new(ReplaceText::new(id, search, replacement)),
            ServiceKind::LogMessage { prefix } => Box::new(LogMessage::new(id, prefix)),
            ServiceKind::AlwaysFail { message } => Box::new(AlwaysFail::new(id, message)),
            ServiceKind::ServiceList { services } => {
                let nested = services
                    .iter()
                    .map(|definition| definition.create_service())
                    .collect::<ServiceResult<Vec<_>>>()?;
                Box::new(ServiceList::new(id, nested))
            }
            ServiceKind::SplitJoin {
                pool_size,
                separator,
                shutdown_timeout_ms,
                service,
            } => {
                let nested: Arc<dyn ServicePrototype> = match service {
                    Some(definition) => Arc::new((**definition).clone()),
                    None => Arc::new(ServiceDefinition::new(ServiceKind::NullService)),
                };
                let mut split_join = SplitJoinService::new(id, nested, *pool_size);
                if let Some(separator) = separator {
                    split_join = split_join.with_separator(separator.clone());
                }
                if let Some(ms) = shutdown_timeout_ms {
                    split_join = split_join.with_shutdown_timeout(Duration::from_millis(*ms));
                }
                Box::new(split_join)
            }
        };
        Ok(service)
    }

    fn describe(&self) -> String {
        self.unique_id
            .clone()
            .unwrap_or_else(|| self.kind.type_name().to_string())
    }
}

impl Validate for ServiceDefinition {
    fn collect_violations(&self, path: &str, violations: &mut Violations) {
        match &self.kind {
            ServiceKind::AddMetadata { metadata } => {
                if metadata.keys().any(|k| k.trim().is_empty()) {
                    violations.add(child_path(path, "metadata"), "keys may not be blank");
                }
            }
            ServiceKind::ReplaceText { search, .. } => {
                if search.is_empty() {
                    violations.add(child_path(path, "search"), "may not be empty");
                }
            }
            ServiceKind::ServiceList { services } => {
                for (index, service) in services.iter().enumerate() {
                    service.collect_violations(
                        &child_path(path, format!("services[{index}]")),
                        violations,
                    );
                }
            }
            ServiceKind::SplitJoin {
                pool_size,
                separator,
                service,
                ..
            } => {
                if *pool_size < 1 {
                    violations.add(
                        child_path(path, "poolSize"),
                        "must be greater than or equal to 1",
                    );
                }
                if separator.as_deref() == Some("") {
                    violations.add(child_path(path, "separator"), "may not be empty");
                }
                match service {
                    Some(nested) => {
                        nested.collect_violations(&child_path(path, "service"), violations)
                    }
                    None => violations.add(child_path(path, "service"), "may not be null"),
                }
            }
            ServiceKind::NullService
            | ServiceKind::LogMessage { .. }
            | ServiceKind::AlwaysFail { .. } => {}
        }
    }
}
