//! Static descriptions of the configurable component types
//!
//! Tooling asks the registry for a type's descriptor to learn which fields a
//! configuration entry accepts.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub field_type: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDescriptor {
    pub type_name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

const fn field(name: &'static str, field_type: &'static str, required: bool) -> FieldDescriptor {
    FieldDescriptor {
        name,
        field_type,
        required,
        default_value: None,
    }
}

const fn defaulted(
    name: &'static str,
    field_type: &'static str,
    default_value: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        name,
        field_type,
        required: false,
        default_value: Some(default_value),
    }
}

static DESCRIPTORS: OnceLock<BTreeMap<&'static str, ClassDescriptor>> = OnceLock::new();

fn descriptors() -> &'static BTreeMap<&'static str, ClassDescriptor> {
    DESCRIPTORS.get_or_init(|| {
        let service_id = defaulted("uniqueId", "string", "<type>-<random>");
        let table = vec![
            ClassDescriptor {
                type_name: "adapter",
                category: "adapter",
                description: "Top-level processing unit made of channels",
                fields: vec![
                    field("uniqueId", "string", true),
                    field("channels", "channel[]", false),
                ],
            },
            ClassDescriptor {
                type_name: "channel",
                category: "adapter",
                description: "Group of workflows started and stopped together",
                fields: vec![
                    field("uniqueId", "string", true),
                    defaulted("autoStart", "boolean", "true"),
                    field("workflows", "workflow[]", false),
                ],
            },
            ClassDescriptor {
                type_name: "workflow",
                category: "adapter",
                description: "Ordered chain of services applied to each message",
                fields: vec![
                    field("uniqueId", "string", true),
                    field("services", "service[]", false),
                ],
            },
            ClassDescriptor {
                type_name: "null-service",
                category: "service",
                description: "Does nothing",
                fields: vec![service_id.clone()],
            },
            ClassDescriptor {
                type_name: "add-metadata",
                category: "service",
                description: "Adds fixed metadata entries to every message",
                fields: vec![service_id.clone(), field("metadata", "map<string,string>", false)],
            },
            ClassDescriptor {
                type_name: "replace-text",
                category: "service",
                description: "Replaces every occurrence of a string in the payload",
                fields: vec![
                    service_id.clone(),
                    field("search", "string", true),
                    defaulted("replacement", "string", ""),
                ],
            },
            ClassDescriptor {
                type_name: "log-message",
                category: "service",
                description: "Logs the payload",
                fields: vec![service_id.clone(), defaulted("prefix", "string", "")],
            },
            ClassDescriptor {
                type_name: "always-fail",
                category: "service",
                description: "Fails every message",
                fields: vec![service_id.clone(), defaulted("message", "string", "")],
            },
            ClassDescriptor {
                type_name: "service-list",
                category: "service",
                description: "Runs nested services in order",
                fields: vec![service_id.clone(), field("services", "service[]", false)],
            },
            ClassDescriptor {
                type_name: "split-join",
                category: "service",
                description:
                    "Processes payload fragments concurrently with pooled copies of a service",
                fields: vec![
                    service_id,
                    field("poolSize", "integer", true),
                    defaulted("separator", "string", "\\n"),
                    defaulted("shutdownTimeoutMs", "integer", "10000"),
                    field("service", "service", true),
                ],
            },
        ];
        table.into_iter().map(|d| (d.type_name, d)).collect()
    })
}

pub fn class_descriptor(type_name: &str) -> Option<&'static ClassDescriptor> {
    descriptors().get(type_name)
}

/// Every described type name, sorted
pub fn known_types() -> Vec<&'static str> {
    descriptors().keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_service_kind_is_described() {
        for name in [
            "null-service",
            "add-metadata",
            "replace-text",
            "log-message",
            "always-fail",
            "service-list",
            "split-join",
        ] {
            assert_eq!(class_descriptor(name).unwrap().category, "service");
        }
        assert!(class_descriptor("mystery").is_none());
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let json = serde_json::to_value(class_descriptor("channel").unwrap()).unwrap();
        assert_eq!(json["typeName"], "channel");
        assert_eq!(json["fields"][1]["defaultValue"], "true");
    }
}
