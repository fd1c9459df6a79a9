//! Management names of the form `domain:key=value,key=value`

use super::management::ManagementError;
use crate::constants::management;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identity of a component exposed on a management server
///
/// Key properties are kept sorted, so two names that list the same properties in a
/// different order are equal and render identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName {
    domain: String,
    properties: BTreeMap<String, String>,
}

impl ObjectName {
    pub fn new<I, K, V>(domain: impl Into<String>, properties: I) -> Result<Self, ManagementError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let domain = domain.into();
        if domain.is_empty() || domain.contains([':', ',', '=']) {
            return Err(ManagementError::MalformedName(format!(
                "invalid domain '{domain}'"
            )));
        }

        let mut map = BTreeMap::new();
        for (key, value) in properties {
            let (key, value) = (key.into(), value.into());
            if !is_valid_part(&key) || !is_valid_part(&value) {
                return Err(ManagementError::MalformedName(format!(
                    "invalid key property '{key}={value}'"
                )));
            }
            if map.insert(key.clone(), value).is_some() {
                return Err(ManagementError::MalformedName(format!(
                    "duplicate key '{key}'"
                )));
            }
        }
        if map.is_empty() {
            return Err(ManagementError::MalformedName(format!(
                "'{domain}' has no key properties"
            )));
        }

        Ok(Self {
            domain,
            properties: map,
        })
    }

    /// Name under which an adapter with `unique_id` is exposed
    pub fn adapter(unique_id: &str) -> Result<Self, ManagementError> {
        Self::new(
            management::DOMAIN,
            [("type", management::ADAPTER_TYPE), ("id", unique_id)],
        )
    }

    /// Name under which a registry with `registry_id` is exposed
    pub fn registry(registry_id: &str) -> Result<Self, ManagementError> {
        Self::new(
            management::DOMAIN,
            [("type", management::REGISTRY_TYPE), ("id", registry_id)],
        )
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn key_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// The `id` key property
    pub fn id(&self) -> Option<&str> {
        self.key_property("id")
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && !part.contains([':', ',', '=', '\n'])
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties: Vec<String> = self
            .properties
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        write!(f, "{}:{}", self.domain, properties.join(","))
    }
}

impl FromStr for ObjectName {
    type Err = ManagementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, rest) = s
            .split_once(':')
            .ok_or_else(|| ManagementError::MalformedName(format!("'{s}' has no domain")))?;
        let properties = rest
            .split(',')
            .map(|pair| {
                pair.split_once('=').ok_or_else(|| {
                    ManagementError::MalformedName(format!("'{pair}' is not key=value"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(domain, properties)
    }
}

impl TryFrom<String> for ObjectName {
    type Error = ManagementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectName> for String {
    fn from(name: ObjectName) -> Self {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_name_is_canonical() {
        let name = ObjectName::adapter("MyAdapter").unwrap();
        assert_eq!(name.to_string(), "com.adapter.runtime:id=MyAdapter,type=Adapter");
        assert_eq!(name.id(), Some("MyAdapter"));

        let parsed: ObjectName = "com.adapter.runtime:type=Adapter,id=MyAdapter"
            .parse()
            .unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn test_rejects_malformed_names() {
        assert!("no-domain".parse::<ObjectName>().is_err());
        assert!("domain:".parse::<ObjectName>().is_err());
        assert!("domain:key".parse::<ObjectName>().is_err());
        assert!("domain:a=1,a=2".parse::<ObjectName>().is_err());
        assert!(ObjectName::adapter("bad,id").is_err());
        assert!(ObjectName::adapter("").is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let name = ObjectName::registry("main").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"com.adapter.runtime:id=main,type=AdapterRegistry\"");
        let back: ObjectName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
