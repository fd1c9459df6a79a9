//! Conversion between configuration text and [`AdapterDefinition`]

use crate::adapter::AdapterDefinition;
use crate::config::{ConfigResult, ConfigurationError};
use crate::validation::{Validate, ValidationError};

pub trait ConfigMarshaller: Send + Sync {
    fn marshal(&self, definition: &AdapterDefinition) -> ConfigResult<String>;

    fn unmarshal(&self, text: &str) -> ConfigResult<AdapterDefinition>;
}

/// Pretty-printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl ConfigMarshaller for JsonMarshaller {
    fn marshal(&self, definition: &AdapterDefinition) -> ConfigResult<String> {
        serde_json::to_string_pretty(definition)
            .map_err(|e| ConfigurationError::Unmarshal(format!("cannot marshal adapter: {e}")))
    }

    fn unmarshal(&self, text: &str) -> ConfigResult<AdapterDefinition> {
        serde_json::from_str(text).map_err(|e| ConfigurationError::Unmarshal(e.to_string()))
    }
}

/// Checks a definition before it is admitted to a registry
pub trait ConfigValidator: Send + Sync {
    fn validate(&self, definition: &AdapterDefinition) -> Result<(), ValidationError>;
}

/// Applies the constraint rules attached to the definition types
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidator;

impl ConfigValidator for DefaultValidator {
    fn validate(&self, definition: &AdapterDefinition) -> Result<(), ValidationError> {
        Validate::validate(definition, "")
    }
}
