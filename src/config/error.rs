//! Configuration Error Types
//!
//! Errors raised while loading bootstrap configuration and while turning adapter
//! configuration text into a definition.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Bootstrap file could not be read or parsed
    #[error("Failed to load bootstrap configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Missing required configuration field
    #[error("Missing required configuration field '{field}' in {context}")]
    MissingRequiredField { field: String, context: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },

    /// A configuration location string could not be understood
    #[error("Invalid configuration location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    /// The transport cannot reach this kind of location
    #[error("Unsupported configuration location '{location}'")]
    UnsupportedLocation { location: String },

    /// A pre-processor named in the bootstrap configuration is not known
    #[error("Unknown configuration pre-processor '{name}'")]
    UnknownPreProcessor { name: String },

    /// A pre-processor rejected the configuration text
    #[error("Pre-processor '{name}' failed: {reason}")]
    PreProcessing { name: String, reason: String },

    /// Adapter configuration text could not be unmarshalled
    #[error("Failed to unmarshal adapter configuration: {0}")]
    Unmarshal(String),

    /// Version control update failed
    #[error("Version control '{name}' failed: {reason}")]
    VersionControl { name: String, reason: String },
}

impl ConfigurationError {
    /// Create a missing required field error
    pub fn missing_required_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }

    /// Create a pre-processing error
    pub fn pre_processing<E: std::fmt::Display>(name: impl Into<String>, error: E) -> Self {
        Self::PreProcessing {
            name: name.into(),
            reason: error.to_string(),
        }
    }
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;
