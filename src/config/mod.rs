//! # Bootstrap Configuration
//!
//! Settings the registry needs before any adapter exists: where the canonical
//! adapter configuration lives, which pre-processors to run over it, whether to
//! validate it, and which version control to update from.
//!
//! ## Sources
//!
//! Loaded with the `config` crate, later sources overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables prefixed `ADAPTER__`, nested keys separated by `__`
//!    (`ADAPTER__VARIABLES__HOST=example.org` sets `variables.host`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use adapter_runtime::config::BootstrapConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BootstrapConfig::load(Some("bootstrap.toml".as_ref()))?;
//! println!("adapter config at {:?}", config.adapter_config_url);
//! # Ok(())
//! # }
//! ```

pub mod error;

use crate::constants::bootstrap;
use crate::logging::LoggedOnce;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

pub use error::{ConfigResult, ConfigurationError};

static ENABLE_VALIDATION_DEPRECATED: LoggedOnce = LoggedOnce::new();

/// Registry bootstrap settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Suffix of the registry's management name
    pub registry_id: Option<String>,
    /// Canonical adapter configuration, used by the reload operations
    pub adapter_config_url: Option<String>,
    pub validate_config: bool,
    /// Legacy spelling of `validate_config`
    pub enable_validation: Option<bool>,
    /// Pre-processors applied to configuration text, in order
    pub preprocessors: Vec<String>,
    /// Values for the `variable-substitution` pre-processor
    pub variables: BTreeMap<String, String>,
    /// Command line run by the version control `update`, e.g. `git pull --ff-only`
    pub version_control: Option<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            registry_id: None,
            adapter_config_url: None,
            validate_config: true,
            enable_validation: None,
            preprocessors: Vec::new(),
            variables: BTreeMap::new(),
            version_control: None,
        }
    }
}

impl BootstrapConfig {
    /// Load defaults, then `path` if given, then `ADAPTER__*` environment overrides
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(bootstrap::ENV_PREFIX)
                .separator(bootstrap::ENV_SEPARATOR)
                .try_parsing(true),
        );

        let loaded: BootstrapConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse TOML text directly, without environment overrides
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let loaded: BootstrapConfig = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(id) = &self.registry_id {
            if id.trim().is_empty() || id.contains([':', ',', '=']) {
                return Err(ConfigurationError::invalid_value(
                    "registry_id",
                    id,
                    "must be non-blank and free of ':', ',' and '='",
                ));
            }
        }
        if let Some(url) = &self.adapter_config_url {
            if url.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    "adapter_config_url",
                    url,
                    "must not be blank",
                ));
            }
        }
        if let Some(name) = self.preprocessors.iter().find(|p| p.trim().is_empty()) {
            return Err(ConfigurationError::invalid_value(
                "preprocessors",
                name,
                "pre-processor names must not be blank",
            ));
        }
        if let Some(command) = &self.version_control {
            if command.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    "version_control",
                    command,
                    "must not be blank",
                ));
            }
        }
        Ok(())
    }

    /// Whether adapter configuration is validated before admission
    ///
    /// Either key can switch validation off; the legacy key is reported once.
    pub fn validation_enabled(&self) -> bool {
        match self.enable_validation {
            Some(legacy) => {
                if ENABLE_VALIDATION_DEPRECATED.first_time() {
                    warn!("'enable_validation' is deprecated, use 'validate_config' instead");
                }
                self.validate_config && legacy
            }
            None => self.validate_config,
        }
    }

    /// The canonical adapter configuration location
    pub fn adapter_config_url(&self) -> ConfigResult<&str> {
        self.adapter_config_url
            .as_deref()
            .ok_or_else(|| {
                ConfigurationError::missing_required_field("adapter_config_url", "bootstrap")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BootstrapConfig::default();
        assert!(config.validate_config);
        assert!(config.validation_enabled());
        assert!(config.adapter_config_url().is_err());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parses_toml() {
        let config = BootstrapConfig::from_toml_str(
            r#"
            registry_id = "main"
            adapter_config_url = "config/adapter.json"
            validate_config = false
            preprocessors = ["variable-substitution"]

            [variables]
            host = "example.org"
            "#,
        )
        .unwrap();

        assert_eq!(config.registry_id.as_deref(), Some("main"));
        assert_eq!(config.adapter_config_url().unwrap(), "config/adapter.json");
        assert!(!config.validation_enabled());
        assert_eq!(config.variables.get("host").map(String::as_str), Some("example.org"));
    }

    #[test]
    fn test_legacy_key_can_disable_validation() {
        let config = BootstrapConfig {
            enable_validation: Some(false),
            ..BootstrapConfig::default()
        };
        assert!(!config.validation_enabled());
        assert!(!config.validation_enabled());
    }

    #[test]
    fn test_rejects_bad_registry_id() {
        let result = BootstrapConfig::from_toml_str(r#"registry_id = "a,b""#);
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }
}
