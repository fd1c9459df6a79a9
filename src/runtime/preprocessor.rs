//! Text transformations applied to adapter configuration before unmarshalling

use crate::config::{BootstrapConfig, ConfigResult, ConfigurationError};
use crate::constants::bootstrap;
use std::collections::BTreeMap;
use tracing::debug;

/// One step in the pre-processing chain
pub trait ConfigPreProcessor: Send + Sync {
    fn name(&self) -> &str;

    fn process(&self, text: &str) -> ConfigResult<String>;
}

/// Ordered chain of pre-processors
#[derive(Default)]
pub struct ConfigPreProcessors {
    chain: Vec<Box<dyn ConfigPreProcessor>>,
}

impl ConfigPreProcessors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, processor: Box<dyn ConfigPreProcessor>) {
        self.chain.push(processor);
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.chain.iter().map(|p| p.name()).collect()
    }

    /// Run every pre-processor in order
    pub fn process(&self, text: &str) -> ConfigResult<String> {
        let mut current = text.to_string();
        for processor in &self.chain {
            current = processor.process(&current)?;
            debug!(preprocessor = processor.name(), "Configuration pre-processed");
        }
        Ok(current)
    }
}

impl std::fmt::Debug for ConfigPreProcessors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Builds the pre-processor chain named by the bootstrap configuration
pub trait PreProcessorLoader: Send + Sync {
    fn load(&self, config: &BootstrapConfig) -> ConfigResult<ConfigPreProcessors>;
}

/// Knows the built-in pre-processors
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPreProcessorLoader;

impl PreProcessorLoader for DefaultPreProcessorLoader {
    fn load(&self, config: &BootstrapConfig) -> ConfigResult<ConfigPreProcessors> {
        let mut chain = ConfigPreProcessors::new();
        for name in &config.preprocessors {
            match name.trim() {
                bootstrap::VARIABLE_SUBSTITUTION => chain.push(Box::new(
                    VariableSubstitution::new(config.variables.clone()),
                )),
                other => {
                    return Err(ConfigurationError::UnknownPreProcessor {
                        name: other.to_string(),
                    })
                }
            }
        }
        Ok(chain)
    }
}

/// Replaces `${name}` with the value of `name`
///
/// An undefined variable is an error. `${` without a closing brace is left as is.
#[derive(Debug, Clone, Default)]
pub struct VariableSubstitution {
    variables: BTreeMap<String, String>,
}

impl VariableSubstitution {
    pub fn new(variables: BTreeMap<String, String>) -> Self {
        Self { variables }
    }
}

impl ConfigPreProcessor for VariableSubstitution {
    fn name(&self) -> &str {
        bootstrap::VARIABLE_SUBSTITUTION
    }

    fn process(&self, text: &str) -> ConfigResult<String> {
        let mut output = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            let Some(length) = rest[start + 2..].find('}') else {
                break;
            };
            let name = &rest[start + 2..start + 2 + length];
            let value = self.variables.get(name).ok_or_else(|| {
                ConfigurationError::pre_processing(
                    self.name(),
                    format!("variable '{name}' is not defined"),
                )
            })?;
            output.push_str(&rest[..start]);
            output.push_str(value);
            rest = &rest[start + 3 + length..];
        }
        output.push_str(rest);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn substitution() -> VariableSubstitution {
        let mut variables = BTreeMap::new();
        variables.insert("id".to_string(), "orders".to_string());
        variables.insert("host".to_string(), "example.org".to_string());
        VariableSubstitution::new(variables)
    }

    #[test]
    fn test_substitutes_variables() {
        let out = substitution()
            .process(r#"{"uniqueId":"${id}","url":"http://${host}/${id}"}"#)
            .unwrap();
        assert_eq!(out, r#"{"uniqueId":"orders","url":"http://example.org/orders"}"#);
    }

    #[test]
    fn test_undefined_variable_fails() {
        let err = substitution().process("${missing}").unwrap_err();
        assert!(matches!(err, ConfigurationError::PreProcessing { .. }));
    }

    #[test]
    fn test_unterminated_reference_is_kept() {
        assert_eq!(substitution().process("a ${id").unwrap(), "a ${id");
    }

    #[test]
    fn test_loader_builds_named_chain() {
        let config = BootstrapConfig {
            preprocessors: vec!["variable-substitution".to_string()],
            ..BootstrapConfig::default()
        };
        let chain = DefaultPreProcessorLoader.load(&config).unwrap();
        assert_eq!(chain.names(), vec!["variable-substitution"]);

        let unknown = BootstrapConfig {
            preprocessors: vec!["xinclude".to_string()],
            ..BootstrapConfig::default()
        };
        assert!(matches!(
            DefaultPreProcessorLoader.load(&unknown),
            Err(ConfigurationError::UnknownPreProcessor { .. })
        ));
    }
}
