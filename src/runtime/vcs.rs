//! Runtime version control for the canonical adapter configuration

use crate::config::{BootstrapConfig, ConfigResult, ConfigurationError};
use std::path::PathBuf;
use std::process::Command;
use tracing::info;

pub trait RuntimeVersionControl: Send + Sync {
    fn implementation_name(&self) -> &str;

    /// Bring the working copy up to date
    fn update(&self) -> ConfigResult<()>;
}

/// Runs an external command line, e.g. `git pull --ff-only`
#[derive(Debug, Clone)]
pub struct CommandVersionControl {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandVersionControl {
    /// Split `command_line` on whitespace; `None` when it is blank
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            working_dir: None,
        })
    }

    /// The command named by `version_control` in the bootstrap configuration
    pub fn from_config(config: &BootstrapConfig) -> Option<Self> {
        config.version_control.as_deref().and_then(Self::parse)
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl RuntimeVersionControl for CommandVersionControl {
    fn implementation_name(&self) -> &str {
        &self.program
    }

    fn update(&self) -> ConfigResult<()> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|e| ConfigurationError::VersionControl {
            name: self.program.clone(),
            reason: e.to_string(),
        })?;
        if !output.status.success() {
            return Err(ConfigurationError::VersionControl {
                name: self.program.clone(),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        info!(program = %self.program, "Version control update complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        let vcs = CommandVersionControl::parse("git pull --ff-only").unwrap();
        assert_eq!(vcs.implementation_name(), "git");
        assert_eq!(vcs.args, vec!["pull", "--ff-only"]);
        assert!(CommandVersionControl::parse("   ").is_none());
    }

    #[test]
    fn test_missing_program_fails_update() {
        let vcs = CommandVersionControl::parse("definitely-not-a-real-vcs-binary").unwrap();
        assert!(matches!(
            vcs.update(),
            Err(ConfigurationError::VersionControl { .. })
        ));
    }
}
