//! Reading and writing adapter configuration at a [`ConfigLocation`]

use crate::config::ConfigurationError;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where adapter configuration is read from or persisted to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConfigLocation {
    File(PathBuf),
    /// Any `scheme://...` location other than `file://`
    Url(String),
}

impl ConfigLocation {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Url(_) => None,
        }
    }
}

impl FromStr for ConfigLocation {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConfigurationError::InvalidLocation {
                location: s.to_string(),
                reason: "location is empty".to_string(),
            });
        }
        if let Some(path) = trimmed.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }
        match trimmed.split_once("://") {
            Some((scheme, _)) if scheme.is_empty() => Err(ConfigurationError::InvalidLocation {
                location: s.to_string(),
                reason: "missing scheme".to_string(),
            }),
            Some(_) => Ok(Self::Url(trimmed.to_string())),
            None => Ok(Self::File(PathBuf::from(trimmed))),
        }
    }
}

impl TryFrom<String> for ConfigLocation {
    type Error = ConfigurationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConfigLocation> for String {
    fn from(location: ConfigLocation) -> Self {
        location.to_string()
    }
}

impl fmt::Display for ConfigLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Opens configuration locations for reading and writing
pub trait ConfigTransport: Send + Sync {
    fn open_reader(&self, location: &ConfigLocation) -> Result<Box<dyn Read + Send>>;

    fn open_writer(&self, location: &ConfigLocation) -> Result<Box<dyn Write + Send>>;

    fn read_to_string(&self, location: &ConfigLocation) -> Result<String> {
        let mut text = String::new();
        self.open_reader(location)?.read_to_string(&mut text)?;
        Ok(text)
    }
}

/// Local files only; URLs are reported as unsupported
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

impl FileTransport {
    fn path<'a>(&self, location: &'a ConfigLocation) -> Result<&'a Path> {
        location.as_path().ok_or_else(|| {
            ConfigurationError::UnsupportedLocation {
                location: location.to_string(),
            }
            .into()
        })
    }
}

impl ConfigTransport for FileTransport {
    fn open_reader(&self, location: &ConfigLocation) -> Result<Box<dyn Read + Send>> {
        let file = File::open(self.path(location)?)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn open_writer(&self, location: &ConfigLocation) -> Result<Box<dyn Write + Send>> {
        let file = File::create(self.path(location)?)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}
