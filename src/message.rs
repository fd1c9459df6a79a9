//! Messages flowing through workflows and services.

use crate::constants::metadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A unit of work: text payload plus string metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    unique_id: Uuid,
    payload: String,
    metadata: BTreeMap<String, String>,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            unique_id: Uuid::new_v4(),
            payload: payload.into(),
            metadata: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Builder-style metadata setter
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn unique_id(&self) -> Uuid {
        self.unique_id
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: impl Into<String>) {
        self.payload = payload.into();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn remove_metadata(&mut self, key: &str) -> Option<String> {
        self.metadata.remove(key)
    }

    /// New message carrying `payload`, a copy of this message's metadata and a link
    /// back to this message
    pub fn fragment(&self, payload: impl Into<String>) -> Message {
        let mut fragment = Message::new(payload);
        fragment.metadata = self.metadata.clone();
        fragment.add_metadata(metadata::PARENT_MESSAGE_ID, self.unique_id.to_string());
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_accessors() {
        let mut message = Message::new("hello").with_metadata("source", "test");
        assert_eq!(message.get_metadata("source"), Some("test"));

        message.add_metadata("count", "1");
        assert_eq!(message.metadata().len(), 2);
        assert_eq!(message.remove_metadata("count"), Some("1".to_string()));
        assert_eq!(message.get_metadata("count"), None);
    }

    #[test]
    fn test_fragment_inherits_metadata_and_links_parent() {
        let parent = Message::new("a\nb").with_metadata("route", "north");
        let fragment = parent.fragment("a");

        assert_ne!(fragment.unique_id(), parent.unique_id());
        assert_eq!(fragment.payload(), "a");
        assert_eq!(fragment.get_metadata("route"), Some("north"));
        assert_eq!(
            fragment.get_metadata(metadata::PARENT_MESSAGE_ID),
            Some(parent.unique_id().to_string().as_str())
        );
    }
}
