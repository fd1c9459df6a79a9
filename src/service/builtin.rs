//! Built-in services

use super::{service_failure, Service, ServiceResult};
use crate::lifecycle::{
    ComponentLifecycle, ComponentState, LifecycleResult, Managed, ManagedCollection,
};
use crate::message::Message;
use std::collections::BTreeMap;
use tracing::info;

/// Does nothing
#[derive(Debug, Clone)]
pub struct NullService {
    unique_id: String,
}

impl NullService {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
        }
    }
}

impl ComponentLifecycle for NullService {}

impl Service for NullService {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn do_service(&mut self, _message: &mut Message) -> ServiceResult<()> {
        Ok(())
    }
}

/// Adds a fixed set of metadata entries to every message
#[derive(Debug, Clone)]
pub struct AddMetadata {
    unique_id: String,
    metadata: BTreeMap<String, String>,
}

impl AddMetadata {
    pub fn new(unique_id: impl Into<String>, metadata: BTreeMap<String, String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            metadata,
        }
    }
}

impl ComponentLifecycle for AddMetadata {}

impl Service for AddMetadata {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn do_service(&mut self, message: &mut Message) -> ServiceResult<()> {
        for (key, value) in &self.metadata {
            message.add_metadata(key.clone(), value.clone());
        }
        Ok(())
    }
}

/// Replaces every occurrence of `search` in the payload
#[derive(Debug, Clone)]
pub struct ReplaceText {
    unique_id: String,
    search: String,
    replacement: String,
}

impl ReplaceText {
    pub fn new(
        unique_id: impl Into<String>,
        search: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            search: search.into(),
            replacement: replacement.into(),
        }
    }
}

impl ComponentLifecycle for ReplaceText {}

impl Service for ReplaceText {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn do_service(&mut self, message: &mut Message) -> ServiceResult<()> {
        if self.search.is_empty() {
            return Err(service_failure(&self.unique_id, "search text is empty"));
        }
        let replaced = message.payload().replace(&self.search, &self.replacement);
        message.set_payload(replaced);
        Ok(())
    }
}

/// Logs the payload at info level
#[derive(Debug, Clone)]
pub struct LogMessage {
    unique_id: String,
    prefix: String,
}

impl LogMessage {
    pub fn new(unique_id: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            prefix: prefix.into(),
        }
    }
}

impl ComponentLifecycle for LogMessage {}

impl Service for LogMessage {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn do_service(&mut self, message: &mut Message) -> ServiceResult<()> {
        info!(
            service = %self.unique_id,
            message_id = %message.unique_id(),
            "{}{}",
            self.prefix,
            message.payload()
        );
        Ok(())
    }
}

/// Fails every message, used to exercise error paths
#[derive(Debug, Clone)]
pub struct AlwaysFail {
    unique_id: String,
    message: String,
}

impl AlwaysFail {
    pub fn new(unique_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            message: message.into(),
        }
    }
}

impl ComponentLifecycle for AlwaysFail {}

impl Service for AlwaysFail {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn do_service(&mut self, _message: &mut Message) -> ServiceResult<()> {
        Err(service_failure(&self.unique_id, &self.message))
    }
}

/// Runs nested services in order, stopping at the first failure
#[derive(Debug)]
pub struct ServiceList {
    unique_id: String,
    services: ManagedCollection<Box<dyn Service>>,
}

impl ServiceList {
    pub fn new(unique_id: impl Into<String>, services: Vec<Box<dyn Service>>) -> Self {
        let mut collection = ManagedCollection::new();
        for service in services {
            let name = service.unique_id().to_string();
            collection.push(Managed::new(name, service));
        }
        Self {
            unique_id: unique_id.into(),
            services: collection,
        }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Lifecycle states of the nested services, in order
    pub fn states(&self) -> Vec<ComponentState> {
        self.services.iter().map(Managed::state).collect()
    }
}

impl ComponentLifecycle for ServiceList {
    fn init(&mut self) -> LifecycleResult<()> {
        self.services.init_all()
    }

    fn start(&mut self) -> LifecycleResult<()> {
        self.services.start_all()
    }

    fn stop(&mut self) -> LifecycleResult<()> {
        self.services.stop_all();
        Ok(())
    }

    fn close(&mut self) -> LifecycleResult<()> {
        self.services.close_all();
        Ok(())
    }
}

impl Service for ServiceList {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn do_service(&mut self, message: &mut Message) -> ServiceResult<()> {
        for service in self.services.iter_mut() {
            service.component_mut().do_service(message)?;
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.services.iter().all(|s| s.component().is_valid())
    }
}
