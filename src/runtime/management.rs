//! # Management Boundary
//!
//! By-name access to managed components. Callers that only know an [`ObjectName`]
//! look the component up on a [`ManagementServer`] and send it a
//! [`ManagementOperation`]. Errors crossing this boundary are flattened to strings.

use super::object_name::ObjectName;
use crate::lifecycle::ComponentState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::debug;

/// Errors raised at the management boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagementError {
    #[error("Malformed object name: {0}")]
    MalformedName(String),

    #[error("[{0}] is not registered")]
    NotRegistered(ObjectName),

    #[error("[{0}] is already registered")]
    AlreadyRegistered(ObjectName),

    #[error("[{name}] does not support {operation}")]
    Unsupported {
        name: ObjectName,
        operation: ManagementOperation,
    },

    #[error("{0}")]
    Invocation(String),
}

/// Operations that can be invoked by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementOperation {
    RequestInit,
    RequestStart,
    RequestStop,
    RequestClose,
    GetState,
    GetConfiguration,
}

impl std::fmt::Display for ManagementOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RequestInit => "request_init",
            Self::RequestStart => "request_start",
            Self::RequestStop => "request_stop",
            Self::RequestClose => "request_close",
            Self::GetState => "get_state",
            Self::GetConfiguration => "get_configuration",
        };
        write!(f, "{name}")
    }
}

/// Result of a by-name invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagementResponse {
    Done,
    State(ComponentState),
    Configuration(String),
}

/// A component exposed on a management server
pub trait ManagedBean: Send + Sync {
    fn object_name(&self) -> &ObjectName;

    fn invoke(&self, operation: ManagementOperation)
        -> Result<ManagementResponse, ManagementError>;

    /// Upcast used to recover the concrete type behind a looked-up bean
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Name-keyed table of managed beans
#[derive(Default)]
pub struct ManagementServer {
    beans: DashMap<ObjectName, Arc<dyn ManagedBean>>,
}

static GLOBAL_SERVER: OnceLock<Arc<ManagementServer>> = OnceLock::new();

impl ManagementServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide server
    pub fn global() -> Arc<ManagementServer> {
        Arc::clone(GLOBAL_SERVER.get_or_init(|| Arc::new(ManagementServer::new())))
    }

    pub fn register(&self, bean: Arc<dyn ManagedBean>) -> Result<(), ManagementError> {
        let name = bean.object_name().clone();
        match self.beans.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(ManagementError::AlreadyRegistered(name))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(bean);
                debug!(name = %name, "Registered managed bean");
                Ok(())
            }
        }
    }

    /// Remove a bean; `None` when nothing was registered under `name`
    pub fn unregister(&self, name: &ObjectName) -> Option<Arc<dyn ManagedBean>> {
        let removed = self.beans.remove(name).map(|(_, bean)| bean);
        if removed.is_some() {
            debug!(name = %name, "Unregistered managed bean");
        }
        removed
    }

    pub fn is_registered(&self, name: &ObjectName) -> bool {
        self.beans.contains_key(name)
    }

    pub fn lookup(&self, name: &ObjectName) -> Option<Arc<dyn ManagedBean>> {
        self.beans.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up a bean and downcast it to its concrete type
    pub fn lookup_as<T: Any + Send + Sync>(&self, name: &ObjectName) -> Option<Arc<T>> {
        self.lookup(name)
            .and_then(|bean| bean.into_any().downcast::<T>().ok())
    }

    pub fn invoke(
        &self,
        name: &ObjectName,
        operation: ManagementOperation,
    ) -> Result<ManagementResponse, ManagementError> {
        let bean = self
            .lookup(name)
            .ok_or_else(|| ManagementError::NotRegistered(name.clone()))?;
        bean.invoke(operation)
    }

    pub fn names(&self) -> Vec<ObjectName> {
        self.beans.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl std::fmt::Debug for ManagementServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementServer")
            .field("beans", &self.beans.len())
            .finish()
    }
}
