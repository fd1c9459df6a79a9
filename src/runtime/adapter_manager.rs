//! # Adapter Manager
//!
//! The handle through which a registered adapter is driven. One manager exists per
//! registered identity; it owns the live [`Adapter`] and exposes it on the
//! management boundary.

use super::management::{
    ManagedBean, ManagementError, ManagementOperation, ManagementResponse, ManagementServer,
};
use super::marshaller::{ConfigMarshaller, JsonMarshaller};
use super::object_name::ObjectName;
use crate::adapter::{Adapter, AdapterDefinition};
use crate::error::{AdapterError, Result};
use crate::lifecycle::{ComponentState, Managed};
use crate::message::Message;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub struct AdapterManager {
    name: ObjectName,
    definition: AdapterDefinition,
    adapter: Mutex<Managed<Adapter>>,
    destroyed: AtomicBool,
}

impl AdapterManager {
    /// Build the live adapter; it starts out `Closed`
    pub fn new(definition: AdapterDefinition) -> Result<Self> {
        let name = ObjectName::adapter(definition.unique_id())?;
        let adapter = Adapter::from_definition(&definition)?;
        Ok(Self {
            adapter: Mutex::new(Managed::new(definition.unique_id(), adapter)),
            name,
            definition,
            destroyed: AtomicBool::new(false),
        })
    }

    pub fn object_name(&self) -> &ObjectName {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        self.definition.unique_id()
    }

    /// The definition this adapter was built from
    pub fn definition(&self) -> &AdapterDefinition {
        &self.definition
    }

    pub fn state(&self) -> ComponentState {
        self.adapter.lock().state()
    }

    pub fn request_init(&self) -> Result<()> {
        Ok(self.adapter.lock().request_init()?)
    }

    pub fn request_start(&self) -> Result<()> {
        Ok(self.adapter.lock().request_start()?)
    }

    pub fn request_stop(&self) -> Result<()> {
        Ok(self.adapter.lock().request_stop()?)
    }

    pub fn request_close(&self) -> Result<()> {
        Ok(self.adapter.lock().request_close()?)
    }

    /// Route a message through one of this adapter's started workflows
    pub fn process_message(&self, workflow_id: &str, message: &mut Message) -> Result<()> {
        Ok(self
            .adapter
            .lock()
            .component_mut()
            .process_message(workflow_id, message)?)
    }

    /// The adapter's configuration as JSON text
    pub fn get_configuration(&self) -> Result<String> {
        Ok(JsonMarshaller.marshal(&self.definition)?)
    }

    pub fn register_mbean(self: &Arc<Self>, server: &ManagementServer) -> Result<()> {
        server.register(Arc::clone(self) as Arc<dyn ManagedBean>)?;
        Ok(())
    }

    /// Remove this adapter from `server`; false when it was not registered
    pub fn unregister_mbean(&self, server: &ManagementServer) -> bool {
        server.unregister(&self.name).is_some()
    }

    /// Mark this handle as being destroyed
    ///
    /// Exactly one caller receives `true`.
    pub fn claim_destruction(&self) -> bool {
        self.destroyed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    fn invoke_operation(&self, operation: ManagementOperation) -> Result<ManagementResponse> {
        let response = match operation {
            ManagementOperation::RequestInit => {
                self.request_init()?;
                ManagementResponse::Done
            }
            ManagementOperation::RequestStart => {
                self.request_start()?;
                ManagementResponse::Done
            }
            ManagementOperation::RequestStop => {
                self.request_stop()?;
                ManagementResponse::Done
            }
            ManagementOperation::RequestClose => {
                self.request_close()?;
                ManagementResponse::Done
            }
            ManagementOperation::GetState => ManagementResponse::State(self.state()),
            ManagementOperation::GetConfiguration => {
                ManagementResponse::Configuration(self.get_configuration()?)
            }
        };
        info!(adapter = %self.name, operation = %operation, "Management operation invoked");
        Ok(response)
    }
}

impl ManagedBean for AdapterManager {
    fn object_name(&self) -> &ObjectName {
        &self.name
    }

    fn invoke(
        &self,
        operation: ManagementOperation,
    ) -> std::result::Result<ManagementResponse, ManagementError> {
        self.invoke_operation(operation)
            .map_err(|e| ManagementError::Invocation(AdapterError::flatten(&e)))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl std::fmt::Debug for AdapterManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterManager")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
