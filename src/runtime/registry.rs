//! # Adapter Registry
//!
//! Creates, tracks, persists, validates and reloads the adapters hosted by a process.
//!
//! ## Key Features
//!
//! - **Unique admission**: an identity is admitted at most once; check-and-insert
//!   happens under one lock
//! - **All-violations validation**: configuration is validated as a whole and every
//!   violation is reported in one error
//! - **Exactly-once destroy**: of several threads destroying the same adapter, one
//!   tears it down and the rest see [`AdapterError::NotFound`]
//! - **Pluggable collaborators**: transport, pre-processors, marshaller, validator and
//!   version control are traits with file/JSON defaults
//!
//! Pre-processing, unmarshalling and validation run outside every registry lock.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use adapter_runtime::config::BootstrapConfig;
//! use adapter_runtime::runtime::AdapterRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = AdapterRegistry::builder(BootstrapConfig::default()).build()?;
//! let name = registry.create_adapter_from_url("config/adapter.json")?;
//! registry.lookup_adapter(&name)?.request_start()?;
//! # Ok(())
//! # }
//! ```

use super::adapter_manager::AdapterManager;
use super::descriptor;
use super::management::{
    ManagedBean, ManagementError, ManagementOperation, ManagementResponse, ManagementServer,
};
use super::marshaller::{ConfigMarshaller, ConfigValidator, DefaultValidator, JsonMarshaller};
use super::object_name::ObjectName;
use super::preprocessor::{DefaultPreProcessorLoader, PreProcessorLoader};
use super::transport::{ConfigLocation, ConfigTransport, FileTransport};
use super::vcs::{CommandVersionControl, RuntimeVersionControl};
use crate::adapter::AdapterDefinition;
use crate::config::BootstrapConfig;
use crate::constants::management;
use crate::error::{AdapterError, Result};
use crate::logging::log_registry_operation;
use crate::validation::ValidationError;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry of the adapters hosted by this process
pub struct AdapterRegistry {
    config: BootstrapConfig,
    name: ObjectName,
    server: Arc<ManagementServer>,
    registered: Mutex<HashSet<ObjectName>>,
    locations: Mutex<HashMap<ObjectName, ConfigLocation>>,
    transport: Box<dyn ConfigTransport>,
    preprocessor_loader: Box<dyn PreProcessorLoader>,
    marshaller: Box<dyn ConfigMarshaller>,
    validator: Option<Box<dyn ConfigValidator>>,
    version_control: Option<Box<dyn RuntimeVersionControl>>,
}

/// Builder for [`AdapterRegistry`]
pub struct AdapterRegistryBuilder {
    config: BootstrapConfig,
    server: Option<Arc<ManagementServer>>,
    transport: Box<dyn ConfigTransport>,
    preprocessor_loader: Box<dyn PreProcessorLoader>,
    marshaller: Box<dyn ConfigMarshaller>,
    validator: Box<dyn ConfigValidator>,
    version_control: Option<Box<dyn RuntimeVersionControl>>,
}

impl AdapterRegistryBuilder {
    /// Use a dedicated management server instead of the process-wide one
    pub fn management_server(mut self, server: Arc<ManagementServer>) -> Self {
        self.server = Some(server);
        self
    }

    pub fn transport(mut self, transport: impl ConfigTransport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    pub fn preprocessor_loader(mut self, loader: impl PreProcessorLoader + 'static) -> Self {
        self.preprocessor_loader = Box::new(loader);
        self
    }

    pub fn marshaller(mut self, marshaller: impl ConfigMarshaller + 'static) -> Self {
        self.marshaller = Box::new(marshaller);
        self
    }

    pub fn validator(mut self, validator: impl ConfigValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn version_control(
        mut self,
        version_control: impl RuntimeVersionControl + 'static,
    ) -> Self {
        self.version_control = Some(Box::new(version_control));
        self
    }

    pub fn build(self) -> Result<AdapterRegistry> {
        self.config.validate()?;
        let registry_id = self
            .config
            .registry_id
            .as_deref()
            .unwrap_or(management::DEFAULT_REGISTRY_ID);
        let name = ObjectName::registry(registry_id)?;

        let version_control = self.version_control.or_else(|| {
            CommandVersionControl::from_config(&self.config)
                .map(|vcs| Box::new(vcs) as Box<dyn RuntimeVersionControl>)
        });
        let validator = if self.config.validation_enabled() {
            Some(self.validator)
        } else {
            info!(registry = %name, "Adapter configuration validation is disabled");
            None
        };

        Ok(AdapterRegistry {
            name,
            server: self.server.unwrap_or_else(ManagementServer::global),
            registered: Mutex::new(HashSet::new()),
            locations: Mutex::new(HashMap::new()),
            transport: self.transport,
            preprocessor_loader: self.preprocessor_loader,
            marshaller: self.marshaller,
            validator,
            version_control,
            config: self.config,
        })
    }
}

impl AdapterRegistry {
    pub fn builder(config: BootstrapConfig) -> AdapterRegistryBuilder {
        AdapterRegistryBuilder {
            config,
            server: None,
            transport: Box::new(FileTransport),
            preprocessor_loader: Box::new(DefaultPreProcessorLoader),
            marshaller: Box::new(JsonMarshaller),
            validator: Box::new(DefaultValidator),
            version_control: None,
        }
    }

    /// The registry's own management name
    pub fn create_object_name(&self) -> &ObjectName {
        &self.name
    }

    pub fn management_server(&self) -> &Arc<ManagementServer> {
        &self.server
    }

    /// Expose the registry itself on its management server
    pub fn register_mbean(self: &Arc<Self>) -> Result<()> {
        self.server
            .register(Arc::clone(self) as Arc<dyn ManagedBean>)?;
        Ok(())
    }

    pub fn unregister_mbean(&self) -> bool {
        self.server.unregister(&self.name).is_some()
    }

    /// Snapshot of the registered identities
    pub fn get_adapters(&self) -> HashSet<ObjectName> {
        self.registered.lock().clone()
    }

    pub fn get_configuration(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Implementation name of the version control, if there is one
    pub fn get_version_control(&self) -> Option<&str> {
        self.version_control
            .as_deref()
            .map(|vcs| vcs.implementation_name())
    }

    pub fn get_configuration_location(&self, name: &ObjectName) -> Option<ConfigLocation> {
        self.locations.lock().get(name).cloned()
    }

    pub fn get_configuration_location_string(&self, name: &ObjectName) -> Option<String> {
        self.get_configuration_location(name)
            .map(|location| location.to_string())
    }

    /// Record where `name` was loaded from; `None` leaves any existing entry alone
    pub fn put_configuration_location(&self, name: &ObjectName, location: Option<ConfigLocation>) {
        if let Some(location) = location {
            self.locations.lock().insert(name.clone(), location);
        }
    }

    pub fn put_configuration_location_str(&self, name: &ObjectName, location: &str) -> Result<()> {
        let location: ConfigLocation = location.parse()?;
        self.put_configuration_location(name, Some(location));
        Ok(())
    }

    pub fn remove_configuration_location(&self, name: &ObjectName) -> bool {
        self.locations.lock().remove(name).is_some()
    }

    /// Create an adapter from configuration read at `location`
    pub fn create_adapter(&self, location: &ConfigLocation) -> Result<ObjectName> {
        let text = self.transport.read_to_string(location)?;
        self.register(&text, Some(location.clone()))
    }

    pub fn create_adapter_from_url(&self, url: &str) -> Result<ObjectName> {
        let location: ConfigLocation = url.parse()?;
        self.create_adapter(&location)
    }

    /// Create an adapter from configuration text; no location is recorded
    pub fn create_adapter_from_text(&self, text: &str) -> Result<ObjectName> {
        self.register(text, None)
    }

    /// Admit an existing adapter handle
    pub fn add_adapter(&self, manager: Arc<AdapterManager>) -> Result<ObjectName> {
        let name = manager.object_name().clone();
        if manager.is_destroyed() {
            return Err(AdapterError::Destroyed(name));
        }
        self.add(&name)?;
        if !self.server.is_registered(&name) {
            if let Err(e) = manager.register_mbean(&self.server) {
                self.remove(&name);
                return Err(e);
            }
        }
        log_registry_operation("add_adapter", Some(&name.to_string()), "success", None);
        Ok(name)
    }

    /// Close an adapter and remove every trace of it from the registry
    ///
    /// The handle must be the one this registry holds under its name.
    pub fn destroy_adapter(&self, manager: &AdapterManager) -> Result<()> {
        let name = manager.object_name().clone();
        if !self.holds(manager) || !manager.claim_destruction() {
            return Err(AdapterError::NotFound(name));
        }

        if let Err(e) = manager.request_close() {
            warn!(
                adapter = %name,
                error = %e,
                "Adapter did not close cleanly, removing it anyway"
            );
        }
        manager.unregister_mbean(&self.server);
        self.forget(&name);

        log_registry_operation("destroy_adapter", Some(&name.to_string()), "success", None);
        Ok(())
    }

    /// Destroy the adapter registered as `name`
    ///
    /// An identity this registry still lists but the management server no longer
    /// knows is dropped from the registry, and the call reports `NotFound`.
    pub fn destroy_adapter_by_name(&self, name: &ObjectName) -> Result<()> {
        match self.lookup_adapter(name) {
            Ok(manager) => self.destroy_adapter(&manager),
            Err(e) => {
                if self.forget(name) {
                    warn!(
                        registry = %self.name,
                        adapter = %name,
                        "Dropped adapter that was no longer on the management server"
                    );
                }
                Err(e)
            }
        }
    }

    /// Resolve an adapter handle through the management server
    pub fn lookup_adapter(&self, name: &ObjectName) -> Result<Arc<AdapterManager>> {
        self.server
            .lookup_as::<AdapterManager>(name)
            .ok_or_else(|| AdapterError::NotFound(name.clone()))
    }

    /// Write an adapter's configuration to `location`
    pub fn persist_adapter(
        &self,
        manager: &AdapterManager,
        location: &ConfigLocation,
    ) -> Result<()> {
        let data = self.marshaller.marshal(manager.definition())?;
        self.persist(&data, location)
    }

    pub fn persist_adapter_by_name(
        &self,
        name: &ObjectName,
        location: &ConfigLocation,
    ) -> Result<()> {
        let manager = self.lookup_adapter(name)?;
        self.persist_adapter(&manager, location)
    }

    /// Write `data` followed by a newline to `location`
    pub fn persist(&self, data: &str, location: &ConfigLocation) -> Result<()> {
        let mut writer = self.transport.open_writer(location)?;
        writeln!(writer, "{data}")?;
        writer.flush()?;
        debug!(location = %location, bytes = data.len() + 1, "Configuration persisted");
        Ok(())
    }

    /// Destroy every adapter, then recreate from the canonical configuration
    ///
    /// Not transactional: if recreation fails the registry is left empty.
    pub fn reload_from_config(&self) -> Result<HashSet<ObjectName>> {
        self.destroy_all()?;
        let url = self.config.adapter_config_url()?;
        self.create_adapter_from_url(url)?;
        Ok(self.get_adapters())
    }

    /// Destroy every adapter, update from version control, then recreate
    pub fn reload_from_version_control(&self) -> Result<()> {
        let version_control = self
            .version_control
            .as_deref()
            .ok_or(AdapterError::MissingCollaborator("runtime version control"))?;
        self.destroy_all()?;
        version_control.update()?;
        let url = self.config.adapter_config_url()?;
        self.create_adapter_from_url(url)?;
        Ok(())
    }

    /// Check configuration text without registering anything
    ///
    /// Every failure is collapsed into one message.
    pub fn validate_config(&self, text: &str) -> Result<()> {
        let check = || -> Result<()> {
            let definition = self.unmarshal(text)?;
            match &self.validator {
                Some(validator) => validator.validate(&definition)?,
                None => DefaultValidator.validate(&definition)?,
            }
            Ok(())
        };
        check().map_err(|e| AdapterError::flattened(&e))
    }

    /// JSON description of a configurable type
    pub fn get_class_definition(&self, type_name: &str) -> Result<String> {
        let descriptor = descriptor::class_descriptor(type_name).ok_or_else(|| {
            AdapterError::Core(format!("no class definition for '{type_name}'"))
        })?;
        Ok(serde_json::to_string_pretty(descriptor)?)
    }

    fn destroy_all(&self) -> Result<()> {
        for name in self.get_adapters() {
            match self.destroy_adapter_by_name(&name) {
                Ok(()) | Err(AdapterError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn unmarshal(&self, text: &str) -> Result<AdapterDefinition> {
        let processed = self.preprocessor_loader.load(&self.config)?.process(text)?;
        Ok(self.marshaller.unmarshal(&processed)?)
    }

    fn check_violations(&self, definition: &AdapterDefinition) -> Result<()> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        validator.validate(definition).map_err(|error: ValidationError| {
            for violation in error.violations() {
                warn!("{violation}");
            }
            AdapterError::Validation(error)
        })
    }

    fn register(&self, text: &str, location: Option<ConfigLocation>) -> Result<ObjectName> {
        let definition = self.unmarshal(text)?;
        self.check_violations(&definition)?;

        let manager = Arc::new(AdapterManager::new(definition)?);
        let name = manager.object_name().clone();
        self.add(&name)?;
        if let Err(e) = manager.register_mbean(&self.server) {
            self.remove(&name);
            return Err(e);
        }
        self.put_configuration_location(&name, location);

        info!(registry = %self.name, adapter = %name, "Adapter created");
        log_registry_operation("create_adapter", Some(&name.to_string()), "success", None);
        Ok(name)
    }

    fn add(&self, name: &ObjectName) -> Result<()> {
        let mut registered = self.registered.lock();
        if registered.contains(name) {
            return Err(AdapterError::Collision(name.clone()));
        }
        registered.insert(name.clone());
        Ok(())
    }

    fn remove(&self, name: &ObjectName) {
        self.registered.lock().remove(name);
    }

    /// Drop `name` from the identity set and the location map
    fn forget(&self, name: &ObjectName) -> bool {
        let listed = self.registered.lock().remove(name);
        self.remove_configuration_location(name);
        listed
    }

    /// Whether `manager` is the handle registered under its name
    fn holds(&self, manager: &AdapterManager) -> bool {
        let name = manager.object_name();
        if !self.registered.lock().contains(name) {
            return false;
        }
        match self.server.lookup_as::<AdapterManager>(name) {
            Some(registered) => std::ptr::eq(Arc::as_ptr(&registered), manager),
            None => true,
        }
    }

    fn invoke_operation(&self, operation: ManagementOperation) -> Result<ManagementResponse> {
        match operation {
            ManagementOperation::GetConfiguration => Ok(ManagementResponse::Configuration(
                serde_json::to_string_pretty(&self.config)?,
            )),
            other => Err(ManagementError::Unsupported {
                name: self.name.clone(),
                operation: other,
            }
            .into()),
        }
    }
}

impl ManagedBean for AdapterRegistry {
    fn object_name(&self) -> &ObjectName {
        &self.name
    }

    fn invoke(
        &self,
        operation: ManagementOperation,
    ) -> std::result::Result<ManagementResponse, ManagementError> {
        self.invoke_operation(operation).map_err(|e| match e {
            AdapterError::Management(inner) => inner,
            other => ManagementError::Invocation(other.flatten()),
        })
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("name", &self.name)
            .field("adapters", &self.registered.lock().len())
            .field("validating", &self.validator.is_some())
            .field("version_control", &self.get_version_control())
            .finish()
    }
}

fn invoke_each(
    server: &ManagementServer,
    names: &HashSet<ObjectName>,
    operation: ManagementOperation,
) -> Result<()> {
    for name in names {
        server.invoke(name, operation)?;
    }
    Ok(())
}

/// `request_start` every adapter in `names` by name
pub fn start_all(server: &ManagementServer, names: &HashSet<ObjectName>) -> Result<()> {
    invoke_each(server, names, ManagementOperation::RequestStart)
}

/// `request_stop` every adapter in `names` by name
pub fn stop_all(server: &ManagementServer, names: &HashSet<ObjectName>) -> Result<()> {
    invoke_each(server, names, ManagementOperation::RequestStop)
}

/// `request_close` every adapter in `names` by name
pub fn close_all(server: &ManagementServer, names: &HashSet<ObjectName>) -> Result<()> {
    invoke_each(server, names, ManagementOperation::RequestClose)
}

/// Remove every adapter in `names` from `server`
pub fn unregister_all(server: &ManagementServer, names: &HashSet<ObjectName>) {
    for name in names {
        server.unregister(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ComponentState;

    const VALID: &str =
        r#"{"uniqueId":"unit","channels":[{"uniqueId":"c","workflows":[{"uniqueId":"w"}]}]}"#;

    fn registry() -> AdapterRegistry {
        AdapterRegistry::builder(BootstrapConfig::default())
            .management_server(Arc::new(ManagementServer::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_then_destroy() {
        let registry = registry();
        let name = registry.create_adapter_from_text(VALID).unwrap();
        assert!(registry.get_adapters().contains(&name));
        assert_eq!(registry.lookup_adapter(&name).unwrap().state(), ComponentState::Closed);

        registry.destroy_adapter_by_name(&name).unwrap();
        assert!(registry.get_adapters().is_empty());
        assert!(matches!(
            registry.destroy_adapter_by_name(&name),
            Err(AdapterError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_identity_collides() {
        let registry = registry();
        registry.create_adapter_from_text(VALID).unwrap();
        assert!(matches!(
            registry.create_adapter_from_text(VALID),
            Err(AdapterError::Collision(_))
        ));
        assert_eq!(registry.get_adapters().len(), 1);
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let config = BootstrapConfig {
            validate_config: false,
            ..BootstrapConfig::default()
        };
        let registry = AdapterRegistry::builder(config)
            .management_server(Arc::new(ManagementServer::new()))
            .build()
            .unwrap();
        let text = r#"{"uniqueId":"lenient","channels":[{"uniqueId":"c"},{"uniqueId":"c"}]}"#;
        assert!(registry.create_adapter_from_text(text).is_ok());
        // explicit validation still applies the rules
        assert!(registry.validate_config(text).is_err());
    }

    #[test]
    fn test_registry_bean_reports_configuration() {
        let registry = Arc::new(registry());
        registry.register_mbean().unwrap();
        let response = registry
            .management_server()
            .invoke(registry.create_object_name(), ManagementOperation::GetConfiguration)
            .unwrap();
        assert!(matches!(
            response,
            ManagementResponse::Configuration(ref c) if c.contains("validate_config")
        ));
        assert!(matches!(
            registry
                .management_server()
                .invoke(registry.create_object_name(), ManagementOperation::RequestStart),
            Err(ManagementError::Unsupported { .. })
        ));
        assert!(registry.unregister_mbean());
    }

    #[test]
    fn test_configuration_locations() {
        let registry = registry();
        let name = ObjectName::adapter("loc").unwrap();
        registry.put_configuration_location(&name, None);
        assert!(registry.get_configuration_location(&name).is_none());

        registry.put_configuration_location_str(&name, "config/a.json").unwrap();
        assert_eq!(
            registry.get_configuration_location_string(&name).as_deref(),
            Some("config/a.json")
        );
        assert!(registry.remove_configuration_location(&name));
        assert!(!registry.remove_configuration_location(&name));
    }

    #[test]
    fn test_class_definition() {
        let registry = registry();
        let json = registry.get_class_definition("split-join").unwrap();
        assert!(json.contains("poolSize"));
        assert!(registry.get_class_definition("unknown").is_err());
    }

    #[test]
    fn test_reload_without_version_control_fails_fast() {
        let registry = registry();
        let name = registry.create_adapter_from_text(VALID).unwrap();
        assert!(matches!(
            registry.reload_from_version_control(),
            Err(AdapterError::MissingCollaborator(_))
        ));
        // nothing was destroyed
        assert!(registry.get_adapters().contains(&name));
    }
}
