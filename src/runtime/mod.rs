// Runtime module
//
// The adapter registry, the management boundary it exposes adapters on, and the
// configuration collaborators it delegates to.

pub mod adapter_manager;
pub mod descriptor;
pub mod management;
pub mod marshaller;
pub mod object_name;
pub mod preprocessor;
pub mod registry;
pub mod transport;
pub mod vcs;

// Re-export main types for convenient access
pub use adapter_manager::AdapterManager;
pub use descriptor::{class_descriptor, ClassDescriptor, FieldDescriptor};
pub use management::{
    ManagedBean, ManagementError, ManagementOperation, ManagementResponse, ManagementServer,
};
pub use marshaller::{ConfigMarshaller, ConfigValidator, DefaultValidator, JsonMarshaller};
pub use object_name::ObjectName;
pub use preprocessor::{
    ConfigPreProcessor, ConfigPreProcessors, DefaultPreProcessorLoader, PreProcessorLoader,
    VariableSubstitution,
};
pub use registry::{
    close_all, start_all, stop_all, unregister_all, AdapterRegistry, AdapterRegistryBuilder,
};
pub use transport::{ConfigLocation, ConfigTransport, FileTransport};
pub use vcs::{CommandVersionControl, RuntimeVersionControl};
