#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Adapter Runtime
//!
//! Substrate for hosting independently configured integration adapters.
//!
//! ## Overview
//!
//! An adapter is a message-processing unit built from channels, workflows and
//! services. This crate provides the pieces every adapter host needs: a uniform
//! lifecycle for all managed components, a registry that admits, persists and reloads
//! adapters under concurrent access, and a bounded worker pool that lets one service
//! prototype be invoked concurrently without shared mutable state.
//!
//! ## Key Features
//!
//! - **One lifecycle**: adapters, channels, workflows, services and pooled workers
//!   all follow `closed -> initialised -> started -> stopped`
//! - **Idempotent requests**: `request_*` operations reach the requested state from
//!   wherever the component is
//! - **Safe admission**: identities are unique, configuration is validated as a whole
//! - **Bounded concurrency**: `split-join` fans fragments out to at most `pool_size`
//!   workers and always releases them
//!
//! ## Module Organization
//!
//! - [`lifecycle`] - State machine shared by every managed component
//! - [`pool`] - Object pool, executor and service worker pool
//! - [`service`] - Service trait, definitions and built-in services
//! - [`adapter`] - Adapter configuration model and runtime components
//! - [`runtime`] - Registry, management boundary and configuration collaborators
//! - [`config`] - Bootstrap configuration
//! - [`error`] - Crate error type
//!
//! ## Quick Start
//!
//! ```rust
//! use adapter_runtime::config::BootstrapConfig;
//! use adapter_runtime::runtime::{AdapterRegistry, ManagementServer};
//! use adapter_runtime::Message;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = AdapterRegistry::builder(BootstrapConfig::default())
//!     .management_server(Arc::new(ManagementServer::new()))
//!     .build()?;
//!
//! let name = registry.create_adapter_from_text(r#"{
//!     "uniqueId": "quick-start",
//!     "channels": [{ "uniqueId": "in", "workflows": [{
//!         "uniqueId": "shout",
//!         "services": [{ "type": "replace-text", "search": "hi", "replacement": "HI" }]
//!     }]}]
//! }"#)?;
//!
//! let adapter = registry.lookup_adapter(&name)?;
//! adapter.request_start()?;
//! let mut message = Message::new("hi there");
//! adapter.process_message("shout", &mut message)?;
//! assert_eq!(message.payload(), "HI there");
//!
//! registry.destroy_adapter_by_name(&name)?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod constants;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod message;
pub mod pool;
pub mod runtime;
pub mod service;
pub mod validation;

pub use adapter::{AdapterDefinition, ChannelDefinition, WorkflowDefinition};
pub use config::{BootstrapConfig, ConfigurationError};
pub use error::{AdapterError, Result};
pub use lifecycle::{ComponentLifecycle, ComponentState, LifecycleError, Managed};
pub use message::Message;
pub use pool::{PoolError, ServiceWorkerPool};
pub use runtime::{AdapterManager, AdapterRegistry, ConfigLocation, ManagementServer, ObjectName};
pub use service::{Service, ServiceDefinition, ServiceError, ServiceKind, ServicePrototype};
pub use validation::{ConstraintViolation, ValidationError};
