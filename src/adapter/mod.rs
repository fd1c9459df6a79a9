// Adapter module
//
// Configuration model (adapter -> channels -> workflows -> services), its
// constraint rules, and the live components built from it.

pub mod definition;
pub mod runtime;

pub use definition::{AdapterDefinition, ChannelDefinition, WorkflowDefinition};
pub use runtime::{Adapter, Channel, Workflow};
