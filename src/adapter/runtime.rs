//! Live adapter components built from definitions
//!
//! Each level owns its children as [`Managed`] components so that a parent's
//! transition is applied to every child through the same state machine.

use super::definition::{AdapterDefinition, ChannelDefinition, WorkflowDefinition};
use crate::constants::metadata;
use crate::lifecycle::{
    ComponentLifecycle, ComponentState, LifecycleResult, Managed, ManagedCollection,
};
use crate::message::Message;
use crate::service::{Service, ServiceError, ServicePrototype, ServiceResult};
use tracing::{debug, info};

/// Ordered chain of services
#[derive(Debug)]
pub struct Workflow {
    unique_id: String,
    channel_id: String,
    services: ManagedCollection<Box<dyn Service>>,
}

impl Workflow {
    pub fn from_definition(
        channel_id: &str,
        definition: &WorkflowDefinition,
    ) -> ServiceResult<Self> {
        let mut services = ManagedCollection::new();
        for service_definition in &definition.services {
            let service = service_definition.create_service()?;
            services.push(Managed::new(service.unique_id().to_string(), service));
        }
        Ok(Self {
            unique_id: definition.unique_id().to_string(),
            channel_id: channel_id.to_string(),
            services,
        })
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Run every service over `message`, stopping at the first failure
    pub fn on_message(&mut self, message: &mut Message) -> ServiceResult<()> {
        message.add_metadata(metadata::WORKFLOW_ID, self.unique_id.clone());
        message.add_metadata(metadata::CHANNEL_ID, self.channel_id.clone());
        for service in self.services.iter_mut() {
            service.component_mut().do_service(message)?;
        }
        debug!(workflow = %self.unique_id, message_id = %message.unique_id(), "Message processed");
        Ok(())
    }
}

impl ComponentLifecycle for Workflow {
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

/// Group of workflows started and stopped together
#[derive(Debug)]
pub struct Channel {
    unique_id: String,
    auto_start: bool,
    workflows: ManagedCollection<Workflow>,
}

impl Channel {
    pub fn from_definition(definition: &ChannelDefinition) -> ServiceResult<Self> {
        let mut workflows = ManagedCollection::new();
        for workflow_definition in &definition.workflows {
            let workflow = Workflow::from_definition(definition.unique_id(), workflow_definition)?;
            workflows.push(Managed::new(workflow.unique_id().to_string(), workflow));
        }
        Ok(Self {
            unique_id: definition.unique_id().to_string(),
            auto_start: definition.auto_start,
            workflows,
        })
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn auto_start(&self) -> bool {
        self.auto_start
    }

    fn workflow_mut(&mut self, workflow_id: &str) -> Option<&mut Managed<Workflow>> {
        self.workflows.find_mut(workflow_id)
    }
}

impl ComponentLifecycle for Channel {
    fn init(&mut self) -> LifecycleResult<()> {
        self.workflows.init_all()
    }

    fn start(&mut self) -> LifecycleResult<()> {
        self.workflows.start_all()
    }

    fn stop(&mut self) -> LifecycleResult<()> {
        self.workflows.stop_all();
        Ok(())
    }

    fn close(&mut self) -> LifecycleResult<()> {
        self.workflows.close_all();
        Ok(())
    }
}

/// Top-level processing unit
#[derive(Debug)]
pub struct Adapter {
    unique_id: String,
    channels: ManagedCollection<Channel>,
}

impl Adapter {
    pub fn from_definition(definition: &AdapterDefinition) -> ServiceResult<Self> {
        let mut channels = ManagedCollection::new();
        for channel_definition in &definition.channels {
            let channel = Channel::from_definition(channel_definition)?;
            channels.push(Managed::new(channel.unique_id().to_string(), channel));
        }
        Ok(Self {
            unique_id: definition.unique_id().to_string(),
            channels,
        })
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn channels(&self) -> impl Iterator<Item = &Managed<Channel>> {
        self.channels.iter()
    }

    pub fn channel(&self, channel_id: &str) -> Option<&Managed<Channel>> {
        self.channels.find(channel_id)
    }

    /// Route `message` through the first started workflow named `workflow_id`
    pub fn process_message(
        &mut self,
        workflow_id: &str,
        message: &mut Message,
    ) -> ServiceResult<()> {
        for channel in self.channels.iter_mut() {
            if channel.state() != ComponentState::Started {
                continue;
            }
            if let Some(workflow) = channel.component_mut().workflow_mut(workflow_id) {
                if workflow.state() == ComponentState::Started {
                    return workflow.component_mut().on_message(message);
                }
            }
        }
        Err(ServiceError::Unavailable {
            service: workflow_id.to_string(),
            reason: format!("no started workflow in adapter {}", self.unique_id),
        })
    }
}

impl ComponentLifecycle for Adapter {
    fn init(&mut self) -> LifecycleResult<()> {
        self.channels.init_all()
    }

    fn start(&mut self) -> LifecycleResult<()> {
        self.channels.start_where(|channel| channel.component().auto_start())?;
        info!(
            adapter = %self.unique_id,
            channels = self.channels.len(),
            "Adapter started"
        );
        Ok(())
    }

    fn stop(&mut self) -> LifecycleResult<()> {
        self.channels.stop_all();
        Ok(())
    }

    fn close(&mut self) -> LifecycleResult<()> {
        self.channels.close_all();
        info!(adapter = %self.unique_id, "Adapter closed");
        Ok(())
    }
}
