//! # Lifecycle Machine
//!
//! Wraps any [`ComponentLifecycle`] implementation with the shared
//! `closed -> initialised -> started -> stopped` state graph.
//!
//! Two calling conventions are offered:
//!
//! - **Direct** (`init`, `start`, `stop`, `close`): the caller is responsible for
//!   ordering; an operation from the wrong state returns
//!   [`LifecycleError::InvalidTransition`].
//! - **Request** (`request_init`, `request_start`, `request_stop`, `request_close`):
//!   walk whatever path is needed to reach the requested state and treat "already
//!   there" as success. Safe to call repeatedly from callers that cannot observe the
//!   current state.
//!
//! Hook failures from `stop` and `close` are logged and suppressed so that a
//! component can always be torn down.

use super::errors::{LifecycleError, LifecycleResult};
use super::events::LifecycleEvent;
use super::states::ComponentState;
use tracing::{debug, warn};

/// Component-specific lifecycle hooks
///
/// Every hook defaults to a no-op so simple components only override what they need.
pub trait ComponentLifecycle: Send {
    fn init(&mut self) -> LifecycleResult<()> {
        Ok(())
    }

    fn start(&mut self) -> LifecycleResult<()> {
        Ok(())
    }

    fn stop(&mut self) -> LifecycleResult<()> {
        Ok(())
    }

    fn close(&mut self) -> LifecycleResult<()> {
        Ok(())
    }
}

impl<T: ComponentLifecycle + ?Sized> ComponentLifecycle for Box<T> {
    fn init(&mut self) -> LifecycleResult<()> {
        (**self).init()
    }

    fn start(&mut self) -> LifecycleResult<()> {
        (**self).start()
    }

    fn stop(&mut self) -> LifecycleResult<()> {
        (**self).stop()
    }

    fn close(&mut self) -> LifecycleResult<()> {
        (**self).close()
    }
}

/// A component together with its current lifecycle state
#[derive(Debug)]
pub struct Managed<C> {
    name: String,
    state: ComponentState,
    component: C,
}

impl<C: ComponentLifecycle> Managed<C> {
    /// Wrap a component; it starts out `Closed`
    pub fn new(name: impl Into<String>, component: C) -> Self {
        Self {
            name: name.into(),
            state: ComponentState::Closed,
            component,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ComponentState {
        self.state
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    pub fn init(&mut self) -> LifecycleResult<()> {
        self.check(LifecycleEvent::Init)?;
        self.component
            .init()
            .map_err(|e| LifecycleError::InitFailed {
                component: self.name.clone(),
                reason: e.to_string(),
            })?;
        self.set_state(ComponentState::Initialised);
        Ok(())
    }

    pub fn start(&mut self) -> LifecycleResult<()> {
        self.check(LifecycleEvent::Start)?;
        self.component
            .start()
            .map_err(|e| LifecycleError::StartFailed {
                component: self.name.clone(),
                reason: e.to_string(),
            })?;
        self.set_state(ComponentState::Started);
        Ok(())
    }

    pub fn stop(&mut self) -> LifecycleResult<()> {
        self.check(LifecycleEvent::Stop)?;
        if let Err(e) = self.component.stop() {
            warn!(component = %self.name, error = %e, "Ignoring failure while stopping component");
        }
        self.set_state(ComponentState::Stopped);
        Ok(())
    }

    pub fn close(&mut self) -> LifecycleResult<()> {
        self.check(LifecycleEvent::Close)?;
        if let Err(e) = self.component.close() {
            warn!(component = %self.name, error = %e, "Ignoring failure while closing component");
        }
        self.set_state(ComponentState::Closed);
        Ok(())
    }

    /// Initialise unless already past `Closed`
    pub fn request_init(&mut self) -> LifecycleResult<()> {
        match self.state {
            ComponentState::Closed => self.init(),
            _ => Ok(()),
        }
    }

    /// Reach `Started` from any state
    pub fn request_start(&mut self) -> LifecycleResult<()> {
        match self.state {
            ComponentState::Started => Ok(()),
            ComponentState::Closed => {
                self.init()?;
                self.start()
            }
            ComponentState::Initialised | ComponentState::Stopped => self.start(),
        }
    }

    /// Stop if started, otherwise nothing to do
    pub fn request_stop(&mut self) -> LifecycleResult<()> {
        match self.state {
            ComponentState::Started => self.stop(),
            _ => Ok(()),
        }
    }

    /// Reach `Closed` from any state
    pub fn request_close(&mut self) -> LifecycleResult<()> {
        match self.state {
            ComponentState::Closed => Ok(()),
            ComponentState::Started => {
                self.stop()?;
                self.close()
            }
            ComponentState::Initialised | ComponentState::Stopped => self.close(),
        }
    }

    /// Walk the shortest legal path to `target`
    pub fn transition_to(&mut self, target: ComponentState) -> LifecycleResult<()> {
        for next in self.state.path_to(target) {
            match LifecycleEvent::for_target(next) {
                LifecycleEvent::Init => self.init()?,
                LifecycleEvent::Start => self.start()?,
                LifecycleEvent::Stop => self.stop()?,
                LifecycleEvent::Close => self.close()?,
            }
        }
        Ok(())
    }

    fn check(&self, event: LifecycleEvent) -> LifecycleResult<()> {
        if self.state.can_transition_to(event.target_state()) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                component: self.name.clone(),
                from: self.state,
                event,
            })
        }
    }

    fn set_state(&mut self, next: ComponentState) {
        debug!(
            component = %self.name,
            from = %self.state,
            to = %next,
            "Lifecycle transition"
        );
        self.state = next;
    }
}
