//! # Bounded Object Pool
//!
//! Fixed-capacity pool of objects produced by a [`PooledObjectFactory`].
//!
//! ## Key Features
//!
//! - **Hard upper bound**: never more than `max_active` objects are allocated
//! - **Blocking checkout**: an exhausted pool parks the caller on a condition variable
//!   until an object is returned (or `max_wait` elapses when configured)
//! - **Validation on return**: objects that fail validation or passivation are destroyed
//!   and, while the pool is open, replaced to keep `min_idle`
//! - **Quiet close**: idle objects are destroyed immediately, in-flight objects when
//!   they come back; closing never fails

use super::errors::{PoolError, PoolResult};
use super::factory::PooledObjectFactory;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What a checkout does when every object is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustedAction {
    /// Park the caller until an object is returned
    Block,
    /// Fail immediately with [`PoolError::Exhausted`]
    Fail,
}

/// Sizing and exhaustion policy for a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_active: usize,
    pub min_idle: usize,
    pub max_idle: usize,
    /// `None` blocks forever
    pub max_wait: Option<Duration>,
    pub when_exhausted: ExhaustedAction,
}

impl PoolConfig {
    /// Fixed pool: `min_idle == max_idle == max_active == size`, block without timeout
    pub fn fixed(size: usize) -> Self {
        Self {
            max_active: size,
            min_idle: size,
            max_idle: size,
            max_wait: None,
            when_exhausted: ExhaustedAction::Block,
        }
    }

    pub fn validate(&self) -> PoolResult<()> {
        if self.max_active == 0 {
            return Err(PoolError::InvalidConfig(
                "max_active must be at least 1".to_string(),
            ));
        }
        if self.min_idle > self.max_active || self.max_idle > self.max_active {
            return Err(PoolError::InvalidConfig(format!(
                "idle bounds ({}..{}) exceed max_active {}",
                self.min_idle, self.max_idle, self.max_active
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct PoolState<T> {
    idle: VecDeque<T>,
    /// Objects currently checked out
    active: usize,
    /// Objects in existence, idle + active + being created
    allocated: usize,
    closed: bool,
}

enum Acquired<T> {
    Idle(T),
    Create,
}

/// Bounded, blocking object pool
pub struct BoundedObjectPool<F: PooledObjectFactory> {
    name: String,
    factory: F,
    config: PoolConfig,
    state: Mutex<PoolState<F::Object>>,
    available: Condvar,
}

impl<F: PooledObjectFactory> BoundedObjectPool<F> {
    /// Create a new, empty pool
    pub fn new(name: impl Into<String>, factory: F, config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self {
            name: name.into(),
            factory,
            config,
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                active: 0,
                allocated: 0,
                closed: false,
            }),
            available: Condvar::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn num_idle(&self) -> usize {
        self.state.lock().idle.len()
    }

    pub fn num_active(&self) -> usize {
        self.state.lock().active
    }

    /// Objects that exist right now, whether idle or checked out
    pub fn num_allocated(&self) -> usize {
        self.state.lock().allocated
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Create one object and park it in the idle set
    pub fn add_object(&self) -> PoolResult<()> {
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(self.closed_error());
            }
            if state.allocated >= self.config.max_active {
                return Err(PoolError::Exhausted {
                    pool: self.name.clone(),
                    capacity: self.config.max_active,
                });
            }
            state.allocated += 1;
        }

        let mut object = match self.factory.make_object() {
            Ok(object) => object,
            Err(e) => {
                self.release_slot(false);
                return Err(e);
            }
        };
        if let Err(e) = self.factory.passivate_object(&mut object) {
            self.factory.destroy_object(object);
            self.release_slot(false);
            return Err(e);
        }

        let mut state = self.state.lock();
        if state.closed {
            state.allocated -= 1;
            drop(state);
            self.factory.destroy_object(object);
            return Err(self.closed_error());
        }
        state.idle.push_back(object);
        self.available.notify_one();
        Ok(())
    }

    /// Borrow an object, blocking while the pool is exhausted
    pub(crate) fn borrow_object(&self) -> PoolResult<F::Object> {
        let started = Instant::now();
        let deadline = self.config.max_wait.map(|wait| started + wait);

        let acquired = {
            let mut state = self.state.lock();
            loop {
                if state.closed {
                    return Err(self.closed_error());
                }
                if let Some(object) = state.idle.pop_front() {
                    state.active += 1;
                    break Acquired::Idle(object);
                }
                if state.allocated < self.config.max_active {
                    state.allocated += 1;
                    state.active += 1;
                    break Acquired::Create;
                }
                match (self.config.when_exhausted, deadline) {
                    (ExhaustedAction::Fail, _) => {
                        return Err(PoolError::Exhausted {
                            pool: self.name.clone(),
                            capacity: self.config.max_active,
                        });
                    }
                    (ExhaustedAction::Block, None) => {
                        self.available.wait(&mut state);
                    }
                    (ExhaustedAction::Block, Some(deadline)) => {
                        if self.available.wait_until(&mut state, deadline).timed_out() {
                            return Err(PoolError::Timeout {
                                pool: self.name.clone(),
                                waited_ms: started.elapsed().as_millis() as u64,
                            });
                        }
                    }
                }
            }
        };

        let mut object = match acquired {
            Acquired::Idle(object) => object,
            Acquired::Create => match self.factory.make_object() {
                Ok(object) => object,
                Err(e) => {
                    self.release_slot(true);
                    return Err(e);
                }
            },
        };

        if let Err(e) = self.factory.activate_object(&mut object) {
            warn!(pool = %self.name, error = %e, "Destroying object that failed activation");
            self.factory.destroy_object(object);
            self.release_slot(true);
            return Err(PoolError::Activation(e.to_string()));
        }

        Ok(object)
    }

    /// Borrow an object wrapped in a guard that returns it on drop
    pub fn checkout(&self) -> PoolResult<PooledObject<'_, F>> {
        let object = self.borrow_object()?;
        Ok(PooledObject {
            pool: self,
            object: Some(object),
        })
    }

    /// Hand a borrowed object back
    pub(crate) fn return_object(&self, mut object: F::Object) {
        let mut reusable = self.factory.validate_object(&object);
        if !reusable {
            warn!(pool = %self.name, "Returned object failed validation, destroying it");
        } else if let Err(e) = self.factory.passivate_object(&mut object) {
            warn!(
                pool = %self.name,
                error = %e,
                "Returned object failed passivation, destroying it"
            );
            reusable = false;
        }

        let mut state = self.state.lock();
        if state.active == 0 {
            drop(state);
            warn!(pool = %self.name, "Returned object was not borrowed from this pool");
            self.factory.destroy_object(object);
            return;
        }
        state.active -= 1;
        if reusable && !state.closed && state.idle.len() < self.config.max_idle {
            state.idle.push_back(object);
            self.available.notify_one();
            return;
        }

        state.allocated -= 1;
        let replace = !state.closed && state.allocated < self.config.min_idle;
        drop(state);
        self.available.notify_one();
        self.factory.destroy_object(object);

        if replace {
            self.replenish();
        }
    }

    /// Destroy a borrowed object instead of returning it
    pub(crate) fn invalidate_object(&self, object: F::Object) {
        self.factory.destroy_object(object);
        let replace = {
            let mut state = self.state.lock();
            if state.active == 0 {
                warn!(pool = %self.name, "Invalidated object was not borrowed from this pool");
                return;
            }
            state.active -= 1;
            state.allocated -= 1;
            !state.closed && state.allocated < self.config.min_idle
        };
        self.available.notify_one();
        if replace {
            self.replenish();
        }
    }

    /// Close the pool; idle objects are destroyed now, borrowed ones on return
    pub fn close(&self) {
        let drained: Vec<F::Object> = {
            let mut state = self.state.lock();
            state.closed = true;
            let drained: Vec<F::Object> = state.idle.drain(..).collect();
            state.allocated -= drained.len();
            drained
        };
        self.available.notify_all();

        let destroyed = drained.len();
        for object in drained {
            self.factory.destroy_object(object);
        }

        info!(
            pool = %self.name,
            destroyed = destroyed,
            still_active = self.num_active(),
            "Object pool closed"
        );
    }

    fn replenish(&self) {
        match self.add_object() {
            Ok(()) => debug!(pool = %self.name, "Replaced destroyed object"),
            Err(e) => warn!(pool = %self.name, error = %e, "Could not replace destroyed object"),
        }
    }

    fn release_slot(&self, was_active: bool) {
        let mut state = self.state.lock();
        state.allocated -= 1;
        if was_active {
            state.active -= 1;
        }
        self.available.notify_one();
    }

    fn closed_error(&self) -> PoolError {
        PoolError::Closed {
            pool: self.name.clone(),
        }
    }
}

impl<F: PooledObjectFactory> std::fmt::Debug for BoundedObjectPool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedObjectPool")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("idle", &state.idle.len())
            .field("active", &state.active)
            .field("allocated", &state.allocated)
            .field("closed", &state.closed)
            .finish()
    }
}

/// Exclusive handle on a borrowed object; returns it to the pool when dropped
pub struct PooledObject<'a, F: PooledObjectFactory> {
    pool: &'a BoundedObjectPool<F>,
    object: Option<F::Object>,
}

impl<F: PooledObjectFactory> PooledObject<'_, F> {
    /// Return the object explicitly
    pub fn checkin(mut self) {
        if let Some(object) = self.object.take() {
            self.pool.return_object(object);
        }
    }

    /// Destroy the object rather than returning it
    pub fn invalidate(mut self) {
        if let Some(object) = self.object.take() {
            self.pool.invalidate_object(object);
        }
    }
}

impl<F: PooledObjectFactory> Deref for PooledObject<'_, F> {
    type Target = F::Object;

    fn deref(&self) -> &Self::Target {
        self.object
            .as_ref()
            .expect("pooled object is present until checkin")
    }
}

impl<F: PooledObjectFactory> DerefMut for PooledObject<'_, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.object
            .as_mut()
            .expect("pooled object is present until checkin")
    }
}

impl<F: PooledObjectFactory> Drop for PooledObject<'_, F> {
    fn drop(&mut self) {
        if let Some(object) = self.object.take() {
            self.pool.return_object(object);
        }
    }
}
