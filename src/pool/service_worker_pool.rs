//! # Service Worker Pool
//!
//! Lets one service prototype be invoked concurrently by many callers. Each worker is
//! an independent service created from the prototype, so no mutable state is ever
//! shared between concurrent invocations.
//!
//! Worker lifecycle inside the pool:
//!
//! - created: service built from the prototype and initialised
//! - borrowed: started
//! - returned: stopped, then reused if still valid
//! - destroyed: closed

use super::errors::{PoolError, PoolResult};
use super::executor::BoundedExecutor;
use super::factory::PooledObjectFactory;
use super::object_pool::{BoundedObjectPool, PoolConfig};
use crate::lifecycle::{ComponentState, Managed};
use crate::message::Message;
use crate::service::{Service, ServicePrototype, ServiceResult};
use std::sync::Arc;
use tracing::{error, info, warn};

/// One service instance owned by a pool
#[derive(Debug)]
pub struct Worker {
    service: Managed<Box<dyn Service>>,
}

impl Worker {
    pub fn new(service: Box<dyn Service>) -> Self {
        let name = service.unique_id().to_string();
        Self {
            service: Managed::new(name, service),
        }
    }

    pub fn unique_id(&self) -> &str {
        self.service.name()
    }

    pub fn state(&self) -> ComponentState {
        self.service.state()
    }

    pub fn do_service(&mut self, message: &mut Message) -> ServiceResult<()> {
        self.service.component_mut().do_service(message)
    }

    /// A worker is reusable while it is open and its service says so
    pub fn is_valid(&self) -> bool {
        self.service.state() != ComponentState::Closed && self.service.component().is_valid()
    }
}

/// Pool callbacks that create workers from a prototype and drive their lifecycle
pub struct WorkerFactory {
    prototype: Arc<dyn ServicePrototype>,
}

impl WorkerFactory {
    pub fn new(prototype: Arc<dyn ServicePrototype>) -> Self {
        Self { prototype }
    }
}

impl PooledObjectFactory for WorkerFactory {
    type Object = Worker;

    fn make_object(&self) -> PoolResult<Worker> {
        let service = self
            .prototype
            .create_service()
            .map_err(|e| PoolError::Creation(e.to_string()))?;
        let mut worker = Worker::new(service);
        worker
            .service
            .request_init()
            .map_err(|e| PoolError::Creation(e.to_string()))?;
        Ok(worker)
    }

    fn validate_object(&self, worker: &Worker) -> bool {
        worker.is_valid()
    }

    fn activate_object(&self, worker: &mut Worker) -> PoolResult<()> {
        worker
            .service
            .request_start()
            .map_err(|e| PoolError::Activation(e.to_string()))
    }

    fn passivate_object(&self, worker: &mut Worker) -> PoolResult<()> {
        worker
            .service
            .request_stop()
            .map_err(|e| PoolError::Passivation(e.to_string()))
    }

    fn destroy_object(&self, mut worker: Worker) {
        if let Err(e) = worker.service.request_close() {
            warn!(worker = %worker.unique_id(), error = %e, "Failed to close pooled worker");
        }
    }
}

/// Builds fixed-size worker pools and matching executors for one prototype
#[derive(Clone)]
pub struct ServiceWorkerPool {
    prototype: Arc<dyn ServicePrototype>,
    size: usize,
}

impl ServiceWorkerPool {
    pub fn new(prototype: Arc<dyn ServicePrototype>, size: usize) -> PoolResult<Self> {
        if size == 0 {
            return Err(PoolError::InvalidConfig(format!(
                "worker pool for {} needs at least one worker",
                prototype.describe()
            )));
        }
        Ok(Self { prototype, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Fixed capacity, block on exhaustion, no timeout
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::fixed(self.size)
    }

    /// An empty pool; call [`warmup`](Self::warmup) to fill it
    pub fn create_object_pool(&self) -> PoolResult<BoundedObjectPool<WorkerFactory>> {
        BoundedObjectPool::new(
            format!("{}-workers", self.prototype.describe()),
            WorkerFactory::new(Arc::clone(&self.prototype)),
            self.pool_config(),
        )
    }

    /// Eagerly create every worker, failing on the first one that cannot be created
    ///
    /// Workers created before the failure stay in the pool; closing the pool
    /// destroys them.
    pub fn warmup(&self, pool: &BoundedObjectPool<WorkerFactory>) -> PoolResult<()> {
        let missing = self.size.saturating_sub(pool.num_allocated());
        for created in 0..missing {
            if let Err(e) = pool.add_object() {
                error!(
                    pool = %pool.name(),
                    created = created,
                    requested = missing,
                    error = %e,
                    "Worker pool warmup failed"
                );
                return Err(PoolError::Warmup {
                    pool: pool.name().to_string(),
                    created,
                    requested: missing,
                    reason: e.to_string(),
                });
            }
        }
        info!(pool = %pool.name(), workers = self.size, "Worker pool warmed up");
        Ok(())
    }

    /// Executor with one thread per worker
    pub fn create_executor(&self, prefix: &str) -> PoolResult<BoundedExecutor> {
        BoundedExecutor::new(format!("{prefix}-{}", self.prototype.describe()), self.size)
    }

    /// Close `pool` if there is one; never fails
    pub fn close_quietly<F: PooledObjectFactory>(pool: Option<&BoundedObjectPool<F>>) {
        if let Some(pool) = pool {
            pool.close();
        }
    }
}

impl std::fmt::Debug for ServiceWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceWorkerPool")
            .field("prototype", &self.prototype.describe())
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{ServiceDefinition, ServiceKind};

    fn replace_prototype() -> Arc<dyn ServicePrototype> {
        Arc::new(
            ServiceDefinition::new(ServiceKind::ReplaceText {
                search: "a".into(),
                replacement: "b".into(),
            })
            .with_unique_id("replace"),
        )
    }

    #[test]
    fn test_rejects_empty_pool() {
        assert!(matches!(
            ServiceWorkerPool::new(replace_prototype(), 0),
            Err(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_warmup_fills_pool_with_initialised_workers() {
        let workers = ServiceWorkerPool::new(replace_prototype(), 3).unwrap();
        let pool = workers.create_object_pool().unwrap();
        workers.warmup(&pool).unwrap();

        assert_eq!(pool.num_idle(), 3);
        assert_eq!(pool.num_allocated(), 3);

        let mut worker = pool.checkout().unwrap();
        assert_eq!(worker.state(), ComponentState::Started);
        let mut message = Message::new("aaa");
        worker.do_service(&mut message).unwrap();
        assert_eq!(message.payload(), "bbb");
        worker.checkin();

        ServiceWorkerPool::close_quietly(Some(&pool));
        assert_eq!(pool.num_allocated(), 0);
    }

    #[test]
    fn test_returned_worker_is_stopped() {
        let workers = ServiceWorkerPool::new(replace_prototype(), 1).unwrap();
        let pool = workers.create_object_pool().unwrap();
        workers.warmup(&pool).unwrap();

        drop(pool.checkout().unwrap());
        let worker = pool.borrow_object().unwrap();
        // Reborrowed worker was stopped on return and restarted on borrow
        assert_eq!(worker.state(), ComponentState::Started);
        pool.return_object(worker);
        pool.close();
    }

    #[test]
    fn test_close_quietly_accepts_missing_pool() {
        ServiceWorkerPool::close_quietly::<WorkerFactory>(None);
    }
}
