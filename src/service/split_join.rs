//! # Split-Join Service
//!
//! Splits a message payload into fragments, runs a nested service over every
//! fragment concurrently and joins the results back in their original order.
//!
//! The nested service is never shared: each fragment is processed by a worker
//! checked out of a [`ServiceWorkerPool`], and the executor has exactly one thread
//! per worker so a fragment task never waits on a worker held by a queued task.

use super::{Service, ServiceError, ServicePrototype, ServiceResult};
use crate::constants::{self, metadata};
use crate::lifecycle::{component_error, ComponentLifecycle, LifecycleResult};
use crate::message::Message;
use crate::pool::{
    BoundedExecutor, BoundedObjectPool, PoolResult, ServiceWorkerPool, WorkerFactory,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct SplitJoinService {
    unique_id: String,
    prototype: Arc<dyn ServicePrototype>,
    pool_size: usize,
    separator: String,
    shutdown_timeout: Duration,
    pool: Option<Arc<BoundedObjectPool<WorkerFactory>>>,
    executor: Option<BoundedExecutor>,
}

impl SplitJoinService {
    pub fn new(
        unique_id: impl Into<String>,
        prototype: Arc<dyn ServicePrototype>,
        pool_size: usize,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            prototype,
            pool_size,
            separator: constants::DEFAULT_SPLIT_SEPARATOR.to_string(),
            shutdown_timeout: constants::DEFAULT_EXECUTOR_SHUTDOWN_TIMEOUT,
            pool: None,
            executor: None,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// The live worker pool, present between init and close
    pub fn worker_pool(&self) -> Option<&BoundedObjectPool<WorkerFactory>> {
        self.pool.as_deref()
    }

    fn build(&self) -> PoolResult<(Arc<BoundedObjectPool<WorkerFactory>>, BoundedExecutor)> {
        let workers = ServiceWorkerPool::new(Arc::clone(&self.prototype), self.pool_size)?;
        let pool = workers.create_object_pool()?;
        if let Err(e) = workers.warmup(&pool) {
            ServiceWorkerPool::close_quietly(Some(&pool));
            return Err(e);
        }
        match workers.create_executor(constants::EXECUTOR_THREAD_PREFIX) {
            Ok(executor) => Ok((Arc::new(pool), executor)),
            Err(e) => {
                ServiceWorkerPool::close_quietly(Some(&pool));
                Err(e)
            }
        }
    }

    /// Shut the executor down, then close the pool and its workers
    fn release(&mut self) {
        if let Some(mut executor) = self.executor.take() {
            if !executor.shutdown_quietly(self.shutdown_timeout) {
                warn!(service = %self.unique_id, "Split-join executor was shut down forcibly");
            }
        }
        ServiceWorkerPool::close_quietly(self.pool.take().as_deref());
    }

    fn unavailable(&self) -> ServiceError {
        ServiceError::Unavailable {
            service: self.unique_id.clone(),
            reason: "worker pool is not initialised".to_string(),
        }
    }
}

impl ComponentLifecycle for SplitJoinService {
    fn init(&mut self) -> LifecycleResult<()> {
        // init is also legal from Stopped, where the previous workers are still live
        self.release();
        let (pool, executor) = self.build().map_err(|e| component_error(e.to_string()))?;
        debug!(
            service = %self.unique_id,
            workers = self.pool_size,
            "Split-join worker pool ready"
        );
        self.pool = Some(pool);
        self.executor = Some(executor);
        Ok(())
    }

    fn close(&mut self) -> LifecycleResult<()> {
        self.release();
        Ok(())
    }
}

impl Service for SplitJoinService {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn do_service(&mut self, message: &mut Message) -> ServiceResult<()> {
        let (Some(pool), Some(executor)) = (self.pool.as_ref(), self.executor.as_ref()) else {
            return Err(self.unavailable());
        };

        let fragments: Vec<Message> = message
            .payload()
            .split(self.separator.as_str())
            .map(|part| message.fragment(part))
            .collect();

        let mut handles = Vec::with_capacity(fragments.len());
        for mut fragment in fragments {
            let pool = Arc::clone(pool);
            handles.push(executor.submit(move || -> ServiceResult<Message> {
                let mut worker = pool.checkout()?;
                worker.do_service(&mut fragment)?;
                Ok(fragment)
            })?);
        }

        // Wait for every fragment before reporting, so no task outlives this call
        let results: Vec<ServiceResult<Message>> = handles
            .into_iter()
            .map(|handle| handle.join().map_err(ServiceError::from).and_then(|r| r))
            .collect();
        let processed = results.into_iter().collect::<ServiceResult<Vec<Message>>>()?;

        let mut payloads = Vec::with_capacity(processed.len());
        for fragment in &processed {
            for (key, value) in fragment.metadata() {
                if key != metadata::PARENT_MESSAGE_ID {
                    message.add_metadata(key.clone(), value.clone());
                }
            }
            payloads.push(fragment.payload());
        }
        let joined = payloads.join(self.separator.as_str());
        message.set_payload(joined);
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.pool.as_ref().is_some_and(|pool| !pool.is_closed())
    }
}

impl std::fmt::Debug for SplitJoinService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitJoinService")
            .field("unique_id", &self.unique_id)
            .field("pool_size", &self.pool_size)
            .field("separator", &self.separator)
            .field("pool", &self.pool)
            .finish()
    }
}
