// Worker pool module
//
// Generic bounded object pool, the fixed thread executor that feeds it, and the
// service worker pool that ties a service prototype to both.

pub mod errors;
pub mod executor;
pub mod factory;
pub mod object_pool;
pub mod service_worker_pool;

// Re-export main types for convenient access
pub use errors::{PoolError, PoolResult};
pub use executor::{BoundedExecutor, TaskHandle};
pub use factory::PooledObjectFactory;
pub use object_pool::{BoundedObjectPool, ExhaustedAction, PoolConfig, PooledObject};
pub use service_worker_pool::{ServiceWorkerPool, Worker, WorkerFactory};
