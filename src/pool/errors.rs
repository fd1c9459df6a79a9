use thiserror::Error;

/// Errors raised by object pools and executors
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Pool {pool} is closed")]
    Closed { pool: String },

    #[error("Pool {pool} is exhausted ({capacity} objects in use)")]
    Exhausted { pool: String, capacity: usize },

    #[error("Timed out after {waited_ms}ms waiting for an idle object in pool {pool}")]
    Timeout { pool: String, waited_ms: u64 },

    #[error("Failed to create pooled object: {0}")]
    Creation(String),

    #[error("Failed to activate pooled object: {0}")]
    Activation(String),

    #[error("Failed to passivate pooled object: {0}")]
    Passivation(String),

    #[error("Warmup of pool {pool} failed after {created} of {requested} objects: {reason}")]
    Warmup {
        pool: String,
        created: usize,
        requested: usize,
        reason: String,
    },

    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("Executor {executor} is shut down")]
    ExecutorShutdown { executor: String },

    #[error("Task did not complete: {0}")]
    TaskAborted(String),

    #[error("Failed to spawn executor thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result type alias for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
