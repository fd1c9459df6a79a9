//! Fixed-size thread pool used to fan work out to pooled workers.

use super::errors::{PoolError, PoolResult};
use crossbeam::channel::{self, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Bounded executor backed by `threads` named OS threads
///
/// Tasks are queued on an unbounded channel; at most `threads` run at once.
pub struct BoundedExecutor {
    name: String,
    threads: usize,
    sender: Option<Sender<Job>>,
    receiver: Receiver<Job>,
    workers: Vec<JoinHandle<()>>,
    discard: Arc<AtomicBool>,
}

impl BoundedExecutor {
    /// Spawn the worker threads
    pub fn new(name: impl Into<String>, threads: usize) -> PoolResult<Self> {
        let name = name.into();
        if threads == 0 {
            return Err(PoolError::InvalidConfig(format!(
                "executor {name} needs at least one thread"
            )));
        }

        let (sender, receiver) = channel::unbounded::<Job>();
        let discard = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(threads);

        for index in 0..threads {
            let jobs = receiver.clone();
            let discard = Arc::clone(&discard);
            let thread_name = format!("{name}-{index}");
            let handle = thread::Builder::new()
                .name(thread_name.clone())
                .spawn(move || {
                    for job in jobs.iter() {
                        if discard.load(Ordering::Acquire) {
                            continue;
                        }
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            warn!(thread = %thread_name, "Executor task panicked");
                        }
                    }
                })?;
            workers.push(handle);
        }

        debug!(executor = %name, threads = threads, "Executor started");

        Ok(Self {
            name,
            threads,
            sender: Some(sender),
            receiver,
            workers,
            discard,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn is_shutdown(&self) -> bool {
        self.sender.is_none()
    }

    /// Queue a task; the returned handle yields its result
    pub fn submit<T, F>(&self, task: F) -> PoolResult<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| PoolError::ExecutorShutdown {
                executor: self.name.clone(),
            })?;

        let (result_tx, result_rx) = channel::bounded(1);
        sender
            .send(Box::new(move || {
                // Receiver may have been dropped by a caller that stopped waiting
                let _ = result_tx.send(task());
            }))
            .map_err(|_| PoolError::ExecutorShutdown {
                executor: self.name.clone(),
            })?;

        Ok(TaskHandle {
            executor: self.name.clone(),
            receiver: result_rx,
        })
    }

    /// Graceful shutdown with a bounded wait, then forced
    ///
    /// Queued tasks keep running until `timeout` elapses. After that any task still
    /// queued is discarded and threads still busy are detached. Returns `true` when
    /// every thread finished within the timeout.
    pub fn shutdown_quietly(&mut self, timeout: Duration) -> bool {
        let Some(sender) = self.sender.take() else {
            return true;
        };
        drop(sender);

        let deadline = Instant::now() + timeout;
        while !self.workers.iter().all(|handle| handle.is_finished()) {
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(SHUTDOWN_POLL_INTERVAL);
        }

        if self.workers.iter().all(|handle| handle.is_finished()) {
            for handle in self.workers.drain(..) {
                let _ = handle.join();
            }
            info!(executor = %self.name, "Executor shut down gracefully");
            return true;
        }

        self.discard.store(true, Ordering::Release);
        let discarded = self.receiver.try_iter().count();
        let detached = self.workers.len();
        self.workers.clear();
        warn!(
            executor = %self.name,
            timeout_ms = timeout.as_millis() as u64,
            discarded_tasks = discarded,
            detached_threads = detached,
            "Executor did not terminate in time, forcing shutdown"
        );
        false
    }
}

impl Drop for BoundedExecutor {
    fn drop(&mut self) {
        // Threads drain whatever is queued and exit on their own
        self.sender.take();
    }
}

impl std::fmt::Debug for BoundedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedExecutor")
            .field("name", &self.name)
            .field("threads", &self.threads)
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

/// Pending result of a submitted task
#[derive(Debug)]
pub struct TaskHandle<T> {
    executor: String,
    receiver: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes
    ///
    /// Fails when the task panicked or was discarded by a forced shutdown.
    pub fn join(self) -> PoolResult<T> {
        self.receiver.recv().map_err(|_| {
            PoolError::TaskAborted(format!(
                "task on executor {} panicked or was discarded",
                self.executor
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_rejects_zero_threads() {
        assert!(matches!(
            BoundedExecutor::new("none", 0),
            Err(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_submit_and_join() {
        let mut executor = BoundedExecutor::new("sum", 2).unwrap();
        let handles: Vec<_> = (0..10)
            .map(|i| executor.submit(move || i * 2).unwrap())
            .collect();
        let total: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 90);
        assert!(executor.shutdown_quietly(Duration::from_secs(1)));
    }

    #[test]
    fn test_never_exceeds_thread_count() {
        let mut executor = BoundedExecutor::new("bounded", 3).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                executor
                    .submit(move || {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        running.fetch_sub(1, Ordering::SeqCst);
                    })
                    .unwrap()
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3);
        executor.shutdown_quietly(Duration::from_secs(1));
    }

    #[test]
    fn test_panicking_task_reports_aborted() {
        let mut executor = BoundedExecutor::new("panics", 1).unwrap();
        let handle = executor.submit(|| -> u32 { panic!("boom") }).unwrap();
        assert!(matches!(handle.join(), Err(PoolError::TaskAborted(_))));

        // The thread survives the panic and keeps serving tasks
        let next = executor.submit(|| 7).unwrap();
        assert_eq!(next.join().unwrap(), 7);
        assert!(executor.shutdown_quietly(Duration::from_secs(1)));
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let mut executor = BoundedExecutor::new("closed", 1).unwrap();
        assert!(executor.shutdown_quietly(Duration::from_millis(100)));
        assert!(executor.shutdown_quietly(Duration::from_millis(100)));
        assert!(matches!(
            executor.submit(|| 1),
            Err(PoolError::ExecutorShutdown { .. })
        ));
    }

    #[test]
    fn test_forced_shutdown_discards_queued_tasks() {
        let mut executor = BoundedExecutor::new("slow", 1).unwrap();
        let (started_tx, started_rx) = channel::bounded(1);
        let blocker = executor
            .submit(move || {
                started_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(300));
            })
            .unwrap();
        let queued = executor.submit(|| 42).unwrap();
        started_rx.recv().unwrap();

        let graceful = executor.shutdown_quietly(Duration::from_millis(20));
        assert!(!graceful);
        assert!(matches!(queued.join(), Err(PoolError::TaskAborted(_))));
        blocker.join().unwrap();
    }
}
