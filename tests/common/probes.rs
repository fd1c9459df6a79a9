//! Instrumented services for observing worker pools from the outside.
//!
//! A [`ProbePrototype`] hands out [`ProbeService`] instances that report into one
//! shared [`ProbeCounters`], so a test can see how many services were created,
//! initialised and closed, and how many ran at the same time.

use adapter_runtime::lifecycle::{component_error, ComponentLifecycle, LifecycleResult};
use adapter_runtime::runtime::RuntimeVersionControl;
use adapter_runtime::service::{Service, ServicePrototype, ServiceResult};
use adapter_runtime::config::ConfigResult;
use adapter_runtime::Message;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ProbeCounters {
    pub created: AtomicUsize,
    pub initialised: AtomicUsize,
    pub closed: AtomicUsize,
    pub running: AtomicUsize,
    pub peak: AtomicUsize,
    pub processed: AtomicUsize,
}

impl ProbeCounters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn initialised(&self) -> usize {
        self.initialised.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Services initialised and not yet closed
    pub fn live(&self) -> usize {
        self.initialised() - self.closed()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }
}

/// Prototype producing instrumented services
#[derive(Debug, Clone)]
pub struct ProbePrototype {
    pub counters: Arc<ProbeCounters>,
    /// Services created at or after this index fail to initialise
    pub fail_init_from: Option<usize>,
    /// Time spent inside every `do_service` call
    pub work: Duration,
}

impl ProbePrototype {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(ProbeCounters::default()),
            fail_init_from: None,
            work: Duration::ZERO,
        }
    }

    pub fn failing_init_from(mut self, index: usize) -> Self {
        self.fail_init_from = Some(index);
        self
    }

    pub fn with_work(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    pub fn counters(&self) -> Arc<ProbeCounters> {
        Arc::clone(&self.counters)
    }
}

impl ServicePrototype for ProbePrototype {
    fn create_service(&self) -> ServiceResult<Box<dyn Service>> {
        let index = self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ProbeService {
            unique_id: format!("probe-{index}"),
            counters: Arc::clone(&self.counters),
            fail_init: self.fail_init_from.is_some_and(|from| index >= from),
            work: self.work,
        }))
    }

    fn describe(&self) -> String {
        "probe".to_string()
    }
}

/// Upper-cases the payload and records every lifecycle call
pub struct ProbeService {
    unique_id: String,
    counters: Arc<ProbeCounters>,
    fail_init: bool,
    work: Duration,
}

impl ComponentLifecycle for ProbeService {
    fn init(&mut self) -> LifecycleResult<()> {
        if self.fail_init {
            return Err(component_error(format!("{} refused to initialise", self.unique_id)));
        }
        self.counters.initialised.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> LifecycleResult<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Service for ProbeService {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn do_service(&mut self, message: &mut Message) -> ServiceResult<()> {
        let running = self.counters.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(running, Ordering::SeqCst);
        if !self.work.is_zero() {
            thread::sleep(self.work);
        }
        let upper = message.payload().to_uppercase();
        message.set_payload(upper);
        message.add_metadata(format!("seen-by-{}", self.unique_id), "yes");
        self.counters.processed.fetch_add(1, Ordering::SeqCst);
        self.counters.running.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Version control that only counts updates
#[derive(Debug, Clone, Default)]
pub struct RecordingVersionControl {
    pub updates: Arc<AtomicUsize>,
}

impl RuntimeVersionControl for RecordingVersionControl {
    fn implementation_name(&self) -> &str {
        "recording"
    }

    fn update(&self) -> ConfigResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
