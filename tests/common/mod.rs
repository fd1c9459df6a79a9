//! Shared test infrastructure for the integration suites

#![allow(dead_code)]

pub mod builders;
pub mod probes;
pub mod strategies;

pub use builders::*;
pub use probes::*;

use std::sync::atomic::{AtomicUsize, Ordering};

static NAME_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Unique identifier for test fixtures that share a process
pub fn unique_name(prefix: &str) -> String {
    let n = NAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{n}", std::process::id())
}
