//! Request tracking for monitoring outstanding HTTP requests.

use super::Progress;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Counter for a specific named request type.
#[derive(Debug, Default)]
struct RequestCounter {
    issued: AtomicU64,
    completed: AtomicU64,
}

/// Tracks outstanding requests and updates progress reporting.
///
/// Requests are tracked by service name (e.g. "GitHub", "OSV", "npm"), giving the
/// user a view of how far each stage of the analysis has progressed.
#[derive(Debug, Clone)]
pub struct RequestTracker {
    counters: Arc<Mutex<BTreeMap<&'static str, Arc<RequestCounter>>>>,
    progress: Arc<dyn Progress>,
}

impl RequestTracker {
    /// Create a new request tracker with the given progress reporter.
    #[must_use]
    pub fn new(progress: Arc<dyn Progress>) -> Self {
        Self {
            counters: Arc::new(Mutex::new(BTreeMap::new())),
            progress,
        }
    }

    fn get_counter(&self, name: &'static str) -> Arc<RequestCounter> {
        let mut counters = self.counters.lock().expect("lock poisoned");
        Arc::clone(counters.entry(name).or_default())
    }

    /// Mark that a new request has been issued for the given named category.
    pub fn add_request(&self, name: &'static str) {
        let counter = self.get_counter(name);
        let _ = counter.issued.fetch_add(1, Ordering::Relaxed);
        self.update_progress();
    }

    /// Mark that a request has completed for the given named category.
    pub fn complete_request(&self, name: &'static str) {
        let counter = self.get_counter(name);
        let _ = counter.completed.fetch_add(1, Ordering::Relaxed);
        self.update_progress();
    }

    /// Total number of requests issued so far across all categories.
    #[must_use]
    pub fn total_issued(&self) -> u64 {
        let counters = self.counters.lock().expect("lock poisoned");
        counters.values().map(|c| c.issued.load(Ordering::Relaxed)).sum()
    }

    /// Number of requests issued so far for one category.
    #[must_use]
    pub fn issued(&self, name: &str) -> u64 {
        let counters = self.counters.lock().expect("lock poisoned");
        counters.get(name).map_or(0, |c| c.issued.load(Ordering::Relaxed))
    }

    fn update_progress(&self) {
        let counters = self.counters.lock().expect("lock poisoned");

        let mut total_issued = 0u64;
        let mut total_completed = 0u64;
        let mut parts = Vec::with_capacity(counters.len());

        // BTreeMap keeps the categories sorted by name for a stable message
        for (name, counter) in counters.iter() {
            let issued = counter.issued.load(Ordering::Relaxed);
            let completed = counter.completed.load(Ordering::Relaxed);

            if issued > 0 {
                total_issued += issued;
                total_completed += completed;
                parts.push(format!("{completed}/{issued} {name}"));
            }
        }

        if total_issued > 0 {
            self.progress.set_counts(total_completed, total_issued, parts.join(", "));
        }
    }
}
