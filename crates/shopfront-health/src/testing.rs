//! Scripted probe for tests

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use shopfront_faults::Failure;

use crate::monitor::Probe;

/// Replays queued outcomes; succeeds once the queue is empty.
#[derive(Clone, Default)]
pub struct ScriptedProbe {
    outcomes: Arc<Mutex<VecDeque<Result<(), Failure>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&self) {
        self.outcomes.lock().push_back(Ok(()));
    }

    pub fn push_failure(&self, failure: Failure) {
        self.outcomes.lock().push_back(Err(failure));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Probe for ScriptedProbe {
    fn probe(&self) -> BoxFuture<'_, Result<(), Failure>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcomes.lock().pop_front().unwrap_or(Ok(()));
        Box::pin(async move { outcome })
    }
}
