//! Scripted router for tests

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use shopfront_faults::Failure;

use crate::request::NavigationMode;
use crate::router::{RouteEvent, Router};

const DEFAULT_LATENCY: Duration = Duration::from_millis(50);

/// Outcome of one scripted transition.
#[derive(Debug, Clone)]
pub enum Step {
    Succeed,
    Fail(Failure),
    /// Never settles
    Hang,
}

struct Script {
    latency: Duration,
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(NavigationMode, String)>>,
    back_failure: Mutex<Option<Failure>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    events: broadcast::Sender<RouteEvent>,
}

/// Replays queued steps; succeeds once the queue is empty. Every transition
/// emits `Started` and then `Completed` or `Failed` after the latency.
#[derive(Clone)]
pub struct ScriptedRouter {
    script: Arc<Script>,
}

impl ScriptedRouter {
    pub fn new() -> Self {
        Self::with_latency(DEFAULT_LATENCY)
    }

    pub fn with_latency(latency: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            script: Arc::new(Script {
                latency,
                steps: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
                back_failure: Mutex::new(None),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                events,
            }),
        }
    }

    pub fn then(&self, step: Step) -> &Self {
        self.script.steps.lock().push_back(step);
        self
    }

    pub fn fail_back(&self, failure: Failure) {
        *self.script.back_failure.lock() = Some(failure);
    }

    /// Publish an event as if a transition happened outside the guard.
    pub fn emit(&self, event: RouteEvent) {
        let _ = self.script.events.send(event);
    }

    pub fn calls(&self) -> Vec<(NavigationMode, String)> {
        self.script.calls.lock().clone()
    }

    /// Targets of push and replace transitions, in call order.
    pub fn paths(&self) -> Vec<String> {
        self.script
            .calls
            .lock()
            .iter()
            .filter(|(mode, _)| *mode != NavigationMode::Back)
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// Highest number of transitions that were running at the same time.
    pub fn max_active(&self) -> usize {
        self.script.max_active.load(Ordering::SeqCst)
    }

    async fn run(&self, mode: NavigationMode, path: &str) -> Result<(), Failure> {
        self.script.calls.lock().push((mode, path.to_string()));
        let step = self.script.steps.lock().pop_front().unwrap_or(Step::Succeed);
        let _active = Active::enter(&self.script);

        self.emit(RouteEvent::Started {
            path: path.to_string(),
        });
        tokio::time::sleep(self.script.latency).await;

        match step {
            Step::Succeed => {
                self.emit(RouteEvent::Completed {
                    path: path.to_string(),
                });
                Ok(())
            }
            Step::Fail(error) => {
                self.emit(RouteEvent::Failed {
                    path: path.to_string(),
                    error: error.clone(),
                });
                Err(error)
            }
            Step::Hang => std::future::pending().await,
        }
    }
}

impl Default for ScriptedRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for ScriptedRouter {
    fn push<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<(), Failure>> {
        Box::pin(self.run(NavigationMode::Push, path))
    }

    fn replace<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<(), Failure>> {
        Box::pin(self.run(NavigationMode::Replace, path))
    }

    fn back(&self) -> Result<(), Failure> {
        self.script
            .calls
            .lock()
            .push((NavigationMode::Back, String::new()));
        match self.script.back_failure.lock().take() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn events(&self) -> broadcast::Receiver<RouteEvent> {
        self.script.events.subscribe()
    }
}

/// Counts a running transition until dropped.
struct Active<'a> {
    script: &'a Script,
}

impl<'a> Active<'a> {
    fn enter(script: &'a Script) -> Self {
        let now = script.active.fetch_add(1, Ordering::SeqCst) + 1;
        script.max_active.fetch_max(now, Ordering::SeqCst);
        Self { script }
    }
}

impl Drop for Active<'_> {
    fn drop(&mut self) {
        self.script.active.fetch_sub(1, Ordering::SeqCst);
    }
}
