//! The transition primitive the guard drives

use futures_util::future::BoxFuture;
use tokio::sync::broadcast;

use shopfront_faults::Failure;

/// Route lifecycle events emitted by the router for every transition,
/// including ones the guard did not start (link clicks, browser buttons).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteEvent {
    Started { path: String },
    Completed { path: String },
    Failed { path: String, error: Failure },
}

impl RouteEvent {
    pub fn path(&self) -> &str {
        match self {
            RouteEvent::Started { path }
            | RouteEvent::Completed { path }
            | RouteEvent::Failed { path, .. } => path,
        }
    }
}

pub trait Router: Send + Sync + 'static {
    fn push<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<(), Failure>>;

    fn replace<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<(), Failure>>;

    /// Fire-and-forget; completion is only visible through events.
    fn back(&self) -> Result<(), Failure>;

    fn events(&self) -> broadcast::Receiver<RouteEvent>;
}
