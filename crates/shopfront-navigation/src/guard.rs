//! Navigation guard
//!
//! At most one transition runs at a time. Requests arriving meanwhile are
//! kept in a single pending slot (latest wins) and dispatched once the
//! current attempt settles. A fallback timer clears an attempt that never
//! settles on its own.

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use shopfront_faults::{classify, ErrorKind, Failure};

use crate::error::NavigationError;
use crate::request::{NavigationMode, NavigationRequest};
use crate::router::{RouteEvent, Router};
use crate::state::{Admission, GuardState, Origin, Settlement};
use crate::Result;

pub const DEFAULT_FALLBACK_RESET: Duration = Duration::from_millis(1500);
pub const DEFAULT_CANCEL_RETRY_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_BACK_SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Forced reset of an attempt that has not settled
    pub fallback_reset: Duration,
    /// Pause before retrying a cancelled transition
    pub cancel_retry_delay: Duration,
    /// How long a back navigation holds the guard without a route event
    pub back_settle: Duration,
    /// Retries of a cancelled transition before the error propagates
    pub cancel_retries: u32,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            fallback_reset: DEFAULT_FALLBACK_RESET,
            cancel_retry_delay: DEFAULT_CANCEL_RETRY_DELAY,
            back_settle: DEFAULT_BACK_SETTLE,
            cancel_retries: 1,
        }
    }
}

struct Shared<R> {
    router: R,
    policy: GuardPolicy,
    state: Mutex<GuardState>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<R> Drop for Shared<R> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
    }
}

/// How the current attempt ended, from the caller's side.
enum Settled {
    Current { dispatched: bool },
    Stale,
}

/// Cheap to clone; clones share one state machine.
pub struct NavigationGuard<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for NavigationGuard<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: Router> NavigationGuard<R> {
    pub fn new(router: R, policy: GuardPolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                router,
                policy,
                state: Mutex::new(GuardState::new()),
                listener: Mutex::new(None),
            }),
        }
    }

    pub fn router(&self) -> &R {
        &self.shared.router
    }

    pub fn policy(&self) -> &GuardPolicy {
        &self.shared.policy
    }

    pub fn is_in_flight(&self) -> bool {
        self.shared.state.lock().is_in_flight()
    }

    pub fn pending(&self) -> Option<NavigationRequest> {
        self.shared.state.lock().pending().cloned()
    }

    pub async fn navigate_to(&self, path: impl Into<String>, mode: NavigationMode) -> Result<()> {
        self.navigate(NavigationRequest::new(path, mode)).await
    }

    pub async fn replace_to(&self, path: impl Into<String>) -> Result<()> {
        self.navigate(NavigationRequest::replace(path)).await
    }

    /// Run `request`, or queue it if a transition is in flight.
    ///
    /// Returns `Ok` when the transition succeeded, was queued, was superseded
    /// by a queued request, or was abandoned by the fallback timer.
    ///
    /// A `Back` request is never queued: it goes through [`Self::back`] and
    /// is skipped while a transition is in flight.
    pub async fn navigate(&self, request: NavigationRequest) -> Result<()> {
        if request.mode == NavigationMode::Back {
            return self.back();
        }

        let Some((generation, abandon)) = self.admit(&request) else {
            return Ok(());
        };
        let mut retries_left = self.shared.policy.cancel_retries;

        loop {
            let outcome = tokio::select! {
                outcome = self.transition(&request) => outcome,
                _ = abandon.notified() => {
                    tracing::warn!(request = %request, "Stopped waiting on unsettled transition");
                    return Ok(());
                }
            };

            let failure = match outcome {
                Ok(()) => {
                    self.settle(generation);
                    return Ok(());
                }
                Err(failure) => failure,
            };

            let kind = classify(&failure);
            if kind != ErrorKind::NavigationCancelled {
                tracing::error!(request = %request, kind = %kind, error = %failure, "Navigation failed");
                self.settle(generation);
                return Err(NavigationError::Transition {
                    request: request.to_string(),
                    kind,
                    source: failure,
                });
            }

            tracing::warn!(request = %request, error = %failure, "Navigation cancelled");

            // Still in flight through the wait; a request queued meanwhile
            // replaces the retry.
            if retries_left > 0 && self.hold_for_retry(generation) {
                retries_left -= 1;
                tokio::select! {
                    _ = tokio::time::sleep(self.shared.policy.cancel_retry_delay) => {}
                    _ = abandon.notified() => {
                        tracing::warn!(request = %request, "Stopped waiting on unsettled transition");
                        return Ok(());
                    }
                }

                if self.resume_retry(generation) {
                    tracing::info!(request = %request, "Retrying cancelled navigation");
                    continue;
                }
                tracing::debug!(request = %request, "Cancelled navigation superseded");
                return Ok(());
            }

            match self.settle(generation) {
                Settled::Stale | Settled::Current { dispatched: true } => {
                    tracing::debug!(request = %request, "Cancelled navigation superseded");
                    return Ok(());
                }
                Settled::Current { dispatched: false } => {
                    return Err(NavigationError::Transition {
                        request: request.to_string(),
                        kind,
                        source: failure,
                    });
                }
            }
        }
    }

    /// Go one history entry back. Skipped while a transition is in flight.
    ///
    /// The router reports no completion for back navigation, so the guard
    /// stays in flight until a route event arrives or `back_settle` elapses.
    pub fn back(&self) -> Result<()> {
        let generation = {
            let mut state = self.shared.state.lock();
            if state.is_in_flight() {
                tracing::info!("Navigation in progress, skipping back navigation");
                return Ok(());
            }

            match state.admit(NavigationRequest::back(), Origin::Guard) {
                Admission::Admitted { generation, .. } => {
                    state.arm_fallback(self.spawn_fallback(generation, self.shared.policy.back_settle));
                    generation
                }
                Admission::Queued { .. } => return Ok(()),
            }
        };

        match self.shared.router.back() {
            Ok(()) => {
                tracing::debug!("Back navigation started");
                Ok(())
            }
            Err(failure) => {
                tracing::error!(error = %failure, "Back navigation failed");
                self.settle(generation);
                Err(NavigationError::Back(failure))
            }
        }
    }

    /// Feed a router lifecycle event into the state machine.
    pub fn observe(&self, event: &RouteEvent) {
        match event {
            RouteEvent::Started { path } => {
                let mut state = self.shared.state.lock();
                if state.take_echo(path) || state.is_in_flight() {
                    return;
                }

                if let Admission::Admitted { generation, .. } =
                    state.admit(NavigationRequest::push(path.clone()), Origin::External)
                {
                    state.arm_fallback(self.spawn_fallback(generation, self.shared.policy.fallback_reset));
                    tracing::debug!(path = %path, "Tracking route change started outside the guard");
                }
            }
            RouteEvent::Completed { path } => {
                if let Some(generation) = self.current_settled_by(path, false) {
                    tracing::debug!(path = %path, "Route change completed");
                    self.settle(generation);
                }
            }
            RouteEvent::Failed { path, error } => {
                let kind = classify(error);
                if kind == ErrorKind::NavigationCancelled {
                    tracing::warn!(path = %path, "Route change cancelled");
                } else {
                    tracing::error!(path = %path, kind = %kind, error = %error, "Route change error");
                }

                if let Some(generation) = self.current_settled_by(path, true) {
                    self.settle(generation);
                }
            }
        }
    }

    /// Subscribe to the router's events for the lifetime of this guard.
    /// Calling it again replaces the previous subscription.
    pub fn listen(&self) {
        let mut events = self.shared.router.events();
        let shared = Arc::downgrade(&self.shared);

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => match Self::upgrade(&shared) {
                        Some(guard) => guard.observe(&event),
                        None => break,
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Route events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        if let Some(previous) = self.shared.listener.lock().replace(task) {
            previous.abort();
        }
    }

    /// Force the guard back to idle and drop any queued request.
    pub fn reset_navigation(&self) {
        let (attempt, pending) = self.shared.state.lock().reset();
        tracing::info!(
            was_in_flight = attempt.is_some(),
            dropped = pending.as_ref().map(|r| r.target_path.as_str()),
            "Navigation state reset"
        );
    }

    /// Reset and stop listening to route events.
    pub fn teardown(&self) {
        self.reset_navigation();
        if let Some(listener) = self.shared.listener.lock().take() {
            listener.abort();
        }
    }

    fn admit(&self, request: &NavigationRequest) -> Option<(u64, Arc<tokio::sync::Notify>)> {
        let mut state = self.shared.state.lock();
        match state.admit(request.clone(), Origin::Guard) {
            Admission::Admitted { generation, abandon } => {
                state.arm_fallback(self.spawn_fallback(generation, self.shared.policy.fallback_reset));
                tracing::debug!(request = %request, generation, "Navigation started");
                Some((generation, abandon))
            }
            Admission::Queued { superseded } => {
                tracing::info!(
                    queued = %request,
                    superseded = superseded.as_ref().map(|r| r.target_path.as_str()),
                    "Navigation in progress, queuing request"
                );
                None
            }
        }
    }

    /// Keep the attempt in flight for a cancellation retry. False when the
    /// attempt is no longer current or a queued request should run instead.
    fn hold_for_retry(&self, generation: u64) -> bool {
        let mut state = self.shared.state.lock();
        match state.current() {
            Some(attempt) if attempt.generation == generation => {}
            _ => return false,
        }
        if state.pending().is_some() {
            return false;
        }

        let after = self.shared.policy.cancel_retry_delay + self.shared.policy.fallback_reset;
        state.arm_fallback(self.spawn_fallback(generation, after));
        true
    }

    /// After the retry wait: true to run the transition again, false when the
    /// attempt was reset or a request queued during the wait took over.
    fn resume_retry(&self, generation: u64) -> bool {
        let superseded = {
            let state = self.shared.state.lock();
            match state.current() {
                Some(attempt) if attempt.generation == generation => state.pending().is_some(),
                _ => return false,
            }
        };

        if superseded {
            self.settle(generation);
            return false;
        }
        true
    }

    fn transition<'a>(&'a self, request: &'a NavigationRequest) -> BoxFuture<'a, std::result::Result<(), Failure>> {
        match request.mode {
            NavigationMode::Replace => self.shared.router.replace(&request.target_path),
            _ => self.shared.router.push(&request.target_path),
        }
    }

    fn current_settled_by(&self, path: &str, failed: bool) -> Option<u64> {
        self.shared
            .state
            .lock()
            .current()
            .filter(|attempt| attempt.settled_by(path, failed))
            .map(|attempt| attempt.generation)
    }

    /// Settle the attempt and dispatch whatever was queued behind it.
    fn settle(&self, generation: u64) -> Settled {
        let settlement = self.shared.state.lock().settle(generation);
        match settlement {
            Settlement::Settled { pending, .. } => {
                let dispatched = pending.is_some();
                if let Some(request) = pending {
                    self.dispatch(request);
                }
                Settled::Current { dispatched }
            }
            Settlement::Stale => {
                tracing::trace!(generation, "Ignoring outcome of a settled attempt");
                Settled::Stale
            }
        }
    }

    fn dispatch(&self, request: NavigationRequest) {
        tracing::debug!(request = %request, "Dispatching queued navigation");
        let guard = self.clone();
        tokio::spawn(async move {
            if let Err(e) = guard.navigate(request).await {
                tracing::error!(error = %e, "Queued navigation failed");
            }
        });
    }

    fn spawn_fallback(&self, generation: u64, after: Duration) -> JoinHandle<()> {
        let shared = Arc::downgrade(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(guard) = Self::upgrade(&shared) {
                guard.on_fallback_expired(generation);
            }
        })
    }

    fn on_fallback_expired(&self, generation: u64) {
        let settlement = {
            let mut state = self.shared.state.lock();
            match state.current() {
                Some(attempt) if attempt.generation == generation => attempt.abandon.notify_one(),
                _ => return,
            }
            state.release_fallback();
            state.settle(generation)
        };

        let Settlement::Settled { attempt, pending } = settlement else {
            return;
        };

        if attempt.request.mode == NavigationMode::Back {
            tracing::debug!("Back navigation settled");
        } else {
            tracing::warn!(
                request = %attempt.request,
                after_ms = self.shared.policy.fallback_reset.as_millis() as u64,
                "Transition did not settle, forcing reset"
            );
        }

        if let Some(request) = pending {
            self.dispatch(request);
        }
    }

    fn upgrade(shared: &Weak<Shared<R>>) -> Option<Self> {
        shared.upgrade().map(|shared| Self { shared })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedRouter, Step};

    fn cancelled() -> Failure {
        Failure::new("Navigation cancelled from \"/a\" to \"/b\" with a new navigation.")
    }

    fn guard(router: &ScriptedRouter) -> NavigationGuard<ScriptedRouter> {
        NavigationGuard::new(router.clone(), GuardPolicy::default())
    }

    fn settle_a_little() -> tokio::time::Sleep {
        tokio::time::sleep(Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_transition_at_a_time() {
        let router = ScriptedRouter::new();
        let guard = guard(&router);

        let g = guard.clone();
        let first = tokio::spawn(async move { g.navigate_to("/a", NavigationMode::Push).await });
        settle_a_little().await;

        assert!(guard.is_in_flight());
        guard.navigate_to("/b", NavigationMode::Push).await.unwrap();
        guard.navigate_to("/c", NavigationMode::Push).await.unwrap();
        assert_eq!(guard.pending().unwrap().target_path, "/c");

        first.await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(router.paths(), vec!["/a", "/c"]);
        assert_eq!(router.max_active(), 1);
        assert!(!guard.is_in_flight());
        assert!(guard.pending().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_request_runs_after_success() {
        let router = ScriptedRouter::new();
        let guard = guard(&router);
        guard.listen();

        let g = guard.clone();
        let first = tokio::spawn(async move { g.navigate_to("/a", NavigationMode::Push).await });
        settle_a_little().await;
        guard.navigate_to("/b", NavigationMode::Push).await.unwrap();

        first.await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(router.paths(), vec!["/a", "/b"]);
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_clears_unsettled_transition() {
        let router = ScriptedRouter::new();
        router.then(Step::Hang);
        let guard = guard(&router);

        let g = guard.clone();
        let stuck = tokio::spawn(async move { g.navigate_to("/stuck", NavigationMode::Push).await });
        settle_a_little().await;
        assert!(guard.is_in_flight());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!guard.is_in_flight());
        assert!(stuck.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_dispatches_pending() {
        let router = ScriptedRouter::new();
        router.then(Step::Hang);
        let guard = guard(&router);

        let g = guard.clone();
        tokio::spawn(async move { g.navigate_to("/stuck", NavigationMode::Push).await });
        settle_a_little().await;
        guard.navigate_to("/next", NavigationMode::Push).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(router.paths(), vec!["/stuck", "/next"]);
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_transition_retried_once() {
        let router = ScriptedRouter::new();
        router.then(Step::Fail(cancelled())).then(Step::Succeed);
        let guard = guard(&router);

        let started = tokio::time::Instant::now();
        guard.navigate_to("/x", NavigationMode::Push).await.unwrap();

        assert_eq!(router.paths(), vec!["/x", "/x"]);
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_cancellation_propagates() {
        let router = ScriptedRouter::new();
        router.then(Step::Fail(cancelled())).then(Step::Fail(cancelled()));
        let guard = guard(&router);

        let err = guard.navigate_to("/x", NavigationMode::Push).await.unwrap_err();
        match err {
            NavigationError::Transition { kind, .. } => assert_eq!(kind, ErrorKind::NavigationCancelled),
            other => panic!("Expected Transition, got {:?}", other),
        }
        assert_eq!(router.paths(), vec!["/x", "/x"]);
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_superseded_by_pending() {
        let router = ScriptedRouter::new();
        router.then(Step::Fail(cancelled()));
        let guard = guard(&router);

        let g = guard.clone();
        let first = tokio::spawn(async move { g.navigate_to("/x", NavigationMode::Push).await });
        settle_a_little().await;
        guard.navigate_to("/y", NavigationMode::Push).await.unwrap();

        assert!(first.await.unwrap().is_ok());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(router.paths(), vec!["/x", "/y"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_during_cancel_wait_wins() {
        let router = ScriptedRouter::new();
        router.then(Step::Fail(Failure::new("Route Cancelled")));
        let guard = guard(&router);

        let g = guard.clone();
        let first = tokio::spawn(async move { g.navigate_to("/x", NavigationMode::Push).await });

        // /x fails at 50ms; the retry would start at 150ms
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(guard.is_in_flight());

        guard.navigate_to("/z", NavigationMode::Push).await.unwrap();
        assert_eq!(guard.pending().unwrap().target_path, "/z");

        assert!(first.await.unwrap().is_ok());
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(router.paths(), vec!["/x", "/z"]);
        assert_eq!(router.max_active(), 1);
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_request_not_queued() {
        let router = ScriptedRouter::new();
        router.then(Step::Hang);
        let guard = guard(&router);

        let g = guard.clone();
        tokio::spawn(async move { g.navigate_to("/stuck", NavigationMode::Push).await });
        settle_a_little().await;

        guard.navigate(NavigationRequest::back()).await.unwrap();
        assert!(guard.pending().is_none());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(router.calls().iter().all(|(mode, _)| *mode != NavigationMode::Back));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generic_error_propagates() {
        let router = ScriptedRouter::new();
        router.then(Step::Fail(Failure::new("Chunk failed to load")));
        let guard = guard(&router);

        let err = guard.navigate_to("/x", NavigationMode::Push).await.unwrap_err();
        assert!(matches!(
            err,
            NavigationError::Transition { kind: ErrorKind::Generic, .. }
        ));
        assert_eq!(err.failure().message, "Chunk failed to load");
        assert_eq!(router.paths(), vec!["/x"]);
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_still_dispatches_pending() {
        let router = ScriptedRouter::new();
        router.then(Step::Fail(Failure::new("Chunk failed to load")));
        let guard = guard(&router);

        let g = guard.clone();
        let first = tokio::spawn(async move { g.navigate_to("/x", NavigationMode::Push).await });
        settle_a_little().await;
        guard.navigate_to("/y", NavigationMode::Push).await.unwrap();

        assert!(first.await.unwrap().is_err());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(router.paths(), vec!["/x", "/y"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_mode() {
        let router = ScriptedRouter::new();
        let guard = guard(&router);

        guard.replace_to("/login").await.unwrap();
        assert_eq!(router.calls(), vec![(NavigationMode::Replace, "/login".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_skipped_while_in_flight() {
        let router = ScriptedRouter::new();
        router.then(Step::Hang);
        let guard = guard(&router);

        let g = guard.clone();
        tokio::spawn(async move { g.navigate_to("/stuck", NavigationMode::Push).await });
        settle_a_little().await;

        guard.back().unwrap();
        assert!(router.calls().iter().all(|(mode, _)| *mode != NavigationMode::Back));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_holds_guard_until_settled() {
        let router = ScriptedRouter::new();
        let guard = guard(&router);

        guard.navigate(NavigationRequest::back()).await.unwrap();
        assert!(guard.is_in_flight());
        assert_eq!(router.calls(), vec![(NavigationMode::Back, String::new())]);

        guard.navigate_to("/after", NavigationMode::Push).await.unwrap();
        assert!(router.paths().is_empty());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(router.paths(), vec!["/after"]);
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_failure_releases_guard() {
        let router = ScriptedRouter::new();
        router.fail_back(Failure::new("No history entry"));
        let guard = guard(&router);

        let err = guard.back().unwrap_err();
        assert!(matches!(err, NavigationError::Back(_)));
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_drops_pending() {
        let router = ScriptedRouter::new();
        router.then(Step::Hang);
        let guard = guard(&router);

        let g = guard.clone();
        tokio::spawn(async move { g.navigate_to("/stuck", NavigationMode::Push).await });
        settle_a_little().await;
        guard.navigate_to("/dropped", NavigationMode::Push).await.unwrap();

        guard.reset_navigation();
        assert!(!guard.is_in_flight());
        assert!(guard.pending().is_none());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(router.paths(), vec!["/stuck"]);

        guard.navigate_to("/fresh", NavigationMode::Push).await.unwrap();
        assert_eq!(router.paths(), vec!["/stuck", "/fresh"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_failure_leaves_newer_attempt() {
        let router = ScriptedRouter::new();
        router.then(Step::Fail(Failure::new("Chunk failed to load")));
        let guard = guard(&router);

        let g = guard.clone();
        let stale = tokio::spawn(async move { g.navigate_to("/x", NavigationMode::Push).await });
        settle_a_little().await;
        guard.reset_navigation();

        let g = guard.clone();
        let fresh = tokio::spawn(async move { g.navigate_to("/y", NavigationMode::Push).await });
        tokio::time::sleep(Duration::from_millis(45)).await;

        // /x has failed by now; /y is still running
        assert!(stale.await.unwrap().is_err());
        assert!(guard.is_in_flight());

        fresh.await.unwrap().unwrap();
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_transition_tracked() {
        let router = ScriptedRouter::new();
        let guard = guard(&router);
        guard.listen();

        router.emit(RouteEvent::Started { path: "/shop".into() });
        settle_a_little().await;
        assert!(guard.is_in_flight());

        guard.navigate_to("/cart", NavigationMode::Push).await.unwrap();
        assert!(router.paths().is_empty());

        router.emit(RouteEvent::Completed { path: "/shop".into() });
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(router.paths(), vec!["/cart"]);
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_failure_settles() {
        let router = ScriptedRouter::new();
        let guard = guard(&router);

        guard.observe(&RouteEvent::Started { path: "/shop".into() });
        assert!(guard.is_in_flight());

        guard.observe(&RouteEvent::Failed {
            path: "/shop".into(),
            error: cancelled(),
        });
        assert!(!guard.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_stops_listening() {
        let router = ScriptedRouter::new();
        let guard = guard(&router);
        guard.listen();
        guard.teardown();

        router.emit(RouteEvent::Started { path: "/shop".into() });
        settle_a_little().await;
        assert!(!guard.is_in_flight());
    }
}
