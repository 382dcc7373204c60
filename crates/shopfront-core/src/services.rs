//! Composition root
//!
//! Built once at startup and passed explicitly to whatever needs navigation,
//! connection health or retries.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use shopfront_faults::{ClassifiedError, Fault};
use shopfront_health::{HealthMonitor, HealthStatus, HealthWatch, HttpProbe, Probe, RecoveryOutcome};
use shopfront_navigation::{NavigationGuard, NavigationMode, Router};
use shopfront_retry::RetryPolicy;

use crate::banner::RecoveryBanner;
use crate::config::Config;
use crate::Result;

pub struct Services<R, P> {
    config: Config,
    guard: NavigationGuard<R>,
    health: Arc<HealthMonitor<P>>,
    retry: RetryPolicy,
}

impl<R: Router> Services<R, HttpProbe> {
    /// Wire everything against the store endpoint named in `config`.
    pub fn from_config(config: Config, router: R) -> Result<Self> {
        let probe = HttpProbe::new(config.probe_endpoint()?, config.probe_timeout())?;
        tracing::info!(endpoint = %probe.endpoint(), "Health probe configured");
        Ok(Self::new(config, router, probe))
    }
}

impl<R: Router, P: Probe + 'static> Services<R, P> {
    pub fn new(config: Config, router: R, probe: P) -> Self {
        let guard = NavigationGuard::new(router, config.guard_policy());
        let health = Arc::new(HealthMonitor::new(probe, config.health_policy()));
        let retry = config.retry_policy();

        Self {
            config,
            guard,
            health,
            retry,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn guard(&self) -> &NavigationGuard<R> {
        &self.guard
    }

    pub fn health(&self) -> &Arc<HealthMonitor<P>> {
        &self.health
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Start tracking route events. Requires a running tokio runtime.
    pub fn listen(&self) {
        self.guard.listen();
    }

    /// Check connection health every configured interval until the
    /// returned watch is dropped.
    pub fn watch_health(&self) -> HealthWatch {
        HealthWatch::spawn(
            Arc::clone(&self.health),
            Duration::from_millis(self.config.health.interval_ms),
        )
    }

    pub async fn navigate_to(&self, path: impl Into<String>) -> Result<()> {
        self.guard.navigate_to(path, NavigationMode::Push).await?;
        Ok(())
    }

    pub async fn replace_to(&self, path: impl Into<String>) -> Result<()> {
        self.guard.replace_to(path).await?;
        Ok(())
    }

    pub fn back(&self) -> Result<()> {
        self.guard.back()?;
        Ok(())
    }

    pub fn reset_navigation(&self) {
        self.guard.reset_navigation();
    }

    pub fn health_status(&self) -> HealthStatus {
        self.health.status()
    }

    pub async fn force_check(&self) -> bool {
        self.health.force_check().await
    }

    pub fn reset_failures(&self) {
        self.health.reset_failures();
    }

    pub fn classify<F: Fault + ?Sized>(&self, fault: &F) -> ClassifiedError {
        ClassifiedError::from_fault(fault)
    }

    pub async fn attempt_recovery(&self) -> RecoveryOutcome {
        shopfront_health::attempt_recovery(&self.health).await
    }

    /// Banner for an error surfaced to the user.
    pub fn banner<F: Fault + ?Sized>(&self, fault: &F) -> RecoveryBanner {
        tracing::error!(error = %fault.message(), "Showing recovery banner");
        RecoveryBanner::new(fault)
    }

    /// Retry an idempotent operation with the configured policy.
    pub async fn with_retry<T, E, F, Fut>(&self, operation: F) -> std::result::Result<T, E>
    where
        E: Fault,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        shopfront_retry::with_retry(&self.retry, operation).await
    }

    /// Stop listening for route events and clear navigation state.
    pub fn shutdown(&self) {
        self.guard.teardown();
    }
}
