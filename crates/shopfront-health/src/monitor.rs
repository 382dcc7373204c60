//! Health monitor
//!
//! One instance per application, created at startup and shared by `Arc`.
//! The throttle is advisory: two checks racing inside the same window may
//! both probe, which is harmless.

use chrono::Utc;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::time::Instant;

use shopfront_faults::Failure;

use crate::status::{apply_probe, HealthPolicy, HealthState, HealthStatus};

/// A single cheap read against the remote dependency, used only for liveness.
pub trait Probe: Send + Sync {
    fn probe(&self) -> BoxFuture<'_, Result<(), Failure>>;
}

impl<T: Probe + ?Sized> Probe for std::sync::Arc<T> {
    fn probe(&self) -> BoxFuture<'_, Result<(), Failure>> {
        (**self).probe()
    }
}

struct Tracker {
    status: HealthStatus,
    /// When the most recent probe was issued
    last_probe: Option<Instant>,
}

pub struct HealthMonitor<P> {
    probe: P,
    policy: HealthPolicy,
    tracker: Mutex<Tracker>,
}

impl<P: Probe> HealthMonitor<P> {
    pub fn new(probe: P, policy: HealthPolicy) -> Self {
        Self {
            probe,
            policy,
            tracker: Mutex::new(Tracker {
                status: HealthStatus::initial(),
                last_probe: None,
            }),
        }
    }

    /// Probe unless the previous probe is younger than `check_interval`,
    /// in which case the last known answer is returned.
    pub async fn check_health(&self) -> bool {
        {
            let tracker = self.tracker.lock();
            if let Some(last) = tracker.last_probe {
                if last.elapsed() < self.policy.check_interval {
                    return tracker.status.healthy;
                }
            }
        }

        self.run_probe().await
    }

    /// Probe now, ignoring the throttle.
    pub async fn force_check(&self) -> bool {
        self.run_probe().await
    }

    pub fn status(&self) -> HealthStatus {
        self.tracker.lock().status.clone()
    }

    pub fn state(&self) -> HealthState {
        self.tracker.lock().status.state(&self.policy)
    }

    /// Explicit recovery: forget past failures and report healthy.
    pub fn reset_failures(&self) {
        let mut tracker = self.tracker.lock();
        tracker.status.consecutive_failures = 0;
        tracker.status.healthy = true;
        tracker.status.last_error = None;
        tracing::info!("Health failures reset");
    }

    pub fn policy(&self) -> &HealthPolicy {
        &self.policy
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    async fn run_probe(&self) -> bool {
        let issued = Instant::now();
        let outcome = self.probe.probe().await;

        let mut tracker = self.tracker.lock();
        let was_healthy = tracker.status.healthy;
        tracker.last_probe = Some(issued);
        tracker.status = apply_probe(
            &tracker.status,
            outcome.as_ref().map(|_| ()),
            &self.policy,
            Utc::now(),
        );

        match (was_healthy, tracker.status.healthy) {
            (false, true) => tracing::info!("Document store connection recovered"),
            (true, false) => tracing::error!(
                consecutive_failures = tracker.status.consecutive_failures,
                "Document store marked unhealthy"
            ),
            _ => {}
        }

        tracker.status.healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProbe;
    use std::time::Duration;

    fn monitor(probe: ScriptedProbe) -> HealthMonitor<ScriptedProbe> {
        HealthMonitor::new(probe, HealthPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_hysteresis_over_forced_checks() {
        let probe = ScriptedProbe::new();
        for _ in 0..3 {
            probe.push_failure(Failure::new("Failed to get document because the client is offline."));
        }
        probe.push_success();
        let monitor = monitor(probe.clone());

        assert!(monitor.force_check().await);
        assert!(monitor.force_check().await);
        assert_eq!(monitor.state(), HealthState::Degraded(2));

        assert!(!monitor.force_check().await);
        assert_eq!(monitor.status().consecutive_failures, 3);
        assert_eq!(monitor.state(), HealthState::Unhealthy);

        assert!(monitor.force_check().await);
        assert_eq!(monitor.status().consecutive_failures, 0);
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_is_throttled() {
        let probe = ScriptedProbe::new();
        let monitor = monitor(probe.clone());

        assert!(monitor.check_health().await);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(monitor.check_health().await);
        assert_eq!(probe.calls(), 1);

        tokio::time::advance(Duration::from_secs(26)).await;
        assert!(monitor.check_health().await);
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_check_returns_cached_status() {
        let probe = ScriptedProbe::new();
        for _ in 0..3 {
            probe.push_failure(Failure::new("net::ERR_BLOCKED_BY_CLIENT"));
        }
        let monitor = monitor(probe.clone());

        for _ in 0..3 {
            monitor.force_check().await;
        }
        assert!(!monitor.check_health().await);
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_check_bypasses_throttle() {
        let probe = ScriptedProbe::new();
        let monitor = monitor(probe.clone());

        monitor.check_health().await;
        monitor.force_check().await;
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_failures() {
        let probe = ScriptedProbe::new();
        for _ in 0..3 {
            probe.push_failure(Failure::with_code("unavailable", "unavailable"));
        }
        let monitor = monitor(probe);

        for _ in 0..3 {
            monitor.force_check().await;
        }
        assert!(!monitor.status().healthy);

        monitor.reset_failures();
        let status = monitor.status();
        assert!(status.healthy);
        assert_eq!(status.consecutive_failures, 0);
        assert!(status.last_checked_at.is_some());
    }
}
