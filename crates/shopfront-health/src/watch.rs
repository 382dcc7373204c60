//! Periodic health checking
//!
//! Runs `check_health` on an interval (first check immediately) and publishes
//! each result on a watch channel for the UI to render.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::monitor::{HealthMonitor, Probe};
use crate::status::HealthStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    /// True while a check is running
    pub checking: bool,
    pub status: HealthStatus,
}

/// Stops checking when dropped.
pub struct HealthWatch {
    task: JoinHandle<()>,
    reports: watch::Receiver<HealthReport>,
}

impl HealthWatch {
    pub fn spawn<P: Probe + 'static>(monitor: Arc<HealthMonitor<P>>, every: Duration) -> Self {
        let initial = HealthReport {
            healthy: monitor.status().healthy,
            checking: false,
            status: monitor.status(),
        };
        let (sender, reports) = watch::channel(initial);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                sender.send_modify(|report| report.checking = true);

                let healthy = monitor.check_health().await;
                let report = HealthReport {
                    healthy,
                    checking: false,
                    status: monitor.status(),
                };

                if sender.send(report).is_err() {
                    break;
                }
            }
        });

        Self { task, reports }
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthReport> {
        self.reports.clone()
    }

    pub fn latest(&self) -> HealthReport {
        self.reports.borrow().clone()
    }
}

impl Drop for HealthWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::HealthPolicy;
    use crate::testing::ScriptedProbe;
    use shopfront_faults::Failure;

    #[tokio::test(start_paused = true)]
    async fn test_checks_on_interval() {
        let probe = ScriptedProbe::new();
        let monitor = Arc::new(HealthMonitor::new(probe.clone(), HealthPolicy::default()));

        let watch = HealthWatch::spawn(Arc::clone(&monitor), Duration::from_secs(30));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(probe.calls(), 1);
        assert!(watch.latest().healthy);
        assert!(!watch.latest().checking);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(probe.calls(), 2);

        drop(watch);
        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_unhealthy_after_threshold() {
        let probe = ScriptedProbe::new();
        for _ in 0..3 {
            probe.push_failure(Failure::new("Could not reach Cloud Firestore backend."));
        }
        let monitor = Arc::new(HealthMonitor::new(probe, HealthPolicy::default()));

        let watch = HealthWatch::spawn(monitor, Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(61)).await;

        let report = watch.latest();
        assert!(!report.healthy);
        assert_eq!(report.status.consecutive_failures, 3);
    }
}
