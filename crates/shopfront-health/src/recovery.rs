//! Connection recovery behind the banner's "Try Recovery" button

use serde::Serialize;

use crate::monitor::{HealthMonitor, Probe};
use crate::status::HealthStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryOutcome {
    /// The last probe of the attempt succeeded
    pub recovered: bool,
    pub status: HealthStatus,
}

/// Force a probe; if it fails, clear the failure history and force one more.
pub async fn attempt_recovery<P: Probe>(monitor: &HealthMonitor<P>) -> RecoveryOutcome {
    monitor.force_check().await;
    if last_probe_succeeded(&monitor.status()) {
        tracing::info!("Connection recovered");
        return outcome(monitor);
    }

    monitor.reset_failures();
    monitor.force_check().await;

    let result = outcome(monitor);
    if result.recovered {
        tracing::info!("Connection recovered after reset");
    } else {
        tracing::error!(
            error = result.status.last_error.as_deref().unwrap_or_default(),
            "Connection recovery failed"
        );
    }
    result
}

fn last_probe_succeeded(status: &HealthStatus) -> bool {
    status.healthy && status.consecutive_failures == 0
}

fn outcome<P: Probe>(monitor: &HealthMonitor<P>) -> RecoveryOutcome {
    let status = monitor.status();
    RecoveryOutcome {
        recovered: last_probe_succeeded(&status),
        status,
    }
}
