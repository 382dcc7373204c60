//! Health status and the transition applied after each probe

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use shopfront_faults::{classify, ErrorKind, Failure};

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_FAILURES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthPolicy {
    /// Minimum time between two probes issued by `check_health`
    pub check_interval: Duration,
    /// Consecutive failures before the connection is reported unhealthy
    pub max_failures: u32,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            max_failures: DEFAULT_MAX_FAILURES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    /// Message of the most recent failed probe, cleared on success
    pub last_error: Option<String>,
}

impl HealthStatus {
    /// Status before the first probe: optimistic.
    pub fn initial() -> Self {
        Self {
            healthy: true,
            last_checked_at: None,
            consecutive_failures: 0,
            last_error: None,
        }
    }

    pub fn state(&self, policy: &HealthPolicy) -> HealthState {
        if self.consecutive_failures == 0 {
            HealthState::Healthy
        } else if self.consecutive_failures < policy.max_failures.max(1) {
            HealthState::Degraded(self.consecutive_failures)
        } else {
            HealthState::Unhealthy
        }
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::initial()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    /// Failing, but still below the threshold
    Degraded(u32),
    Unhealthy,
}

/// Pure transition: the status after one probe outcome.
///
/// Blocked connections and other failures count the same way; only the log
/// wording differs.
pub fn apply_probe(
    previous: &HealthStatus,
    outcome: Result<(), &Failure>,
    policy: &HealthPolicy,
    now: DateTime<Utc>,
) -> HealthStatus {
    match outcome {
        Ok(()) => HealthStatus {
            healthy: true,
            last_checked_at: Some(now),
            consecutive_failures: 0,
            last_error: None,
        },
        Err(failure) => {
            let consecutive_failures = previous.consecutive_failures.saturating_add(1);
            let threshold = policy.max_failures.max(1);

            if classify(failure) == ErrorKind::BlockedConnection {
                tracing::warn!(
                    consecutive_failures,
                    error = %failure,
                    "Document store connection blocked by client (ad blocker, security extension)"
                );
            } else {
                tracing::warn!(
                    consecutive_failures,
                    error = %failure,
                    "Document store health check failed"
                );
            }

            HealthStatus {
                healthy: consecutive_failures < threshold,
                last_checked_at: Some(now),
                consecutive_failures,
                last_error: Some(failure.message.clone()),
            }
        }
    }
}
