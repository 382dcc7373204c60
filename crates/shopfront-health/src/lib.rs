//! Shopfront Health
//!
//! Tracks whether the hosted document store is reachable.
//! ```text
//! Healthy
//!   ↓ probe failure
//! Degraded(n)      n < max_failures
//!   ↓ probe failure
//! Unhealthy        n >= max_failures
//! ```
//! Any successful probe (or an explicit reset) returns to `Healthy`.

mod error;
mod http;
mod monitor;
mod recovery;
mod status;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod watch;

pub use error::HealthError;
pub use http::HttpProbe;
pub use monitor::{HealthMonitor, Probe};
pub use recovery::{attempt_recovery, RecoveryOutcome};
pub use status::{apply_probe, HealthPolicy, HealthState, HealthStatus};
pub use watch::{HealthReport, HealthWatch};

pub type Result<T> = std::result::Result<T, HealthError>;
