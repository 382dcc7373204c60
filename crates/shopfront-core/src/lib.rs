//! Shopfront Core
//!
//! Configuration, logging and the `Services` root that wires the navigation
//! guard, the connection health monitor and the retry policy together.

mod banner;
mod config;
mod error;
mod services;

pub use banner::{BannerAction, BannerView, RecoveryBanner};
pub use config::{Config, HealthConfig, NavigationConfig, RetryConfig};
pub use error::CoreError;
pub use services::Services;

// Re-export core components
pub use shopfront_faults::{
    classify, user_message, ClassifiedError, ErrorKind, Failure, Fault, Remediation,
};
pub use shopfront_health::{
    HealthMonitor, HealthPolicy, HealthReport, HealthState, HealthStatus, HealthWatch, HttpProbe,
    Probe, RecoveryOutcome,
};
pub use shopfront_navigation::{
    GuardPolicy, NavigationError, NavigationGuard, NavigationMode, NavigationRequest, RouteEvent,
    Router,
};
pub use shopfront_retry::{with_retry, RetryPolicy};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
