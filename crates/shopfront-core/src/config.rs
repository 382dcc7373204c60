//! Service configuration
//!
//! Read from the process environment. Only the project id is required;
//! everything else falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use shopfront_health::HealthPolicy;
use shopfront_navigation::GuardPolicy;
use shopfront_retry::RetryPolicy;

use crate::error::CoreError;
use crate::Result;

const PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
const USE_EMULATORS: &str = "SHOPFRONT_USE_EMULATORS";
const EMULATOR_HOST: &str = "SHOPFRONT_EMULATOR_HOST";
const HEALTH_INTERVAL_MS: &str = "SHOPFRONT_HEALTH_INTERVAL_MS";
const HEALTH_MAX_FAILURES: &str = "SHOPFRONT_HEALTH_MAX_FAILURES";
const HEALTH_TIMEOUT_MS: &str = "SHOPFRONT_HEALTH_TIMEOUT_MS";
const RETRY_MAX_ATTEMPTS: &str = "SHOPFRONT_RETRY_MAX_ATTEMPTS";
const RETRY_BASE_DELAY_MS: &str = "SHOPFRONT_RETRY_BASE_DELAY_MS";
const NAV_FALLBACK_MS: &str = "SHOPFRONT_NAV_FALLBACK_MS";

const REQUIRED: &[&str] = &[PROJECT_ID];

const HOSTED_BASE: &str = "https://firestore.googleapis.com";
const DEFAULT_EMULATOR_HOST: &str = "localhost:8080";
/// Document read by the health probe
const HEALTH_DOCUMENT: &str = "_health/connection";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    pub fallback_reset_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    pub interval_ms: u64,
    pub max_failures: u32,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Document-store project
    pub project_id: String,
    /// Probe the local emulator instead of the hosted store
    pub use_emulators: bool,
    /// Emulator `host:port`
    pub emulator_host: String,
    pub navigation: NavigationConfig,
    pub health: HealthConfig,
    pub retry: RetryConfig,
}

impl Config {
    /// Defaults for everything but the project id.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            use_emulators: false,
            emulator_host: DEFAULT_EMULATOR_HOST.to_string(),
            navigation: NavigationConfig {
                fallback_reset_ms: 1500,
            },
            health: HealthConfig {
                interval_ms: 30_000,
                max_failures: 3,
                timeout_ms: 6_000,
            },
            retry: RetryConfig {
                max_attempts: 3,
                base_delay_ms: 1_000,
            },
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. All missing required
    /// variables are reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let missing: Vec<String> = REQUIRED
            .iter()
            .copied()
            .filter(|name| get(*name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            tracing::error!(missing = %missing.join(", "), "Missing required environment variables");
            return Err(CoreError::MissingEnv(missing));
        }

        let mut config = Self::new(get(PROJECT_ID).unwrap_or_default());

        if let Some(value) = get(USE_EMULATORS) {
            config.use_emulators = parse_flag(USE_EMULATORS, &value)?;
        }
        if let Some(value) = get(EMULATOR_HOST) {
            config.emulator_host = value;
        }
        if let Some(value) = get(HEALTH_INTERVAL_MS) {
            config.health.interval_ms = parse(HEALTH_INTERVAL_MS, &value)?;
        }
        if let Some(value) = get(HEALTH_MAX_FAILURES) {
            config.health.max_failures = parse(HEALTH_MAX_FAILURES, &value)?;
        }
        if let Some(value) = get(HEALTH_TIMEOUT_MS) {
            config.health.timeout_ms = parse(HEALTH_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = get(RETRY_MAX_ATTEMPTS) {
            config.retry.max_attempts = parse(RETRY_MAX_ATTEMPTS, &value)?;
        }
        if let Some(value) = get(RETRY_BASE_DELAY_MS) {
            config.retry.base_delay_ms = parse(RETRY_BASE_DELAY_MS, &value)?;
        }
        if let Some(value) = get(NAV_FALLBACK_MS) {
            config.navigation.fallback_reset_ms = parse(NAV_FALLBACK_MS, &value)?;
        }

        if config.health.max_failures == 0 {
            return Err(CoreError::Config(format!("{} must be at least 1", HEALTH_MAX_FAILURES)));
        }

        Ok(config)
    }

    /// URL of the health document probed by the connection monitor.
    pub fn probe_endpoint(&self) -> Result<Url> {
        let base = if self.use_emulators {
            format!("http://{}", self.emulator_host)
        } else {
            HOSTED_BASE.to_string()
        };

        let url = Url::parse(&base)?.join(&format!(
            "/v1/projects/{}/databases/(default)/documents/{}",
            self.project_id, HEALTH_DOCUMENT
        ))?;
        Ok(url)
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        GuardPolicy {
            fallback_reset: Duration::from_millis(self.navigation.fallback_reset_ms),
            ..GuardPolicy::default()
        }
    }

    pub fn health_policy(&self) -> HealthPolicy {
        HealthPolicy {
            check_interval: Duration::from_millis(self.health.interval_ms),
            max_failures: self.health.max_failures,
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.health.timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
        )
    }
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::Config(format!("{} has an invalid value: {}", name, value)))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(CoreError::Config(format!("{} has an invalid value: {}", name, value))),
    }
}
