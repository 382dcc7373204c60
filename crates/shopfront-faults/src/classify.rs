//! Error classification
//!
//! Pattern match on the raw message and code, in priority order:
//! 1. blocked by client → `BlockedConnection`
//! 2. `Cross-Origin-Opener-Policy` → `BrowserSecurityPolicy`
//! 3. cancelled route / code `cancelled` → `NavigationCancelled`
//! 4. anything else → `Generic`

use serde::{Deserialize, Serialize};

use crate::failure::Fault;

const BLOCKED_MARKERS: &[&str] = &["ERR_BLOCKED_BY_CLIENT", "ERR_NETWORK"];
const BLOCKED_CODES: &[&str] = &["unavailable", "permission-denied"];
const SECURITY_POLICY_MARKER: &str = "Cross-Origin-Opener-Policy";
const CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request intercepted on the client (ad blocker, security extension)
    BlockedConnection,
    /// Cross-origin isolation warning from the browser
    BrowserSecurityPolicy,
    /// Route transition superseded by another one
    NavigationCancelled,
    Generic,
}

impl ErrorKind {
    /// Kinds the retry executor is allowed to retry.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ErrorKind::Generic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BlockedConnection => "blocked_connection",
            ErrorKind::BrowserSecurityPolicy => "browser_security_policy",
            ErrorKind::NavigationCancelled => "navigation_cancelled",
            ErrorKind::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a failure. Stateless and deterministic.
pub fn classify<F: Fault + ?Sized>(fault: &F) -> ErrorKind {
    let message = fault.message();
    let code = fault.code().unwrap_or_default();

    if BLOCKED_MARKERS.iter().any(|m| message.contains(m)) || BLOCKED_CODES.contains(&code) {
        return ErrorKind::BlockedConnection;
    }

    if message.contains(SECURITY_POLICY_MARKER) {
        return ErrorKind::BrowserSecurityPolicy;
    }

    if message.to_ascii_lowercase().contains(CANCELLED) || code == CANCELLED {
        return ErrorKind::NavigationCancelled;
    }

    ErrorKind::Generic
}

/// A failure paired with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub raw_message: String,
}

impl ClassifiedError {
    pub fn from_fault<F: Fault + ?Sized>(fault: &F) -> Self {
        Self {
            kind: classify(fault),
            raw_message: fault.message().to_string(),
        }
    }
}
