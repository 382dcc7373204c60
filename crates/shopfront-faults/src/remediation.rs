//! Remediation text for the recovery banner

use serde::Serialize;

use crate::classify::ErrorKind;

/// Domains the user should allow in their blocker for the storefront to work.
pub const ALLOWLIST_DOMAINS: &str = "*.firebaseapp.com, *.firestore.googleapis.com, *.googleapis.com";

const SECURITY_SOLUTIONS: &[&str] = &[
    "Disable ad blockers or security extensions temporarily",
    "Add Firebase domains to your security software whitelist",
    "Check browser privacy and security settings",
    "Try using incognito/private browsing mode",
];

const NAVIGATION_SOLUTIONS: &[&str] = &[
    "Wait a moment and try again",
    "Refresh the page",
    "Use browser back/forward buttons",
    "Check if the page is still loading",
];

const GENERAL_SOLUTIONS: &[&str] = &[
    "Refresh the page",
    "Clear browser cache",
    "Try again in a few moments",
    "Contact support if the issue persists",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remediation {
    /// Banner heading
    pub title: &'static str,
    /// Entries of the "Show Solutions" panel
    pub solutions: &'static [&'static str],
    /// Extra hint rendered under the solutions, if any
    pub quick_fix: Option<String>,
}

pub fn remediation(kind: ErrorKind) -> Remediation {
    match kind {
        ErrorKind::BlockedConnection => Remediation {
            title: "Connection Blocked",
            solutions: SECURITY_SOLUTIONS,
            quick_fix: Some(allowlist_hint()),
        },
        ErrorKind::BrowserSecurityPolicy => Remediation {
            title: "Security Policy Error",
            solutions: SECURITY_SOLUTIONS,
            quick_fix: Some(allowlist_hint()),
        },
        ErrorKind::NavigationCancelled => Remediation {
            title: "Navigation Error",
            solutions: NAVIGATION_SOLUTIONS,
            quick_fix: None,
        },
        ErrorKind::Generic => Remediation {
            title: "Error Occurred",
            solutions: GENERAL_SOLUTIONS,
            quick_fix: None,
        },
    }
}

fn allowlist_hint() -> String {
    format!("Add these domains to your ad blocker whitelist: {ALLOWLIST_DOMAINS}")
}
