//! User-facing error messages

use crate::failure::Fault;

const FALLBACK: &str = "An unexpected error occurred. Please try again.";

/// Turn a raw failure into a sentence suitable for a form or toast.
pub fn user_message<F: Fault + ?Sized>(fault: &F) -> String {
    let message = fault.message();

    if message.contains("ERR_BLOCKED_BY_CLIENT") {
        return "Connection blocked by security software. Please check your ad blocker or security extensions.".to_string();
    }

    if message.contains("Route Cancelled") {
        return "Navigation was cancelled. Please try again.".to_string();
    }

    if message.contains("Cross-Origin-Opener-Policy") {
        return "Browser security policy is blocking the operation. Please check your browser settings.".to_string();
    }

    let by_code = match fault.code() {
        Some("auth/user-not-found") => Some("User not found. Please check your email and try again."),
        Some("auth/wrong-password") => Some("Incorrect password. Please try again."),
        Some("auth/too-many-requests") => Some("Too many failed attempts. Please try again later."),
        Some("auth/network-request-failed") => {
            Some("Network error. Please check your internet connection.")
        }
        _ => None,
    };

    if let Some(text) = by_code {
        return text.to_string();
    }

    if message.trim().is_empty() {
        FALLBACK.to_string()
    } else {
        message.to_string()
    }
}
