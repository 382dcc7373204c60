//! Raw failure signal

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Anything that carries a diagnostic message and, optionally, an SDK error code.
pub trait Fault {
    fn message(&self) -> &str;

    fn code(&self) -> Option<&str> {
        None
    }
}

/// A failure reported by one of the external collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct Failure {
    /// Original diagnostic string
    pub message: String,
    /// SDK error code such as `cancelled` or `auth/wrong-password`
    pub code: Option<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl Fault for Failure {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl<T: Fault + ?Sized> Fault for &T {
    fn message(&self) -> &str {
        (**self).message()
    }

    fn code(&self) -> Option<&str> {
        (**self).code()
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::new(message)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_raw_message() {
        let failure = Failure::with_code("Missing or insufficient permissions.", "permission-denied");
        assert_eq!(failure.to_string(), "Missing or insufficient permissions.");
        assert_eq!(Fault::code(&failure), Some("permission-denied"));
    }
}
