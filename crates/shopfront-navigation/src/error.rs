//! Navigation error types

use shopfront_faults::{ErrorKind, Failure};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Navigation to {request} failed ({kind}): {source}")]
    Transition {
        request: String,
        kind: ErrorKind,
        #[source]
        source: Failure,
    },

    #[error("Back navigation failed: {0}")]
    Back(#[source] Failure),
}

impl NavigationError {
    pub fn failure(&self) -> &Failure {
        match self {
            NavigationError::Transition { source, .. } => source,
            NavigationError::Back(source) => source,
        }
    }
}
