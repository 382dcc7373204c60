//! Health error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Unsupported probe endpoint: {0}")]
    UnsupportedEndpoint(String),
}
