//! HTTP probe against the document store's REST endpoint

use futures_util::future::BoxFuture;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use shopfront_faults::Failure;

use crate::error::HealthError;
use crate::monitor::Probe;
use crate::Result;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(6);

/// Reads the `_health/connection` document. A missing document still proves
/// the store is reachable.
pub struct HttpProbe {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpProbe {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(HealthError::UnsupportedEndpoint(endpoint.to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn read_document(&self) -> std::result::Result<(), Failure> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| transport_failure(&e))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(status_failure(status))
    }
}

impl Probe for HttpProbe {
    fn probe(&self) -> BoxFuture<'_, std::result::Result<(), Failure>> {
        Box::pin(self.read_document())
    }
}

fn status_failure(status: StatusCode) -> Failure {
    let message = format!("Health document read failed with HTTP {}", status.as_u16());
    match status {
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
            Failure::with_code(message, "permission-denied")
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            Failure::with_code(message, "unavailable")
        }
        _ => Failure::with_code(message, "unknown"),
    }
}

fn transport_failure(error: &reqwest::Error) -> Failure {
    let message = error.to_string();
    let lowered = message.to_lowercase();

    let code = if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        if lowered.contains("dns") || lowered.contains("resolve") {
            "dns"
        } else if lowered.contains("tls") || lowered.contains("certificate") {
            "tls"
        } else {
            "connect"
        }
    } else if error.is_request() {
        "request"
    } else {
        "unknown"
    };

    Failure::with_code(message, code)
}
