//! Shopfront Guard
//!
//! Watches the document store connection and logs every health report
//! until interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use shopfront_core::{Config, HealthMonitor, HealthReport, HealthWatch, HttpProbe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    shopfront_core::init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    let endpoint = config.probe_endpoint()?;
    tracing::info!(
        project_id = %config.project_id,
        emulators = config.use_emulators,
        endpoint = %endpoint,
        "Starting connection watch"
    );

    let probe = HttpProbe::new(endpoint, config.probe_timeout())?;
    let monitor = Arc::new(HealthMonitor::new(probe, config.health_policy()));
    let watch = HealthWatch::spawn(
        Arc::clone(&monitor),
        Duration::from_millis(config.health.interval_ms),
    );

    let mut reports = watch.subscribe();
    loop {
        tokio::select! {
            changed = reports.changed() => {
                if changed.is_err() {
                    break;
                }
                let report = reports.borrow_and_update().clone();
                log_report(&report)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn log_report(report: &HealthReport) -> anyhow::Result<()> {
    if report.checking {
        return Ok(());
    }

    let status = serde_json::to_string(&report.status)?;
    if report.healthy {
        tracing::info!(status = %status, "Connection healthy");
    } else {
        tracing::warn!(status = %status, "Connection unhealthy");
    }
    Ok(())
}
