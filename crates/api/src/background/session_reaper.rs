//! Periodic purge of expired sessions.
//!
//! Expired sessions are already invisible to token lookups; this job only
//! keeps the table from growing without bound. Runs on a fixed interval
//! using `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use sessiongate_core::session::SessionStore;
use tokio_util::sync::CancellationToken;

/// Run the reaper loop until `cancel` is triggered.
///
/// The first purge happens immediately. Failures are logged and retried on
/// the next tick.
pub async fn run(store: Arc<dyn SessionStore>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Session reaper started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session reaper stopping");
                break;
            }
            _ = ticker.tick() => {
                match store.delete_expired().await {
                    Ok(0) => tracing::debug!("Session reaper: nothing to purge"),
                    Ok(deleted) => tracing::info!(deleted, "Session reaper: purged expired sessions"),
                    Err(e) => tracing::error!(error = %e, "Session reaper: purge failed"),
                }
            }
        }
    }
}
