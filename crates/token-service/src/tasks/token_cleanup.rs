//! Expired token purge task.
//!
//! Consumption already deletes an expired record when it is looked up, but
//! tokens that are never presented again would otherwise stay in the table
//! forever. This task removes them at a fixed interval.
//!
//! # Graceful Shutdown
//!
//! The task exits when its cancellation token is triggered. A purge that is
//! already running completes first.

use crate::services::TokenService;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Run the purge loop until `cancel_token` is cancelled.
///
/// The first purge runs immediately. An interval of zero is rejected by the
/// caller (it means the task is disabled).
#[instrument(skip_all, name = "token.task.cleanup")]
pub async fn start_token_cleanup(
    tokens: TokenService,
    interval_seconds: u64,
    cancel_token: CancellationToken,
) {
    info!(
        target: "token.task.cleanup",
        interval_seconds,
        "Starting expired token cleanup task"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_cleanup(&tokens).await;
            }
            _ = cancel_token.cancelled() => {
                info!(
                    target: "token.task.cleanup",
                    "Token cleanup task received shutdown signal, exiting"
                );
                break;
            }
        }
    }

    info!(target: "token.task.cleanup", "Token cleanup task stopped");
}

/// Run a single purge. Failures are logged and retried on the next tick.
pub(crate) async fn run_cleanup(tokens: &TokenService) -> u64 {
    match tokens.purge_expired().await {
        Ok(count) => {
            if count > 0 {
                info!(
                    target: "token.task.cleanup",
                    purged_count = count,
                    "Purged expired tokens"
                );
            }
            count
        }
        Err(e) => {
            tracing::error!(
                target: "token.task.cleanup",
                error = ?e,
                "Failed to purge expired tokens"
            );
            0
        }
    }
}
