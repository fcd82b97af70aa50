//! Periodic observation refresh.
//!
//! A single long-lived tokio task sleeps for the configured interval and then
//! runs one refresh cycle, forever. Cycles never overlap because the loop is
//! sequential.
//!
//! ```text
//! startup ─► run_guarded_cycle (awaited before serving)
//!                │
//! start_refresh_loop ─► sleep(interval) ─► run_guarded_cycle ─┐
//!                           ▲                                 │
//!                           └─────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domains::observations::{RefreshOutcome, Refresher};

/// Spawn the background refresh loop.
///
/// The first cycle runs after one full interval; callers run the startup
/// cycle themselves with [`run_guarded_cycle`].
pub fn start_refresh_loop(refresher: Arc<Refresher>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Refresh loop started");

        loop {
            tokio::time::sleep(interval).await;
            run_guarded_cycle(&refresher).await;
        }
    })
}

/// Run one cycle on its own task so a panic cannot take the loop down.
///
/// On failure the cache keeps its values but `updated` still advances.
pub async fn run_guarded_cycle(refresher: &Arc<Refresher>) -> Option<RefreshOutcome> {
    let cycle = refresher.clone();

    match tokio::spawn(async move { cycle.run_cycle().await }).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!(error = %e, "Refresh cycle failed");
            refresher.store().touch().await;
            None
        }
    }
}
