//! One refresh cycle: fetch, interpret, write the cache.
//!
//! Scheduling lives in `kernel::scheduled_tasks`; this module only knows how
//! to run a single cycle against a magnitude source.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::models::{CacheStore, RefreshOutcome};
use crate::kernel::BaseMagnitudeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Runs refresh cycles against a magnitude source and the shared cache.
pub struct Refresher {
    source: Arc<dyn BaseMagnitudeSource>,
    store: CacheStore,
    refreshing: AtomicBool,
}

impl Refresher {
    pub fn new(source: Arc<dyn BaseMagnitudeSource>, store: CacheStore) -> Self {
        Self {
            source,
            store,
            refreshing: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn source(&self) -> &Arc<dyn BaseMagnitudeSource> {
        &self.source
    }

    pub fn state(&self) -> RefreshState {
        if self.refreshing.load(Ordering::SeqCst) {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    /// Run one cycle and return what was written.
    ///
    /// A scraped value sets both magnitudes and `source = COBS`; no value
    /// writes the fallback magnitude with `source = Demo`. `updated` moves
    /// forward either way.
    pub async fn run_cycle(&self) -> RefreshOutcome {
        let _refreshing = RefreshingGuard::enter(&self.refreshing);
        info!(url = %self.source.source_url(), "Refreshing observation cache");

        let reading = self.source.fetch_latest().await;
        let outcome = RefreshOutcome::from_reading(reading);
        let cache = self.store.record(outcome).await;

        match outcome {
            RefreshOutcome::Scraped(mag) => {
                info!(magnitude = mag, updated = %cache.updated, "Cache updated from COBS");
            }
            RefreshOutcome::Fallback => {
                warn!(
                    magnitude = cache.latest_mag,
                    updated = %cache.updated,
                    "No reading available, using demo magnitude"
                );
            }
        }

        outcome
    }
}

/// Holds the refresh flag for the duration of a cycle, including one that
/// unwinds.
struct RefreshingGuard<'a>(&'a AtomicBool);

impl<'a> RefreshingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
