use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Magnitude published whenever the source could not be scraped.
pub const FALLBACK_MAGNITUDE: f64 = 9.9;

/// Provenance of the magnitude currently held in the cache
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ObservationSource {
    /// Hardcoded default, before the first refresh cycle completes
    #[serde(rename = "COBS (startup)")]
    Startup,
    /// Scraped from COBS by the last cycle
    #[serde(rename = "COBS")]
    Cobs,
    /// Fallback value after a failed scrape
    #[serde(rename = "Demo")]
    Demo,
}

impl std::fmt::Display for ObservationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservationSource::Startup => write!(f, "COBS (startup)"),
            ObservationSource::Cobs => write!(f, "COBS"),
            ObservationSource::Demo => write!(f, "Demo"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MagStatus {
    #[default]
    Normal,
}

/// Latest known observation of the tracked object.
///
/// Field names are part of the `/api/latest` contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObservationCache {
    pub updated: DateTime<Utc>,
    pub latest_mag: f64,
    pub observed_mag: f64,
    pub predicted_mag: Option<f64>,
    pub distance_km: Option<f64>,
    pub source: ObservationSource,
    pub mag_status: MagStatus,
}

impl ObservationCache {
    /// Defaults published before the first refresh cycle.
    pub fn startup() -> Self {
        Self {
            updated: Utc::now(),
            latest_mag: FALLBACK_MAGNITUDE,
            observed_mag: FALLBACK_MAGNITUDE,
            predicted_mag: None,
            distance_km: None,
            source: ObservationSource::Startup,
            mag_status: MagStatus::Normal,
        }
    }

    fn advance_updated(&mut self) {
        let now = Utc::now();
        let floor = self.updated + Duration::microseconds(1);
        self.updated = if now > self.updated { now } else { floor };
    }
}

/// Result of one refresh cycle, as written to the cache
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefreshOutcome {
    Scraped(f64),
    Fallback,
}

impl RefreshOutcome {
    pub fn from_reading(reading: Option<f64>) -> Self {
        match reading {
            Some(mag) => RefreshOutcome::Scraped(mag),
            None => RefreshOutcome::Fallback,
        }
    }

    pub fn magnitude(&self) -> f64 {
        match self {
            RefreshOutcome::Scraped(mag) => *mag,
            RefreshOutcome::Fallback => FALLBACK_MAGNITUDE,
        }
    }

    pub fn source(&self) -> ObservationSource {
        match self {
            RefreshOutcome::Scraped(_) => ObservationSource::Cobs,
            RefreshOutcome::Fallback => ObservationSource::Demo,
        }
    }
}

/// Shared handle to the single observation cache.
///
/// Readers take a cloned snapshot under the read lock; every write happens
/// under one write guard, so a snapshot never mixes two cycles.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<RwLock<ObservationCache>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::with_cache(ObservationCache::startup())
    }

    pub fn with_cache(cache: ObservationCache) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
        }
    }

    pub async fn snapshot(&self) -> ObservationCache {
        self.inner.read().await.clone()
    }

    /// Apply a cycle outcome: both magnitudes, the source and `updated`.
    pub async fn record(&self, outcome: RefreshOutcome) -> ObservationCache {
        let mut cache = self.inner.write().await;
        let mag = outcome.magnitude();

        cache.advance_updated();
        cache.latest_mag = mag;
        cache.observed_mag = mag;
        cache.source = outcome.source();

        cache.clone()
    }

    /// Advance `updated` only, keeping the last values.
    pub async fn touch(&self) -> ObservationCache {
        let mut cache = self.inner.write().await;
        cache.advance_updated();
        cache.clone()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}
