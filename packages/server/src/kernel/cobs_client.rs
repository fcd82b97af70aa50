//! COBS client - fetches the "recent observations" page and extracts the
//! tracked object's magnitude.
//!
//! One GET per call, no retries. Every failure is logged where it happens and
//! surfaces to callers of `fetch_latest` only as `None`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::BaseMagnitudeSource;
use crate::domains::observations::extractor::{extract_magnitude, TARGET_TOKEN};

/// Public COBS page listing recent comet observations
pub const DEFAULT_COBS_URL: &str = "https://cobs.si/recent/";

/// Hard limit for one fetch, connect through body
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Failure points of a single page fetch
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("failed to decode response body: {0}")]
    Decode(String),
}

/// Scrapes COBS for the magnitude of [`TARGET_TOKEN`]
#[derive(Debug, Clone)]
pub struct CobsClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl CobsClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("3I-ATLAS-Tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create COBS HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    /// Fetch the raw page text, which must be valid UTF-8.
    pub async fn fetch_page(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e, FetchError::Network))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(e, FetchError::Decode))?;

        // Strict UTF-8: a mangled page is a failed fetch, not a lossy reading
        String::from_utf8(body.to_vec()).map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn classify(&self, error: reqwest::Error, otherwise: fn(String) -> FetchError) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            otherwise(error.to_string())
        }
    }
}

#[async_trait]
impl BaseMagnitudeSource for CobsClient {
    async fn fetch_latest(&self) -> Option<f64> {
        info!(url = %self.url, "Fetching COBS observations");

        let page = match self.fetch_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %self.url, error = %e, "COBS fetch failed");
                return None;
            }
        };
        debug!(bytes = page.len(), "Fetched COBS page");

        match extract_magnitude(&page, TARGET_TOKEN) {
            Ok(mag) => {
                info!(magnitude = mag, target = TARGET_TOKEN, "Accepted COBS magnitude");
                Some(mag)
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "No usable magnitude on COBS page");
                None
            }
        }
    }

    fn source_url(&self) -> &str {
        &self.url
    }
}
