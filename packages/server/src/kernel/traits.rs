// Trait definitions for dependency injection
//
// Infrastructure seams only. The refresh logic itself lives in
// domains::observations and talks to the outside world through these traits.

use async_trait::async_trait;

// =============================================================================
// Magnitude Source Trait (Infrastructure - observation scraping)
// =============================================================================

#[async_trait]
pub trait BaseMagnitudeSource: Send + Sync {
    /// Fetch the latest magnitude of the tracked object.
    ///
    /// Never fails: every network, decode or extraction problem is logged by
    /// the implementation and reported as `None`.
    async fn fetch_latest(&self) -> Option<f64>;

    /// URL the readings come from (for diagnostics)
    fn source_url(&self) -> &str;
}
