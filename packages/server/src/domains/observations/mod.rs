pub mod extractor;
pub mod models;
pub mod refresher;

// Re-export commonly used types
pub use extractor::{extract_magnitude, ExtractionError, TARGET_TOKEN};
pub use models::{
    CacheStore, MagStatus, ObservationCache, ObservationSource, RefreshOutcome, FALLBACK_MAGNITUDE,
};
pub use refresher::{RefreshState, Refresher};
