//! Kernel module - server infrastructure and dependencies.

pub mod cobs_client;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use cobs_client::{CobsClient, FetchError, DEFAULT_COBS_URL, DEFAULT_FETCH_TIMEOUT};
pub use scheduled_tasks::{run_guarded_cycle, start_refresh_loop};
pub use test_dependencies::{MockMagnitudeSource, MockReading};
pub use traits::*;
