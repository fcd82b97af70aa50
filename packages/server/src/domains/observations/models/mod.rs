pub mod observation_cache;

pub use observation_cache::*;
