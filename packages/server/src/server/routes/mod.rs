// HTTP routes
pub mod api;
pub mod health;

pub use api::*;
pub use health::*;
