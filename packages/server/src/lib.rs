// 3I/ATLAS Tracker - core library
//
// Scrapes COBS for the latest magnitude of comet 3I/ATLAS, keeps it in an
// in-memory cache refreshed on a fixed interval, and serves it as JSON next
// to the tracker's static front-end.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
