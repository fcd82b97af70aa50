use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::kernel::{DEFAULT_COBS_URL, DEFAULT_FETCH_TIMEOUT};

/// Period between background refresh cycles
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(600);

/// Shortest refresh interval accepted from the environment
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 60;

pub const DEFAULT_PORT: u16 = 3000;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub static_root: PathBuf,
    pub cobs_url: String,
    pub fetch_timeout: Duration,
    pub refresh_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Every variable is optional; unset ones keep the built-in defaults, which
    /// are the fixed values of the public service (port 3000, COBS, 20s fetch
    /// timeout, 600s refresh). Note that `PORT` is often set by hosting
    /// platforms and will move the listener off 3000 when present.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            static_root: env::var("STATIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_root),
            cobs_url: env::var("COBS_URL").unwrap_or(defaults.cobs_url),
            fetch_timeout: parse_secs("FETCH_TIMEOUT_SECS", 1)?
                .unwrap_or(defaults.fetch_timeout),
            refresh_interval: parse_secs("REFRESH_INTERVAL_SECS", MIN_REFRESH_INTERVAL_SECS)?
                .unwrap_or(defaults.refresh_interval),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_root: PathBuf::from("."),
            cobs_url: DEFAULT_COBS_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(None),
    }
}

/// Whole seconds, rejected below `min`
fn parse_secs(name: &str, min: u64) -> Result<Option<Duration>> {
    match parse_var::<u64>(name)? {
        Some(secs) if secs < min => bail!("{} must be at least {} seconds, got {}", name, min, secs),
        Some(secs) => Ok(Some(Duration::from_secs(secs))),
        None => Ok(None),
    }
}
