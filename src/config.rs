//! Configuration management

use anyhow::{Context, Result};
use std::time::Duration;

/// Bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bluesky account identifier (handle or email)
    pub identifier: String,

    /// Bluesky app password
    pub password: String,

    /// PDS base URL
    pub service: String,

    /// How often to poll the notification feed
    pub tick_interval: Duration,

    /// How often to clear dedup/completion state
    pub sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let identifier = std::env::var("BLUESKY_BOT_USERNAME")
            .context("BLUESKY_BOT_USERNAME must be set")?;

        let password = std::env::var("BLUESKY_BOT_PASSWORD")
            .context("BLUESKY_BOT_PASSWORD must be set")?;

        let service = std::env::var("BLUESKY_SERVICE")
            .unwrap_or_else(|_| "https://bsky.social".to_string());

        let tick_interval = std::env::var("TICK_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        let sweep_interval = std::env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(3600));

        Ok(Self {
            identifier,
            password,
            service,
            tick_interval,
            sweep_interval,
        })
    }
}
