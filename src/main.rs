//! Skyreply - Entry Point
//!
//! Loads credentials from the environment, verifies them once, then runs the
//! poll loop until Ctrl-C.

use std::sync::Arc;

use skyreply::{BskyClient, Config, MentionFeed, Poller, PollerConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Skyreply v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let feed = Arc::new(BskyClient::new(
        &config.service,
        &config.identifier,
        &config.password,
    ));

    // Verify credentials up front; a bad app password should fail fast,
    // not be retried every tick forever.
    match feed.authenticate().await {
        Ok(session) => info!("Authenticated as @{} ({})", session.handle, session.did),
        Err(e) => {
            tracing::error!("Startup authentication failed: {}", e);
            anyhow::bail!("startup authentication failed: {}", e);
        }
    }

    let poller = Poller::new(
        feed,
        PollerConfig {
            tick_interval: config.tick_interval,
            sweep_interval: config.sweep_interval,
        },
    );

    tokio::select! {
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
