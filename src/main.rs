// src/main.rs
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use campaign_dashboard::brevo::{BrevoClient, BrevoConfig};
use campaign_dashboard::campaign::CampaignEngine;
use campaign_dashboard::config::{load_config, send_delay, AuthConfig, Config};
use campaign_dashboard::models::Result;
use campaign_dashboard::server::{build_rocket, ServerState};
use campaign_dashboard::store::{RecipientStore, StoreConfig};
use campaign_dashboard::tracker::EmailTracker;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = match load_config("config.yml").await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config.yml: {}. Using defaults.", e);
            Config::default()
        }
    };

    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    let brevo = Arc::new(BrevoClient::new(BrevoConfig::from_env()));
    let store = RecipientStore::new(StoreConfig::from_env());
    let tracker = Arc::new(EmailTracker::new(&config.tracker.file));
    let engine = Arc::new(CampaignEngine::new(
        brevo.clone(),
        tracker.clone(),
        send_delay(),
    ));

    let state = ServerState {
        auth: AuthConfig::from_env(),
        engine,
        brevo,
        store,
        tracker,
    };

    info!(
        "Starting campaign dashboard API on {}:{}",
        config.server.address, config.server.port
    );
    build_rocket(&config.server, state).launch().await?;

    Ok(())
}
