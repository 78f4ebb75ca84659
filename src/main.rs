//! Industry Impact Monitor: binary entrypoint
//! Boots the Axum HTTP server, the reload scheduler and the shared dataset store.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use industry_impact_monitor::api::{self, AppState};
use industry_impact_monitor::config::MonitorConfig;
use industry_impact_monitor::ingest::config::FeedEndpoints;
use industry_impact_monitor::ingest::providers::HttpFeed;
use industry_impact_monitor::ingest::scheduler::{spawn_reload_scheduler, ReloadSchedulerCfg};
use industry_impact_monitor::ingest::types::FeedSource;
use industry_impact_monitor::metrics::Metrics;
use industry_impact_monitor::store::DatasetStore;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - MONITOR_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("MONITOR_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("industry_impact_monitor=info,ingest=info,api=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let config = Arc::new(MonitorConfig::load_default().context("loading monitor config")?);
    tracing::info!(
        base_url = %config.base_url,
        refresh_secs = config.refresh_interval_secs,
        "monitor config loaded"
    );

    let metrics = if config.metrics_enabled {
        Some(Metrics::init(&config)?)
    } else {
        None
    };

    let feed: Arc<dyn FeedSource> = Arc::new(HttpFeed::new(FeedEndpoints::from_config(&config))?);
    let store = DatasetStore::new();
    let (reload, _scheduler) = spawn_reload_scheduler(
        ReloadSchedulerCfg {
            interval_secs: config.refresh_interval_secs,
        },
        feed,
        store.clone(),
    );

    let state = AppState::new(store, reload, Arc::clone(&config));
    let mut router = api::create_router(state);
    if let Some(m) = &metrics {
        router = router.merge(m.router());
    }

    Ok(router.into())
}
