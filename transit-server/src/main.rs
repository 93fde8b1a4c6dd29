use std::process::ExitCode;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_server::feed::{CacheConfig, FeedCache, FeedHandle, FeedLoader, RetryBackoff};
use transit_server::planner::PlannerConfig;
use transit_server::settings::ServerSettings;
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = match ServerSettings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "invalid settings");
            return ExitCode::FAILURE;
        }
    };

    let loader = match FeedLoader::new(settings.feed.clone()) {
        Ok(loader) => loader,
        Err(e) => {
            error!(error = %e, "failed to create feed loader");
            return ExitCode::FAILURE;
        }
    };
    let cache = FeedCache::new(loader, &CacheConfig::with_ttl(settings.refresh_interval));

    // Load the feed before serving; keep serving 503s if it isn't available yet
    let feed = FeedHandle::empty(cache);
    match feed.update().await {
        Ok(_) => info!("loaded GTFS feed"),
        Err(e) => warn!(error = %e, "initial feed load failed; retrying"),
    }

    // Retry quickly until the first load succeeds, then reload whenever the
    // cached feed expires
    let feed_refresh = feed.clone();
    let check_interval = settings.check_interval();
    tokio::spawn(async move {
        feed_refresh.load_with_retry(&RetryBackoff::default()).await;

        let mut interval = tokio::time::interval(check_interval);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match feed_refresh.update().await {
                Ok(true) => info!("refreshed GTFS feed"),
                Ok(false) => debug!("GTFS feed still cached"),
                Err(e) => warn!(error = %e, "failed to refresh GTFS feed"),
            }
        }
    });

    let state = AppState::new(feed, PlannerConfig::default());
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(settings.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %settings.bind_addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %settings.bind_addr, source = %settings.feed.source, "transit planner listening");
    info!("GET  /health            - Health check");
    info!("GET  /api/stops/search  - Search stops by name");
    info!("GET  /api/stops/:id     - Look up a stop");
    info!("POST /api/plan          - Plan a trip");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
