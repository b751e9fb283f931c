mod api;
mod catalog;
mod config;
mod converter;
mod db;
mod error;
mod types;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::{cors_layer, router, ApiState, HealthState};
use crate::catalog::{seed_defaults, CatalogRefresher, GameCatalog};
use crate::config::Config;
use crate::db::FactorRepo;
use crate::error::Result;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = db::connect(&cfg.db_path).await?;
    info!("Database ready at {}", cfg.db_path);

    // --- Catalog: seed defaults, then warm the cache ---
    let catalog = GameCatalog::new(FactorRepo::new(pool.clone()));
    let seeded = seed_defaults(&catalog).await?;
    let games = catalog.refresh().await?;
    info!("Catalog ready: {games} games ({seeded} newly seeded)");

    // Catalog refresher (background, every CATALOG_REFRESH_INTERVAL_SECS)
    let refresher = CatalogRefresher::new(Arc::clone(&catalog));
    tokio::spawn(async move { refresher.run().await });

    if cfg.admin_token.is_some() {
        info!("ADMIN_TOKEN set: POST /games and PUT /games/:name enabled");
    } else {
        warn!("ADMIN_TOKEN not set: catalog is read-only over HTTP");
    }

    // --- HTTP API server ---
    let api_state = ApiState {
        catalog,
        health: Arc::new(HealthState::new()),
        admin_token: cfg.admin_token.as_deref().map(Arc::from),
    };
    let api = router(api_state);
    let app = if cfg.api_prefix.is_empty() {
        api
    } else {
        Router::new().nest(&cfg.api_prefix, api)
    };
    let app = app
        .layer(cors_layer(&cfg.cors_origins)?)
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}{}", cfg.api_prefix);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
