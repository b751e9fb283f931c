use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::error;

use crate::catalog::GameCatalog;
use crate::config::CATALOG_REFRESH_INTERVAL_SECS;

/// Background task that resyncs the catalog cache with the database, so
/// multiplier corrections made by other instances reach cached lookups.
pub struct CatalogRefresher {
    catalog: Arc<GameCatalog>,
    period: Duration,
}

impl CatalogRefresher {
    pub fn new(catalog: Arc<GameCatalog>) -> Self {
        Self::with_period(catalog, Duration::from_secs(CATALOG_REFRESH_INTERVAL_SECS))
    }

    pub fn with_period(catalog: Arc<GameCatalog>, period: Duration) -> Self {
        Self { catalog, period }
    }

    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.tick().await; // skip immediate first tick — startup already refreshed

        loop {
            ticker.tick().await;
            if let Err(e) = self.catalog.refresh().await {
                error!("Catalog refresh failed: {e}");
            }
        }
    }
}
