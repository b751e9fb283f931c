use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::db::FactorRepo;
use crate::error::{AppError, Result};
use crate::types::{lookup_key, multiplier_to_e8, GameFactor};

// ---------------------------------------------------------------------------
// GameCatalog
// ---------------------------------------------------------------------------

/// Read-through cache over the `game_factors` table.
///
/// Lookups hit the in-memory map first and fall back to the database on a miss.
/// `list_all` always reads the table and resyncs the map from it, and
/// `CatalogRefresher` resyncs on an interval, so rows added or changed by another
/// instance are picked up without a restart. Every write made through the
/// catalog refreshes the affected entry afterwards.
pub struct GameCatalog {
    repo: FactorRepo,
    /// lowercased name → factor
    cache: DashMap<String, GameFactor>,
}

impl GameCatalog {
    pub fn new(repo: FactorRepo) -> Arc<Self> {
        Arc::new(Self {
            repo,
            cache: DashMap::new(),
        })
    }

    /// Reload the whole cache from the database. Returns the number of games.
    pub async fn refresh(&self) -> Result<usize> {
        Ok(self.sync_from_store().await?.len())
    }

    /// Read every row and make the cache match it. Entries are overwritten in
    /// place and stale keys dropped afterwards, so concurrent readers never see
    /// a live game missing.
    async fn sync_from_store(&self) -> Result<Vec<GameFactor>> {
        let factors = self.repo.list_all().await?;
        let live: HashSet<String> = factors.iter().map(GameFactor::key).collect();
        for factor in &factors {
            self.cache.insert(factor.key(), factor.clone());
        }
        self.cache.retain(|key, _| live.contains(key));
        debug!("Catalog refreshed: {} games", factors.len());
        Ok(factors)
    }

    /// Resolve a game by name, ignoring case and surrounding whitespace.
    pub async fn factor(&self, name: &str) -> Result<GameFactor> {
        let key = lookup_key(name);
        let cached = self.cache.get(&key).map(|hit| hit.value().clone());
        if let Some(factor) = cached {
            return Ok(factor);
        }
        match self.repo.get_by_name(&key).await? {
            Some(factor) => {
                self.cache.insert(key, factor.clone());
                Ok(factor)
            }
            None => Err(AppError::UnknownGame(name.trim().to_string())),
        }
    }

    /// Yaw multiplier for `name`; `UnknownGame` if absent.
    pub async fn lookup(&self, name: &str) -> Result<f64> {
        Ok(self.factor(name).await?.yaw_multiplier())
    }

    /// Display names in insertion order, read from the database.
    pub async fn list_all(&self) -> Result<Vec<String>> {
        let factors = self.sync_from_store().await?;
        Ok(factors.iter().map(GameFactor::display_name).collect())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True when the backing store answers a trivial query.
    pub async fn store_reachable(&self) -> bool {
        self.repo.ping().await.is_ok()
    }

    /// Insert-if-absent by name. Existing entries are left untouched.
    /// Returns true if the game was newly stored.
    pub async fn insert_if_absent(&self, name: &str, yaw_multiplier: f64) -> Result<bool> {
        let name = validate_name(name)?;
        let e8 = validate_multiplier(yaw_multiplier)?;
        let inserted = self.repo.insert_if_absent(name, e8).await?;
        self.reload_entry(name).await?;
        Ok(inserted)
    }

    /// Administrative add. Fails with `GameExists` if the name is taken.
    pub async fn add(&self, name: &str, yaw_multiplier: f64) -> Result<GameFactor> {
        if !self.insert_if_absent(name, yaw_multiplier).await? {
            return Err(AppError::GameExists(name.trim().to_string()));
        }
        info!("Catalog add: {} = {yaw_multiplier:.8}", name.trim());
        self.factor(name).await
    }

    /// Administrative update of an existing game's multiplier.
    pub async fn update(&self, name: &str, yaw_multiplier: f64) -> Result<GameFactor> {
        let e8 = validate_multiplier(yaw_multiplier)?;
        if !self.repo.update_multiplier(name, e8).await? {
            return Err(AppError::GameNotFound(name.trim().to_string()));
        }
        info!("Catalog update: {} = {yaw_multiplier:.8}", name.trim());
        self.reload_entry(name)
            .await?
            .ok_or_else(|| AppError::GameNotFound(name.trim().to_string()))
    }

    async fn reload_entry(&self, name: &str) -> Result<Option<GameFactor>> {
        let key = lookup_key(name);
        match self.repo.get_by_name(&key).await? {
            Some(factor) => {
                self.cache.insert(key, factor.clone());
                Ok(Some(factor))
            }
            None => {
                self.cache.remove(&key);
                Ok(None)
            }
        }
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

fn validate_multiplier(yaw_multiplier: f64) -> Result<i64> {
    multiplier_to_e8(yaw_multiplier).ok_or_else(|| {
        AppError::InvalidMagnitude(format!(
            "yaw multiplier must be a positive number with at most 8 decimals, got {yaw_multiplier}"
        ))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
