use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::models::GameFactorRow;
use crate::error::Result;
use crate::types::{lookup_key, GameFactor};

/// SQLite access for the `game_factors` table. Each call checks a connection
/// out of the pool and returns it when the query finishes, success or not.
#[derive(Clone)]
pub struct FactorRepo {
    pool: sqlx::SqlitePool,
}

impl FactorRepo {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Case-insensitive: matches on `game_key`, the `lookup_key` form of the name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<GameFactor>> {
        let row = sqlx::query_as::<_, GameFactorRow>(
            r#"
            SELECT id, game_name, yaw_multiplier_e8
            FROM game_factors
            WHERE game_key = ?
            "#,
        )
        .bind(lookup_key(name))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GameFactor::from))
    }

    /// All factors in insertion order.
    pub async fn list_all(&self) -> Result<Vec<GameFactor>> {
        let rows = sqlx::query_as::<_, GameFactorRow>(
            r#"
            SELECT id, game_name, yaw_multiplier_e8
            FROM game_factors
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GameFactor::from).collect())
    }

    /// Insert unless a row with the same name (any case) exists. The conflict
    /// is resolved by the unique index, so concurrent callers cannot both win.
    /// Returns true if a row was inserted.
    pub async fn insert_if_absent(&self, name: &str, yaw_multiplier_e8: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO game_factors (game_name, game_key, yaw_multiplier_e8, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(game_key) DO NOTHING
            "#,
        )
        .bind(name.trim())
        .bind(lookup_key(name))
        .bind(yaw_multiplier_e8)
        .bind(now_ns() as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Returns true if a row matched.
    pub async fn update_multiplier(&self, name: &str, yaw_multiplier_e8: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE game_factors
            SET yaw_multiplier_e8 = ?
            WHERE game_key = ?
            "#,
        )
        .bind(yaw_multiplier_e8)
        .bind(lookup_key(name))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cheap liveness probe for /health.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
