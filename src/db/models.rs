use crate::types::GameFactor;

/// Row of the `game_factors` table.
#[derive(Debug, sqlx::FromRow)]
pub struct GameFactorRow {
    pub id: i64,
    pub game_name: String,
    pub yaw_multiplier_e8: i64,
}

impl From<GameFactorRow> for GameFactor {
    fn from(row: GameFactorRow) -> Self {
        GameFactor {
            id: row.id,
            name: row.game_name,
            yaw_multiplier_e8: row.yaw_multiplier_e8,
        }
    }
}
