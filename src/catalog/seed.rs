use tracing::info;

use crate::catalog::GameCatalog;
use crate::error::Result;

/// Baseline games stored on first start. Multipliers are in-game degrees per
/// mouse count at sensitivity 1.
pub const DEFAULT_FACTORS: &[(&str, f64)] = &[
    ("Valorant", 0.07000000),
    // Source engine m_yaw
    ("CSGO", 0.02200000),
    ("Apex Legends", 0.02200000),
    ("Overwatch", 0.00333333),
    ("Fortnite", 0.01111100),
    ("PUBG", 0.02200000),
    ("Battlefield", 2.29183100),
    ("Destiny 2", 0.13888888),
    ("Call of Duty", 0.00666666),
];

/// Store every default game that is not already present. Existing rows are
/// never overwritten, so a corrected multiplier survives restarts.
/// Returns the number of games inserted.
pub async fn seed_defaults(catalog: &GameCatalog) -> Result<usize> {
    let mut inserted = 0;
    for &(name, multiplier) in DEFAULT_FACTORS {
        if catalog.insert_if_absent(name, multiplier).await? {
            info!("Seeded: {name}");
            inserted += 1;
        }
    }
    Ok(inserted)
}
