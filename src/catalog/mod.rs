pub mod game_catalog;
pub mod refresher;
pub mod seed;

pub use game_catalog::GameCatalog;
pub use refresher::CatalogRefresher;
pub use seed::seed_defaults;
