use crate::error::{AppError, Result};

/// Centimeters of mouse travel constant used for cm/360.
/// Kept as a literal; never derived from other constants at runtime.
pub const K_CM_360: f64 = 1955.8;

pub const CM_PER_INCH: f64 = 2.54;

/// Decimal places kept on the converted sensitivity.
pub const SENSITIVITY_DECIMALS: usize = 4;

/// Decimal places kept on cm/360 and in/360.
pub const DISTANCE_DECIMALS: usize = 2;

/// Yaw multipliers are stored as integers in units of 1e-8.
pub const YAW_SCALE: f64 = 100_000_000.0;

/// How often the catalog cache is resynced with the database (seconds).
pub const CATALOG_REFRESH_INTERVAL_SECS: u64 = 60;

pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// Header carrying the admin token for catalog writes.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Mount point for the API router (API_PREFIX)
    pub api_prefix: String,
    /// Origins allowed by CORS (CORS_ORIGINS, comma-separated)
    pub cors_origins: Vec<String>,
    /// Enables POST/PUT on /games when set (ADMIN_TOKEN)
    pub admin_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_prefix = std::env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string());
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "sensitivity.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            api_prefix: normalize_prefix(&api_prefix)?,
            cors_origins: split_list(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            admin_token: std::env::var("ADMIN_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Empty or "/" means mount at the root. Anything else must start with '/'.
fn normalize_prefix(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !trimmed.starts_with('/') {
        return Err(AppError::Config(format!(
            "API_PREFIX must start with '/', got {raw:?}"
        )));
    }
    Ok(trimmed.to_string())
}
