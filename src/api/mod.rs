pub mod extract;
pub mod health;
pub mod routes;

pub use extract::AppJson;
pub use health::HealthState;
pub use routes::{router, ApiState};

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::error::{AppError, Result};

/// CORS restricted to the configured origins; any header, the methods the API uses.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|_| AppError::Config(format!("invalid CORS origin: {o:?}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any))
}
