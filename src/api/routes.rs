use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{AppJson, HealthState};
use crate::catalog::GameCatalog;
use crate::config::ADMIN_TOKEN_HEADER;
use crate::converter::convert;
use crate::error::{AppError, Result};
use crate::types::{ConversionRequest, ConversionResult, GameFactor};

#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<GameCatalog>,
    pub health: Arc<HealthState>,
    /// Admin routes are mounted only when this is set.
    pub admin_token: Option<Arc<str>>,
}

pub fn router(state: ApiState) -> Router {
    let games = if state.admin_token.is_some() {
        get(get_games).post(add_game)
    } else {
        get(get_games)
    };

    let mut router = Router::new()
        .route("/games", games)
        .route("/convert_sensitivity", post(convert_sensitivity))
        .route("/health", get(get_health));

    if state.admin_token.is_some() {
        router = router.route("/games/:name", put(update_game));
    }

    router.with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct GameListResponse {
    pub games: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewGameRequest {
    pub game_name: String,
    pub yaw_multiplier: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGameRequest {
    pub yaw_multiplier: f64,
}

#[derive(Debug, Serialize)]
pub struct GameFactorResponse {
    pub game_name: String,
    pub yaw_multiplier: f64,
}

impl From<GameFactor> for GameFactorResponse {
    fn from(f: GameFactor) -> Self {
        Self {
            game_name: f.display_name(),
            yaw_multiplier: f.yaw_multiplier(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub games: usize,
    pub conversions_ok: u64,
    pub conversions_rejected: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_games(State(state): State<ApiState>) -> Result<Json<GameListResponse>> {
    let games = state.catalog.list_all().await?;
    Ok(Json(GameListResponse { games }))
}

async fn convert_sensitivity(
    State(state): State<ApiState>,
    AppJson(req): AppJson<ConversionRequest>,
) -> Result<Json<ConversionResult>> {
    match resolve_and_convert(&state.catalog, &req).await {
        Ok(result) => {
            state.health.inc_ok();
            debug!(
                source_game = %req.source_game,
                target_game = %req.target_game,
                target_sensitivity = result.target_sensitivity,
                cm_360 = result.cm_360,
                "conversion"
            );
            Ok(Json(result))
        }
        Err(e) => {
            state.health.inc_rejected();
            warn!("Conversion rejected: {e}");
            Err(e)
        }
    }
}

/// Resolve both games (source first) and run the conversion.
async fn resolve_and_convert(
    catalog: &GameCatalog,
    req: &ConversionRequest,
) -> Result<ConversionResult> {
    let source_factor = catalog.lookup(&req.source_game).await?;
    let target_factor = catalog.lookup(&req.target_game).await?;
    convert(req, source_factor, target_factor)
}

async fn add_game(
    State(state): State<ApiState>,
    headers: HeaderMap,
    AppJson(body): AppJson<NewGameRequest>,
) -> Result<(StatusCode, Json<GameFactorResponse>)> {
    require_admin(&state, &headers)?;
    let factor = state.catalog.add(&body.game_name, body.yaw_multiplier).await?;
    Ok((StatusCode::CREATED, Json(factor.into())))
}

async fn update_game(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    AppJson(body): AppJson<UpdateGameRequest>,
) -> Result<Json<GameFactorResponse>> {
    require_admin(&state, &headers)?;
    let factor = state.catalog.update(&name, body.yaw_multiplier).await?;
    Ok(Json(factor.into()))
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let status = if state.catalog.store_reachable().await {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status,
        games: state.catalog.len(),
        conversions_ok: state.health.conversions_ok(),
        conversions_rejected: state.health.conversions_rejected(),
    })
}

fn require_admin(state: &ApiState, headers: &HeaderMap) -> Result<()> {
    let expected = state.admin_token.as_deref().ok_or(AppError::Unauthorized)?;
    let given = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    if given != expected {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::seed_defaults;
    use crate::db::{memory_pool, FactorRepo};

    async fn test_app(admin_token: Option<&str>) -> Router {
        let catalog = GameCatalog::new(FactorRepo::new(memory_pool().await));
        seed_defaults(&catalog).await.unwrap();
        router(ApiState {
            catalog,
            health: Arc::new(HealthState::new()),
            admin_token: admin_token.map(Arc::from),
        })
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(t) = token {
            builder = builder.header(ADMIN_TOKEN_HEADER, t);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn conversion(source: &str, target: &str, sens: f64, src_dpi: i64, tgt_dpi: i64) -> Value {
        json!({
            "source_game": source,
            "target_game": target,
            "source_sensitivity": sens,
            "source_mouse_dpi": src_dpi,
            "target_mouse_dpi": tgt_dpi,
        })
    }

    #[tokio::test]
    async fn games_lists_seeded_display_names() {
        let app = test_app(None).await;
        let (status, body) = send(&app, get_req("/games")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "games": [
                "Valorant", "Csgo", "Apex legends", "Overwatch", "Fortnite",
                "Pubg", "Battlefield", "Destiny 2", "Call of duty"
            ]})
        );
    }

    #[tokio::test]
    async fn convert_valorant_to_csgo() {
        let app = test_app(None).await;
        let req = json_req(
            "POST",
            "/convert_sensitivity",
            conversion("valorant", "csgo", 0.35, 800, 800),
            None,
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "target_sensitivity": 1.1136, "cm_360": 99.79, "in_360": 39.29 })
        );
    }

    #[tokio::test]
    async fn game_names_match_any_case() {
        let app = test_app(None).await;
        for name in ["VALORANT", "valorant", "Valorant"] {
            let req = json_req(
                "POST",
                "/convert_sensitivity",
                conversion(name, "CSGO", 0.35, 800, 800),
                None,
            );
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::OK, "{name}");
            assert_eq!(body["target_sensitivity"], json!(1.1136));
        }
    }

    #[tokio::test]
    async fn unknown_game_is_bad_request() {
        let app = test_app(None).await;
        let req = json_req(
            "POST",
            "/convert_sensitivity",
            conversion("Valorent", "csgo", 0.35, 800, 800),
            None,
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], json!("Unknown game: Valorent"));
    }

    #[tokio::test]
    async fn non_positive_inputs_are_bad_request() {
        let app = test_app(None).await;
        for body in [
            conversion("valorant", "csgo", 0.0, 800, 800),
            conversion("valorant", "csgo", -1.0, 800, 800),
            conversion("valorant", "csgo", 0.35, 0, 800),
            conversion("valorant", "csgo", 0.35, 800, -400),
        ] {
            let req = json_req("POST", "/convert_sensitivity", body.clone(), None);
            let (status, resp) = send(&app, req).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(resp["detail"].as_str().unwrap().starts_with("Invalid magnitude"));
        }
    }

    #[tokio::test]
    async fn malformed_bodies_use_detail_format() {
        let app = test_app(None).await;

        let fractional_dpi = json!({
            "source_game": "valorant",
            "target_game": "csgo",
            "source_sensitivity": 0.35,
            "source_mouse_dpi": 800.5,
            "target_mouse_dpi": 800,
        });
        let req = json_req("POST", "/convert_sensitivity", fractional_dpi, None);
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().starts_with("Invalid request body"));

        let missing_field = json!({ "source_game": "valorant", "target_game": "csgo" });
        let req = json_req("POST", "/convert_sensitivity", missing_field, None);
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let req = Request::builder()
            .method("POST")
            .uri("/convert_sensitivity")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let req = Request::builder()
            .method("POST")
            .uri("/convert_sensitivity")
            .body(Body::from(conversion("valorant", "csgo", 0.35, 800, 800).to_string()))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn non_ascii_game_round_trips_through_admin_and_convert() {
        let app = test_app(Some("secret")).await;
        let add = json!({ "game_name": "Éclipse", "yaw_multiplier": 0.07 });
        let (status, _) = send(&app, json_req("POST", "/games", add, Some("secret"))).await;
        assert_eq!(status, StatusCode::CREATED);

        let req = json_req("POST", "/convert_sensitivity", conversion("ÉCLIPSE", "valorant", 0.35, 800, 800), None);
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["target_sensitivity"], json!(0.35));
    }

    #[tokio::test]
    async fn health_counts_conversions() {
        let app = test_app(None).await;
        let ok = json_req("POST", "/convert_sensitivity", conversion("pubg", "fortnite", 1.0, 400, 800), None);
        let bad = json_req("POST", "/convert_sensitivity", conversion("halo", "fortnite", 1.0, 400, 800), None);
        send(&app, ok).await;
        send(&app, bad).await;

        let (status, body) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["games"], json!(9));
        assert_eq!(body["conversions_ok"], json!(1));
        assert_eq!(body["conversions_rejected"], json!(1));
    }

    #[tokio::test]
    async fn admin_routes_absent_without_token() {
        let app = test_app(None).await;
        let req = json_req("PUT", "/games/pubg", json!({ "yaw_multiplier": 0.03 }), Some("x"));
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let req = json_req("POST", "/games", json!({ "game_name": "Halo", "yaw_multiplier": 0.0225 }), None);
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn admin_add_and_update() {
        let app = test_app(Some("secret")).await;

        let add = json!({ "game_name": "Halo", "yaw_multiplier": 0.0225 });
        let (status, _) = send(&app, json_req("POST", "/games", add.clone(), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, json_req("POST", "/games", add.clone(), Some("wrong"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, json_req("POST", "/games", add.clone(), Some("secret"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "game_name": "Halo", "yaw_multiplier": 0.0225 }));

        let (status, _) = send(&app, json_req("POST", "/games", add, Some("secret"))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let update = json!({ "yaw_multiplier": 0.044 });
        let (status, body) = send(&app, json_req("PUT", "/games/CSGO", update.clone(), Some("secret"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["yaw_multiplier"], json!(0.044));

        let (status, _) = send(&app, json_req("PUT", "/games/quake", update, Some("secret"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // new CSGO multiplier is used right away
        let req = json_req("POST", "/convert_sensitivity", conversion("valorant", "csgo", 0.35, 800, 800), None);
        let (_, body) = send(&app, req).await;
        assert_eq!(body["target_sensitivity"], json!(0.5568));
    }
}
