/// Health check endpoint
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use workroom_shared::db::pool::health_check as db_health_check;

use crate::app::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// GET /health
///
/// Reports overall health plus database connectivity. Returns 200 even
/// when degraded; the body says what is wrong.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match db_health_check(&state.db).await {
        Ok(()) => "connected".to_string(),
        Err(_) => "disconnected".to_string(),
    };

    let status = if database == "connected" {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}
