use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the Content Store is reachable.
    pub db_healthy: bool,
    /// Generation units currently running in this process.
    pub generations_in_flight: usize,
}

/// GET /health
///
/// Reports `degraded` when the Content Store is unreachable. Running units
/// are counted either way, so a drain before shutdown can be watched here.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = genstudio_db::health_check(&state.pool).await.is_ok();
    let generations_in_flight = state.tasks.in_flight().await.len();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        generations_in_flight,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
