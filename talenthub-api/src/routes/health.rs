/// Liveness and readiness probe
///
/// `GET /health` answers even when the database is unreachable, so load
/// balancers can tell a slow dependency from a dead process:
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "talenthub-api",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
}

/// Reports `healthy` when the database answers a probe query, `degraded`
/// otherwise. Always returns 200; the body carries the distinction.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(error) => {
            tracing::warn!(%error, "health probe could not reach the database");
            "disconnected"
        }
    };

    let status = if database == "connected" { "healthy" } else { "degraded" };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    }))
}
