/// Liveness endpoints
///
/// # Endpoints
///
/// - `GET /` - Plain-text banner
/// - `GET /health` - Service and database status
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use eduagent_shared::db::pool::health_check as ping_database;
use serde::{Deserialize, Serialize};

pub const BANNER: &str = "EduAgent API is running";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,

    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,
}

pub async fn banner() -> &'static str {
    BANNER
}

/// Reports `degraded` instead of failing when the database is down, so the
/// process stays observable while the pool reconnects.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match ping_database(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    })
}
