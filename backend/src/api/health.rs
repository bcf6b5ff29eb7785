//! Health check endpoints

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;
use crate::db::migrations::schema_version;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub database: bool,
    /// Latest applied migration
    pub schema_version: Option<String>,
}

/// Liveness: OK whenever the process is serving requests
async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness: the database answers and the schema is migrated
async fn readyz(State(state): State<AppState>) -> Json<ReadyResponse> {
    let (database, schema_version) = match schema_version(state.db.pool()).await {
        Ok(version) => (true, version),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (false, None)
        }
    };

    Json(ReadyResponse {
        ready: database && schema_version.is_some(),
        database,
        schema_version,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
