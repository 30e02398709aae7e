use crate::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tokio::time::timeout;
use utoipa::ToSchema;

/// Object looked up to prove the bucket answers; it need not exist
const STORAGE_CHECK_KEY: &str = "health-check";

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when both backends answered, "degraded" otherwise
    pub status: String,
    pub database: String,
    pub storage: String,
    /// Why a backend is reported disconnected
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub version: String,
}

fn label(reachable: bool) -> String {
    let label = if reachable { "connected" } else { "disconnected" };
    label.to_string()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database and bucket reachable", body = HealthResponse),
        (status = 503, description = "A backend did not answer", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let limit = state.config.remote_timeout;
    let mut errors = Vec::new();

    let database = match timeout(limit, state.db.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            errors.push(format!("database: {}", e));
            false
        }
        Err(_) => {
            errors.push(format!("database: no answer within {:?}", limit));
            false
        }
    };

    let storage = match timeout(limit, state.storage.file_exists(STORAGE_CHECK_KEY)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            errors.push(format!("storage: {:#}", e));
            false
        }
        Err(_) => {
            errors.push(format!("storage: no answer within {:?}", limit));
            false
        }
    };

    for e in &errors {
        tracing::warn!("Health check failed: {}", e);
    }

    let (status, code) = if database && storage {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            database: label(database),
            storage: label(storage),
            errors,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
