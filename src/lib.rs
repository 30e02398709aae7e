pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::IngestConfig;
use crate::services::ingest_service::IngestService;
use crate::services::storage::StorageService;
use axum::{
    Json, Router,
    middleware::from_fn,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::upload_image,
        api::handlers::upload::upload_image_preflight,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            services::ingest_service::UploadRequest,
            api::handlers::upload::UploadResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "ingest", description = "Image ingestion endpoint"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub ingest: Arc<IngestService>,
    pub config: IngestConfig,
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/upload_image",
            post(api::handlers::upload::upload_image)
                .options(api::handlers::upload::upload_image_preflight),
        )
        .layer(from_fn(api::middleware::cors::allow_any_origin))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_image_size,
        ))
        .with_state(state)
}
