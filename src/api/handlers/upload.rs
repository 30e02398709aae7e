use crate::AppState;
use crate::api::error::AppError;
use crate::services::ingest_service::UploadRequest;
use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub image_id: String,
    pub gcs_url: String,
}

#[utoipa::path(
    post,
    path = "/upload_image",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Image stored and recorded", body = UploadResponse),
        (status = 400, description = "Malformed body, platform or image data"),
        (status = 401, description = "Invalid API key"),
        (status = 413, description = "Body larger than the configured image limit"),
        (status = 502, description = "Object storage write failed"),
        (status = 500, description = "Metadata insert failed"),
        (status = 504, description = "Storage or metadata call timed out")
    ),
    tag = "ingest"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    // Parsed by hand so a bad body still gets the JSON error shape
    let body = body?;
    let receipt = state.ingest.ingest_body(&body).await?;

    Ok(Json(UploadResponse {
        success: true,
        image_id: receipt.image_id,
        gcs_url: receipt.gcs_url,
    }))
}

#[utoipa::path(
    options,
    path = "/upload_image",
    responses(
        (status = 204, description = "Pre-flight acknowledged")
    ),
    tag = "ingest"
)]
pub async fn upload_image_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
