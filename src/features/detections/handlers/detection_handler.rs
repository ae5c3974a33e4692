use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::features::detections::dtos::{CreateDetectionForm, DetectionUpload, FireReportDto};
use crate::features::detections::services::DetectionService;
use crate::shared::types::ErrorResponse;
use crate::shared::validation::parse_id;

/// Report a fire
///
/// Accepts multipart/form-data with:
/// - `file`: photo of the fire (required)
/// - `lat`: latitude between -90 and 90 (required)
/// - `lon`: longitude between -180 and 180 (required)
///
/// The photo is only stored when the vision model confirms it shows fire.
#[utoipa::path(
    post,
    path = "/detections",
    tag = "detections",
    request_body(
        content = CreateDetectionForm,
        content_type = "multipart/form-data",
        description = "Fire photo and the coordinates where it was taken",
    ),
    responses(
        (status = 201, description = "Fire report created", body = FireReportDto),
        (status = 400, description = "Invalid upload, or the image does not show fire", body = ErrorResponse),
        (status = 503, description = "Vision model or storage unavailable", body = ErrorResponse)
    )
)]
pub async fn create_detection(
    State(service): State<Arc<DetectionService>>,
    upload: DetectionUpload,
) -> Result<(StatusCode, Json<FireReportDto>)> {
    let report = service.submit(upload).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// List fire reports, newest first
#[utoipa::path(
    get,
    path = "/detections",
    tag = "detections",
    responses(
        (status = 200, description = "All fire reports", body = Vec<FireReportDto>),
    )
)]
pub async fn list_detections(
    State(service): State<Arc<DetectionService>>,
) -> Result<Json<Vec<FireReportDto>>> {
    Ok(Json(service.list().await?))
}

/// Get a fire report by id
#[utoipa::path(
    get,
    path = "/detections/{id}",
    tag = "detections",
    params(
        ("id" = String, Path, description = "Fire report id")
    ),
    responses(
        (status = 200, description = "Fire report found", body = FireReportDto),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Fire report not found", body = ErrorResponse)
    )
)]
pub async fn get_detection(
    State(service): State<Arc<DetectionService>>,
    Path(id): Path<String>,
) -> Result<Json<FireReportDto>> {
    let id = parse_id(&id)?;
    Ok(Json(service.get(id).await?))
}
