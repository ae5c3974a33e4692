use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::volunteers::dtos::{
    CreateVolunteerApplicationForm, ListByCityQuery, SendSmsQuery, VolunteerApplicationDto,
    VolunteerUpload,
};
use crate::features::volunteers::services::VolunteerService;
use crate::shared::types::ErrorResponse;
use crate::shared::validation::parse_id;

/// Apply as a volunteer
///
/// Accepts multipart/form-data with:
/// - `file`: certificate image (required)
/// - `firstName`, `lastName`, `email`, `phoneNumber`, `city` (required)
/// - `sendSMS`: opt into SMS alerts (optional, defaults to false)
#[utoipa::path(
    post,
    path = "/volunteers",
    tag = "volunteers",
    request_body(
        content = CreateVolunteerApplicationForm,
        content_type = "multipart/form-data",
        description = "Certificate image and applicant details",
    ),
    responses(
        (status = 201, description = "Application accepted", body = VolunteerApplicationDto),
        (status = 400, description = "Invalid upload, or the image is not a certificate", body = ErrorResponse),
        (status = 503, description = "Vision model or storage unavailable", body = ErrorResponse)
    )
)]
pub async fn create_volunteer(
    State(service): State<Arc<VolunteerService>>,
    upload: VolunteerUpload,
) -> Result<(StatusCode, Json<VolunteerApplicationDto>)> {
    let volunteer = service.submit(upload).await?;
    Ok((StatusCode::CREATED, Json(volunteer)))
}

/// List volunteers by city
///
/// Volunteers currently opted into SMS are left out.
#[utoipa::path(
    get,
    path = "/volunteers",
    tag = "volunteers",
    params(ListByCityQuery),
    responses(
        (status = 200, description = "Matching volunteers, newest first", body = Vec<VolunteerApplicationDto>),
        (status = 400, description = "Missing or invalid city", body = ErrorResponse)
    )
)]
pub async fn list_volunteers(
    State(service): State<Arc<VolunteerService>>,
    AppQuery(query): AppQuery<ListByCityQuery>,
) -> Result<Json<Vec<VolunteerApplicationDto>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(service.list_by_city(&query.city).await?))
}

/// Get a volunteer application by id
#[utoipa::path(
    get,
    path = "/volunteers/{id}",
    tag = "volunteers",
    params(
        ("id" = String, Path, description = "Volunteer id")
    ),
    responses(
        (status = 200, description = "Volunteer found", body = VolunteerApplicationDto),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Volunteer not found", body = ErrorResponse)
    )
)]
pub async fn get_volunteer(
    State(service): State<Arc<VolunteerService>>,
    Path(id): Path<String>,
) -> Result<Json<VolunteerApplicationDto>> {
    let id = parse_id(&id)?;
    Ok(Json(service.get(id).await?))
}

/// Opt a volunteer into SMS
///
/// Sets `sendSMS` and starts a fresh expiry window, replacing any window that
/// was already running.
#[utoipa::path(
    get,
    path = "/volunteers/send-sms/reset",
    tag = "volunteers",
    params(SendSmsQuery),
    responses(
        (status = 200, description = "Volunteer opted in", body = VolunteerApplicationDto),
        (status = 400, description = "Unknown or malformed id", body = ErrorResponse)
    )
)]
pub async fn enable_send_sms(
    State(service): State<Arc<VolunteerService>>,
    AppQuery(query): AppQuery<SendSmsQuery>,
) -> Result<Json<VolunteerApplicationDto>> {
    let id = parse_id(&query.id)?;
    Ok(Json(service.enable_send_sms(id).await?))
}
