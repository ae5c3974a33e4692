use axum::{
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppMultipart;
use crate::features::detections::models::FireReport;
use crate::modules::storage::Folder;
use crate::shared::upload::{UploadForm, UploadedImage};

/// Coordinates submitted with a fire photo
#[derive(Debug, Clone, Copy, PartialEq, Validate)]
pub struct CreateDetectionDto {
    #[validate(range(min = -90.0, max = 90.0, message = "lat must be between -90 and 90"))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "lon must be between -180 and 180"))]
    pub lon: f64,
}

/// Upload form for OpenAPI documentation only.
/// The handler reads the body through [`DetectionUpload`].
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateDetectionForm {
    /// Photo of the fire (png, jpg, jpeg, webp or gif, max 10 MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Latitude in degrees
    #[schema(example = 37.7749)]
    pub lat: f64,
    /// Longitude in degrees
    #[schema(example = json!(-122.4194))]
    pub lon: f64,
}

/// A structurally valid fire report upload
#[derive(Debug)]
pub struct DetectionUpload {
    pub image: UploadedImage,
    pub detection: CreateDetectionDto,
}

impl DetectionUpload {
    pub fn from_form(mut form: UploadForm) -> Result<Self, AppError> {
        let image = form.take_image()?;
        image.validate()?;

        let detection = CreateDetectionDto {
            lat: form.required_number("lat")?,
            lon: form.required_number("lon")?,
        };
        detection
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(Self { image, detection })
    }
}

impl<S> FromRequest<S> for DetectionUpload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AppMultipart(multipart) = AppMultipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let form = UploadForm::from_multipart(multipart)
            .await
            .map_err(IntoResponse::into_response)?;

        Self::from_form(form).map_err(IntoResponse::into_response)
    }
}

/// Response DTO for a fire report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FireReportDto {
    #[schema(example = "0199a1d2-7c3e-7b1a-9f10-2f6c1d2e3f40")]
    pub id: Uuid,
    #[schema(example = "1725649876543-123456789.jpg")]
    pub filename: String,
    #[schema(example = 37.7749)]
    pub lat: f64,
    #[schema(example = json!(-122.4194))]
    pub lon: f64,
    pub created_at: DateTime<Utc>,
    /// Where the stored image can be fetched
    #[schema(example = "/uploads/fires/1725649876543-123456789.jpg")]
    pub url: String,
}

impl From<FireReport> for FireReportDto {
    fn from(report: FireReport) -> Self {
        let url = report
            .file_url
            .unwrap_or_else(|| Folder::Fires.default_url(&report.filename));

        Self {
            id: report.id,
            filename: report.filename,
            lat: report.latitude,
            lon: report.longitude,
            created_at: report.created_at,
            url,
        }
    }
}
