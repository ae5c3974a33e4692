use axum::{
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppMultipart;
use crate::features::volunteers::models::VolunteerApplication;
use crate::modules::storage::Folder;
use crate::shared::upload::{UploadForm, UploadedImage};
use crate::shared::validation::PHONE_REGEX;

/// Applicant details submitted alongside a certificate
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CreateVolunteerApplicationDto {
    #[validate(length(min = 2, max = 50, message = "firstName must be 2-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 2, max = 50, message = "lastName must be 2-50 characters"))]
    pub last_name: String,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    #[validate(
        length(min = 5, max = 25, message = "phoneNumber must be 5-25 characters"),
        regex(
            path = *PHONE_REGEX,
            message = "phoneNumber may only contain digits, spaces, +, (, ) and -"
        )
    )]
    pub phone_number: String,

    #[validate(length(min = 2, max = 100, message = "city must be 2-100 characters"))]
    pub city: String,

    pub send_sms: bool,
}

impl CreateVolunteerApplicationDto {
    fn from_form(form: &UploadForm) -> Result<Self, AppError> {
        Ok(Self {
            first_name: form.required_text("firstName")?,
            last_name: form.required_text("lastName")?,
            email: form.required_text("email")?.to_lowercase(),
            phone_number: form.required_text("phoneNumber")?,
            city: form.required_text("city")?,
            send_sms: form.optional_bool("sendSMS")?,
        })
    }
}

/// Upload form for OpenAPI documentation only.
/// The handler reads the body through [`VolunteerUpload`].
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CreateVolunteerApplicationForm {
    /// Photo or scan of the volunteer fire-service certificate
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    #[schema(example = "Maria", min_length = 2, max_length = 50)]
    pub first_name: String,
    #[schema(example = "Lopez", min_length = 2, max_length = 50)]
    pub last_name: String,
    #[schema(example = "maria.lopez@example.com")]
    pub email: String,
    #[schema(example = "+1 (555) 123-4567", min_length = 5, max_length = 25)]
    pub phone_number: String,
    #[schema(example = "San Francisco", min_length = 2, max_length = 100)]
    pub city: String,
    /// Opt into SMS alerts for the next 24 hours
    #[serde(rename = "sendSMS")]
    pub send_sms: Option<bool>,
}

/// A structurally valid volunteer application upload
#[derive(Debug)]
pub struct VolunteerUpload {
    pub image: UploadedImage,
    pub application: CreateVolunteerApplicationDto,
}

impl VolunteerUpload {
    pub fn from_form(mut form: UploadForm) -> Result<Self, AppError> {
        let image = form.take_image()?;
        image.validate()?;

        let application = CreateVolunteerApplicationDto::from_form(&form)?;
        application
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(Self { image, application })
    }
}

impl<S> FromRequest<S> for VolunteerUpload
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

/// Query params for listing volunteers
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListByCityQuery {
    /// City to match, case-insensitive
    #[validate(length(min = 2, max = 100, message = "city must be 2-100 characters"))]
    pub city: String,
}

/// Query params for the SMS opt-in endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SendSmsQuery {
    /// Volunteer id
    pub id: String,
}

/// Response DTO for a volunteer application
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerApplicationDto {
    pub id: Uuid,
    #[schema(example = "1725649876543-123456789.png")]
    pub filename: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub city: String,
    #[serde(rename = "sendSMS")]
    pub send_sms: bool,
    #[serde(rename = "sendSMSSetAt")]
    pub send_sms_set_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Where the stored certificate can be fetched
    #[schema(example = "/uploads/certificates/1725649876543-123456789.png")]
    pub url: String,
}

impl From<VolunteerApplication> for VolunteerApplicationDto {
    fn from(v: VolunteerApplication) -> Self {
        let url = v
            .file_url
            .unwrap_or_else(|| Folder::Certificates.default_url(&v.filename));

        Self {
            id: v.id,
            filename: v.filename,
            first_name: v.first_name,
            last_name: v.last_name,
            email: v.email,
            phone_number: v.phone_number,
            city: v.city,
            send_sms: v.send_sms,
            send_sms_set_at: v.send_sms_set_at,
            created_at: v.created_at,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate_form() -> UploadForm {
        UploadForm::with_file(UploadedImage {
            original_name: "certificate.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, 0x50, 0x4E, 0x47],
        })
        .with_field("firstName", "Maria")
        .with_field("lastName", "Lopez")
        .with_field("email", "  Maria.Lopez@Example.COM ")
        .with_field("phoneNumber", "+1 (555) 123-4567")
        .with_field("city", "San Francisco")
    }

    #[test]
    fn test_from_form_normalizes_email_and_defaults_send_sms() {
        let upload = VolunteerUpload::from_form(certificate_form()).unwrap();

        assert_eq!(upload.application.email, "maria.lopez@example.com");
        assert!(!upload.application.send_sms);
    }

    #[test]
    fn test_from_form_reads_send_sms() {
        let upload =
            VolunteerUpload::from_form(certificate_form().with_field("sendSMS", "true")).unwrap();
        assert!(upload.application.send_sms);

        let err = VolunteerUpload::from_form(certificate_form().with_field("sendSMS", "maybe"))
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_from_form_applies_field_constraints() {
        let long_name = "x".repeat(51);
        let cases = [
            ("firstName", "M"),
            ("lastName", long_name.as_str()),
            ("email", "not-an-email"),
            ("phoneNumber", "555.1234"),
            ("phoneNumber", "1234"),
            ("phoneNumber", "555\n1234"),
            ("phoneNumber", "555\t1234"),
            ("phoneNumber", "\u{665}\u{665}\u{665}\u{661}\u{662}\u{663}\u{664}"),
            ("city", "X"),
        ];

        for (field, value) in cases {
            let result = VolunteerUpload::from_form(certificate_form().with_field(field, value));
            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "{}={:?} should fail validation",
                field,
                value
            );
        }
    }

    #[test]
    fn test_from_form_requires_fields() {
        let form = certificate_form().with_field("city", "   ");
        let err = VolunteerUpload::from_form(form).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "city is required"));
    }

    #[test]
    fn test_dto_uses_sms_field_names() {
        let now = Utc::now();
        let dto = VolunteerApplicationDto::from(VolunteerApplication {
            id: Uuid::new_v4(),
            filename: "1-2.png".to_string(),
            file_url: None,
            first_name: "Maria".to_string(),
            last_name: "Lopez".to_string(),
            email: "maria@example.com".to_string(),
            phone_number: "5551234".to_string(),
            city: "Austin".to_string(),
            send_sms: true,
            send_sms_set_at: Some(now),
            created_at: now,
        });

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["sendSMS"], true);
        assert!(json["sendSMSSetAt"].is_string());
        assert_eq!(json["phoneNumber"], "5551234");
        assert_eq!(json["url"], "/uploads/certificates/1-2.png");
    }
}
