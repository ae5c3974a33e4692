//! Multipart parsing shared by the upload pipelines
//!
//! Both upload endpoints accept one `file` part plus a handful of text fields.
//! [`UploadForm::from_multipart`] drains the body, and [`UploadedImage::validate`]
//! performs the structural image checks that run before any classification.

use std::collections::HashMap;
use std::path::Path;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::shared::constants::{ALLOWED_IMAGE_EXTENSIONS, MAX_IMAGE_SIZE};
use crate::shared::validation::IMAGE_FILENAME_REGEX;

const FILE_FIELD: &str = "file";
const OCTET_STREAM: &str = "application/octet-stream";

/// An image received in a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_name: String,
    /// Content type declared by the client, if any
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Structural checks: accepted extension and size limit
    pub fn validate(&self) -> Result<()> {
        if !IMAGE_FILENAME_REGEX.is_match(&self.original_name) {
            return Err(AppError::BadRequest(format!(
                "Only image files are allowed ({})",
                ALLOWED_IMAGE_EXTENSIONS.join(", ")
            )));
        }

        if self.bytes.is_empty() {
            return Err(AppError::BadRequest("Image file is empty".to_string()));
        }

        if self.bytes.len() > MAX_IMAGE_SIZE {
            return Err(file_too_large());
        }

        Ok(())
    }

    /// Declared mime type, falling back to one inferred from the extension
    pub fn mime_type(&self) -> String {
        match self.content_type.as_deref() {
            Some(ct) if !ct.is_empty() && ct != OCTET_STREAM => ct.to_string(),
            _ => mime_type_from_name(&self.original_name).to_string(),
        }
    }
}

fn file_too_large() -> AppError {
    AppError::BadRequest(format!(
        "File too large. Maximum size is {} MB",
        MAX_IMAGE_SIZE / 1024 / 1024
    ))
}

/// Body-limit hits are reported like an oversized image
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        debug!("Multipart body exceeded the upload limit: {}", err);
        return file_too_large();
    }

    debug!("{}: {}", context, err);
    AppError::BadRequest(format!("{}: {}", context, err))
}

pub fn mime_type_from_name(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => OCTET_STREAM,
    }
}

/// The drained contents of an upload request
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedImage>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("Failed to read multipart data", e))?
        {
            let field_name = field.name().unwrap_or("").to_string();

            if field_name == FILE_FIELD {
                let content_type = field.content_type().map(|s| s.to_string());
                let original_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;

                form.file = Some(UploadedImage {
                    original_name,
                    content_type,
                    bytes: data.to_vec(),
                });
            } else if !field_name.is_empty() {
                let text = field.text().await.map_err(|e| {
                    multipart_error(&format!("Failed to read field '{}'", field_name), e)
                })?;
                form.fields.insert(field_name, text);
            }
        }

        Ok(form)
    }

    /// Takes the uploaded image, rejecting the request when none was attached
    pub fn take_image(&mut self) -> Result<UploadedImage> {
        self.file
            .take()
            .filter(|file| !file.original_name.is_empty() || !file.bytes.is_empty())
            .ok_or_else(|| AppError::BadRequest("Image file is required".to_string()))
    }

    /// Text field value with surrounding whitespace removed; blank counts as absent
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn required_text(&self, name: &str) -> Result<String> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))
    }

    pub fn required_number(&self, name: &str) -> Result<f64> {
        let raw = self.required_text(name)?;
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| AppError::BadRequest(format!("{} must be a number", name)))
    }

    /// Optional boolean; absent or blank means `false`
    pub fn optional_bool(&self, name: &str) -> Result<bool> {
        match self.text(name).map(|v| v.to_lowercase()).as_deref() {
            None => Ok(false),
            Some("true") | Some("1") | Some("on") | Some("yes") => Ok(true),
            Some("false") | Some("0") | Some("off") | Some("no") => Ok(false),
            Some(_) => Err(AppError::BadRequest(format!(
                "{} must be a boolean value",
                name
            ))),
        }
    }

    #[cfg(test)]
    pub fn with_file(image: UploadedImage) -> Self {
        Self {
            file: Some(image),
            fields: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }
}
