use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::volunteers::dtos::{VolunteerApplicationDto, VolunteerUpload};
use crate::features::volunteers::models::NewVolunteerApplication;
use crate::features::volunteers::repositories::VolunteerRepository;
use crate::features::volunteers::workers::SmsOptInScheduler;
use crate::modules::storage::{BlobStore, Folder};
use crate::modules::vision::ImageClassifier;
use crate::shared::constants::CERTIFICATE_QUESTION;

/// Volunteer application pipeline and SMS opt-in management
pub struct VolunteerService {
    classifier: Arc<dyn ImageClassifier>,
    blob_store: Arc<dyn BlobStore>,
    repository: Arc<dyn VolunteerRepository>,
    scheduler: Arc<SmsOptInScheduler>,
}

impl VolunteerService {
    pub fn new(
        classifier: Arc<dyn ImageClassifier>,
        blob_store: Arc<dyn BlobStore>,
        repository: Arc<dyn VolunteerRepository>,
        scheduler: Arc<SmsOptInScheduler>,
    ) -> Self {
        Self {
            classifier,
            blob_store,
            repository,
            scheduler,
        }
    }

    /// Accepts an already validated application.
    ///
    /// Nothing is stored unless the certificate is recognised. An opt-in
    /// requested at creation arms the expiry straight away.
    pub async fn submit(&self, upload: VolunteerUpload) -> Result<VolunteerApplicationDto> {
        let VolunteerUpload { image, application } = upload;
        let mime_type = image.mime_type();

        let is_certificate = self
            .classifier
            .classify(&image.bytes, &mime_type, CERTIFICATE_QUESTION)
            .await?;

        if !is_certificate {
            info!("Rejected volunteer certificate '{}'", image.original_name);
            return Err(AppError::BadRequest(
                "Image does not look like a volunteer fire certificate".to_string(),
            ));
        }

        let stored = self
            .blob_store
            .save(
                Folder::Certificates,
                image.bytes,
                &image.original_name,
                &mime_type,
            )
            .await?;

        let volunteer = self
            .repository
            .create(NewVolunteerApplication {
                filename: stored.filename.clone(),
                file_url: stored.remote_url(),
                first_name: application.first_name,
                last_name: application.last_name,
                email: application.email,
                phone_number: application.phone_number,
                city: application.city,
                send_sms: application.send_sms,
            })
            .await
            .inspect_err(|_| {
                warn!(
                    "Stored certificate '{}' on {} is orphaned: application was not saved",
                    stored.filename,
                    self.blob_store.backend_name()
                )
            })?;

        info!(
            "Volunteer application {} created for {}",
            volunteer.id, volunteer.city
        );

        if volunteer.send_sms {
            self.scheduler.arm(volunteer.id);
        }

        Ok(volunteer.into())
    }

    /// Volunteers in `city` that are not currently opted into SMS, newest first
    pub async fn list_by_city(&self, city: &str) -> Result<Vec<VolunteerApplicationDto>> {
        let volunteers = self.repository.find_by_city(city.trim()).await?;
        Ok(volunteers
            .into_iter()
            .map(VolunteerApplicationDto::from)
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<VolunteerApplicationDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(VolunteerApplicationDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Volunteer '{}' not found", id)))
    }

    /// Opts a volunteer into SMS for a fresh window
    pub async fn enable_send_sms(&self, id: Uuid) -> Result<VolunteerApplicationDto> {
        let volunteer = self
            .repository
            .set_send_sms_true(id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Volunteer not found".to_string()))?;

        self.scheduler.arm(volunteer.id);
        Ok(volunteer.into())
    }

    /// Opts a volunteer out immediately and drops any pending expiry
    #[allow(dead_code)] // no HTTP route; the public reset endpoint opts in
    pub async fn reset_send_sms(&self, id: Uuid) -> Result<VolunteerApplicationDto> {
        self.scheduler.cancel(id);

        self.repository
            .reset_send_sms(id)
            .await?
            .map(VolunteerApplicationDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Volunteer '{}' not found", id)))
    }
}
