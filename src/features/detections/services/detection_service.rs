use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::detections::dtos::{DetectionUpload, FireReportDto};
use crate::features::detections::models::NewFireReport;
use crate::features::detections::repositories::FireReportRepository;
use crate::modules::storage::{BlobStore, Folder};
use crate::modules::vision::ImageClassifier;
use crate::shared::constants::FIRE_QUESTION;

/// Fire report pipeline: classify, store, persist
pub struct DetectionService {
    classifier: Arc<dyn ImageClassifier>,
    blob_store: Arc<dyn BlobStore>,
    repository: Arc<dyn FireReportRepository>,
}

impl DetectionService {
    pub fn new(
        classifier: Arc<dyn ImageClassifier>,
        blob_store: Arc<dyn BlobStore>,
        repository: Arc<dyn FireReportRepository>,
    ) -> Self {
        Self {
            classifier,
            blob_store,
            repository,
        }
    }

    /// Accepts an already validated upload.
    ///
    /// A negative classification stops the pipeline before anything is written.
    pub async fn submit(&self, upload: DetectionUpload) -> Result<FireReportDto> {
        let DetectionUpload { image, detection } = upload;
        let mime_type = image.mime_type();

        let is_fire = self
            .classifier
            .classify(&image.bytes, &mime_type, FIRE_QUESTION)
            .await?;

        if !is_fire {
            info!("Rejected fire report upload '{}'", image.original_name);
            return Err(AppError::BadRequest("Image does not show fire".to_string()));
        }

        let stored = self
            .blob_store
            .save(Folder::Fires, image.bytes, &image.original_name, &mime_type)
            .await?;

        let report = self
            .repository
            .create(NewFireReport {
                filename: stored.filename.clone(),
                file_url: stored.remote_url(),
                latitude: detection.lat,
                longitude: detection.lon,
            })
            .await
            .inspect_err(|_| {
                warn!(
                    "Stored fire image '{}' on {} is orphaned: report was not saved",
                    stored.filename,
                    self.blob_store.backend_name()
                )
            })?;

        info!(
            "Fire report {} created at ({}, {})",
            report.id, report.latitude, report.longitude
        );

        Ok(report.into())
    }

    /// All reports, newest first
    pub async fn list(&self) -> Result<Vec<FireReportDto>> {
        let reports = self.repository.find_all().await?;
        Ok(reports.into_iter().map(FireReportDto::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<FireReportDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(FireReportDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Fire report '{}' not found", id)))
    }
}
