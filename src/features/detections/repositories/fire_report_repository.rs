use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::detections::models::{FireReport, NewFireReport};

/// Persistence for confirmed fire reports
#[async_trait]
pub trait FireReportRepository: Send + Sync {
    async fn create(&self, report: NewFireReport) -> Result<FireReport>;

    /// All reports, newest first
    async fn find_all(&self) -> Result<Vec<FireReport>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FireReport>>;
}

pub struct PgFireReportRepository {
    pool: PgPool,
}

impl PgFireReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FireReportRepository for PgFireReportRepository {
    async fn create(&self, report: NewFireReport) -> Result<FireReport> {
        sqlx::query_as::<_, FireReport>(
            r#"
            INSERT INTO fire_reports (filename, file_url, latitude, longitude)
            VALUES ($1, $2, $3, $4)
            RETURNING id, filename, file_url, latitude, longitude, created_at
            "#,
        )
        .bind(&report.filename)
        .bind(&report.file_url)
        .bind(report.latitude)
        .bind(report.longitude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert fire report: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_all(&self) -> Result<Vec<FireReport>> {
        sqlx::query_as::<_, FireReport>(
            r#"
            SELECT id, filename, file_url, latitude, longitude, created_at
            FROM fire_reports
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list fire reports: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FireReport>> {
        sqlx::query_as::<_, FireReport>(
            r#"
            SELECT id, filename, file_url, latitude, longitude, created_at
            FROM fire_reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get fire report: {:?}", e);
            AppError::Database(e)
        })
    }
}
