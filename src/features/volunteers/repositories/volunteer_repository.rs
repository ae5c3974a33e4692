use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::volunteers::models::{NewVolunteerApplication, VolunteerApplication};

const COLUMNS: &str = "id, filename, file_url, first_name, last_name, email, phone_number, \
                       city, send_sms, send_sms_set_at, created_at";

/// Persistence for volunteer applications
#[async_trait]
pub trait VolunteerRepository: Send + Sync {
    /// Stamps `send_sms_set_at` with the creation time when `send_sms` is requested
    async fn create(&self, application: NewVolunteerApplication) -> Result<VolunteerApplication>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VolunteerApplication>>;

    /// Case-insensitive city match, skipping volunteers already opted into SMS, newest first
    async fn find_by_city(&self, city: &str) -> Result<Vec<VolunteerApplication>>;

    async fn find_send_sms_enabled(&self) -> Result<Vec<VolunteerApplication>>;

    /// Switches `send_sms` on and restarts its timestamp
    async fn set_send_sms_true(&self, id: Uuid) -> Result<Option<VolunteerApplication>>;

    /// Switches `send_sms` off unconditionally
    #[allow(dead_code)]
    async fn reset_send_sms(&self, id: Uuid) -> Result<Option<VolunteerApplication>>;

    /// Switches `send_sms` off only while it is still on.
    /// Returns whether a row changed.
    async fn expire_send_sms(&self, id: Uuid) -> Result<bool>;
}

pub struct PgVolunteerRepository {
    pool: PgPool,
}

impl PgVolunteerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VolunteerRepository for PgVolunteerRepository {
    async fn create(&self, application: NewVolunteerApplication) -> Result<VolunteerApplication> {
        let sql = format!(
            r#"
            INSERT INTO volunteer_applications
                (filename, file_url, first_name, last_name, email, phone_number, city,
                 send_sms, send_sms_set_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $8 THEN NOW() ELSE NULL END)
            RETURNING {}
            "#,
            COLUMNS
        );

        sqlx::query_as::<_, VolunteerApplication>(&sql)
            .bind(&application.filename)
            .bind(&application.file_url)
            .bind(&application.first_name)
            .bind(&application.last_name)
            .bind(&application.email)
            .bind(&application.phone_number)
            .bind(&application.city)
            .bind(application.send_sms)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert volunteer application: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VolunteerApplication>> {
        let sql = format!(
            "SELECT {} FROM volunteer_applications WHERE id = $1",
            COLUMNS
        );

        sqlx::query_as::<_, VolunteerApplication>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get volunteer application: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_city(&self, city: &str) -> Result<Vec<VolunteerApplication>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM volunteer_applications
            WHERE LOWER(city) = LOWER($1) AND send_sms = FALSE
            ORDER BY created_at DESC
            "#,
            COLUMNS
        );

        sqlx::query_as::<_, VolunteerApplication>(&sql)
            .bind(city)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list volunteers by city: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_send_sms_enabled(&self) -> Result<Vec<VolunteerApplication>> {
        let sql = format!(
            "SELECT {} FROM volunteer_applications WHERE send_sms = TRUE",
            COLUMNS
        );

        sqlx::query_as::<_, VolunteerApplication>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list SMS opted-in volunteers: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn set_send_sms_true(&self, id: Uuid) -> Result<Option<VolunteerApplication>> {
        let sql = format!(
            r#"
            UPDATE volunteer_applications
            SET send_sms = TRUE, send_sms_set_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        );

        sqlx::query_as::<_, VolunteerApplication>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to enable send_sms: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn reset_send_sms(&self, id: Uuid) -> Result<Option<VolunteerApplication>> {
        let sql = format!(
            r#"
            UPDATE volunteer_applications
            SET send_sms = FALSE, send_sms_set_at = NULL
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        );

        sqlx::query_as::<_, VolunteerApplication>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to reset send_sms: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn expire_send_sms(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE volunteer_applications
            SET send_sms = FALSE, send_sms_set_at = NULL
            WHERE id = $1 AND send_sms = TRUE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to expire send_sms: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}
