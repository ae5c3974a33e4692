use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a confirmed fire report
#[derive(Debug, Clone, FromRow)]
pub struct FireReport {
    pub id: Uuid,
    pub filename: String,
    /// Only set when the image lives in remote blob storage
    pub file_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a report
#[derive(Debug, Clone)]
pub struct NewFireReport {
    pub filename: String,
    pub file_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}
