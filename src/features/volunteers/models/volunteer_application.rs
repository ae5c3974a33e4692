use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an accepted volunteer application
#[derive(Debug, Clone, FromRow)]
pub struct VolunteerApplication {
    pub id: Uuid,
    pub filename: String,
    /// Only set when the certificate lives in remote blob storage
    pub file_url: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub city: String,
    pub send_sms: bool,
    /// When `send_sms` was last switched on; `None` whenever `send_sms` is false
    pub send_sms_set_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating an application
#[derive(Debug, Clone)]
pub struct NewVolunteerApplication {
    pub filename: String,
    pub file_url: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub city: String,
    pub send_sms: bool,
}
