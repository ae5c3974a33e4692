use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned for every failed request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    pub message: String,
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(message: String, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            message,
            errors,
        }
    }
}
