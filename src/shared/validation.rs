use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

lazy_static! {
    /// Phone numbers: digits, `+`, parentheses, hyphens and spaces
    /// - Valid: "+15551234567", "(555) 123-4567", "555 1234"
    /// - Invalid: "555.1234", "call me", "+1#555", "555\t1234"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^[0-9+() -]+$").unwrap();

    /// Upload file names must end in an accepted image extension (case-insensitive)
    pub static ref IMAGE_FILENAME_REGEX: Regex =
        Regex::new(r"(?i)\.(png|jpg|jpeg|webp|gif)$").unwrap();
}

/// Parses a client-supplied record id; malformed ids are a client error
pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("Invalid id '{}'", raw)))
}
