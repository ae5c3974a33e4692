/// Maximum accepted image size in bytes (10 MiB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Extra room for multipart boundaries and text fields on top of the image
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Image extensions accepted by the upload pipelines
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// URL prefix under which the local upload directory is served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

// =============================================================================
// CLASSIFICATION PROMPTS
// =============================================================================

/// Fixed instruction sent ahead of every classification question
pub const CLASSIFIER_INSTRUCTION: &str =
    "You are a strict image classifier. Answer strictly with one word: YES or NO.";

/// Question asked for fire report uploads
pub const FIRE_QUESTION: &str = "Question: Does this image clearly show active fire or wildfires \
     (visible flames or obvious wildfire smoke)?";

/// Question asked for volunteer certificate uploads
pub const CERTIFICATE_QUESTION: &str = "Question: Is this image a valid-looking volunteer \
     certificate related to firefighting or fire service (e.g., official certificate, ID card, \
     or training completion document), with clear text or seals indicating volunteer fire service?";
