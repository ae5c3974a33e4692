use utoipa::{Modify, OpenApi};

use crate::features::detections::{dtos as detections_dtos, handlers as detections_handlers};
use crate::features::volunteers::{dtos as volunteers_dtos, handlers as volunteers_handlers};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Detections
        detections_handlers::create_detection,
        detections_handlers::list_detections,
        detections_handlers::get_detection,
        // Volunteers
        volunteers_handlers::create_volunteer,
        volunteers_handlers::list_volunteers,
        volunteers_handlers::get_volunteer,
        volunteers_handlers::enable_send_sms,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            // Detections
            detections_dtos::CreateDetectionForm,
            detections_dtos::FireReportDto,
            // Volunteers
            volunteers_dtos::CreateVolunteerApplicationForm,
            volunteers_dtos::VolunteerApplicationDto,
        )
    ),
    tags(
        (name = "detections", description = "Fire reports confirmed by image classification"),
        (name = "volunteers", description = "Volunteer applications and SMS opt-in"),
    ),
    info(
        title = "Fire Guard API",
        version = "1.0.0",
        description = "Fire detection reports and volunteer firefighter registry",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
