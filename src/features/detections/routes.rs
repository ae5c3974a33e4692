use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::detections::handlers;
use crate::features::detections::services::DetectionService;
use crate::shared::constants::{MAX_IMAGE_SIZE, MULTIPART_OVERHEAD};

/// Create routes for the detections feature
pub fn routes(service: Arc<DetectionService>) -> Router {
    Router::new()
        .route(
            "/detections",
            post(handlers::create_detection)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + MULTIPART_OVERHEAD))
                .get(handlers::list_detections),
        )
        .route("/detections/{id}", get(handlers::get_detection))
        .with_state(service)
}
