use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::volunteers::handlers;
use crate::features::volunteers::services::VolunteerService;
use crate::shared::constants::{MAX_IMAGE_SIZE, MULTIPART_OVERHEAD};

/// Create routes for the volunteers feature
pub fn routes(service: Arc<VolunteerService>) -> Router {
    Router::new()
        .route(
            "/volunteers",
            post(handlers::create_volunteer)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + MULTIPART_OVERHEAD))
                .get(handlers::list_volunteers),
        )
        .route("/volunteers/send-sms/reset", get(handlers::enable_send_sms))
        .route("/volunteers/{id}", get(handlers::get_volunteer))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::features::volunteers::dtos::VolunteerApplicationDto;
    use crate::features::volunteers::workers::SmsOptInScheduler;
    use crate::shared::test_helpers::{
        InMemoryVolunteerRepository, RecordingBlobStore, StubClassifier,
    };

    struct Harness {
        server: TestServer,
        classifier: Arc<StubClassifier>,
        store: Arc<RecordingBlobStore>,
        scheduler: Arc<SmsOptInScheduler>,
    }

    fn harness(classifier: Arc<StubClassifier>) -> Harness {
        let store = RecordingBlobStore::local();
        let repo = InMemoryVolunteerRepository::new();
        let scheduler = Arc::new(SmsOptInScheduler::new(
            repo.clone(),
            Duration::from_secs(24 * 60 * 60),
        ));
        let service =
            VolunteerService::new(classifier.clone(), store.clone(), repo, scheduler.clone());
        Harness {
            server: TestServer::new(routes(Arc::new(service))).unwrap(),
            classifier,
            store,
            scheduler,
        }
    }

    fn application(city: &str, send_sms: bool) -> MultipartForm {
        MultipartForm::new()
            .add_text("firstName", "Maria")
            .add_text("lastName", "Lopez")
            .add_text("email", "Maria.Lopez@Example.com")
            .add_text("phoneNumber", "+1 (555) 123-4567")
            .add_text("city", city.to_string())
            .add_text("sendSMS", send_sms.to_string())
            .add_part(
                "file",
                Part::bytes(vec![0x89; 1024])
                    .file_name("certificate.png")
                    .mime_type("image/png"),
            )
    }

    async fn apply(h: &Harness, city: &str, send_sms: bool) -> VolunteerApplicationDto {
        let response = h
            .server
            .post("/volunteers")
            .multipart(application(city, send_sms))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    #[tokio::test]
    async fn test_create_volunteer_returns_created_application() {
        let h = harness(StubClassifier::answering(true));

        let response = h
            .server
            .post("/volunteers")
            .multipart(application("Austin", true))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["email"], "maria.lopez@example.com");
        assert_eq!(body["sendSMS"], true);
        assert!(body["sendSMSSetAt"].is_string());
        assert!(body["url"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/certificates/"));
        assert_eq!(h.scheduler.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_fields_never_reach_the_classifier() {
        let h = harness(StubClassifier::answering(true));

        let response = h
            .server
            .post("/volunteers")
            .multipart(
                MultipartForm::new()
                    .add_text("firstName", "M")
                    .add_text("lastName", "Lopez")
                    .add_text("email", "maria@example.com")
                    .add_text("phoneNumber", "5551234")
                    .add_text("city", "Austin")
                    .add_part(
                        "file",
                        Part::bytes(vec![1; 16]).file_name("certificate.png"),
                    ),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["errors"].is_array());
        assert_eq!(h.classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_certificate_is_a_client_error() {
        let h = harness(StubClassifier::answering(false));

        let response = h
            .server
            .post("/volunteers")
            .multipart(application("Austin", false))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(h.store.saved().is_empty());
    }

    #[tokio::test]
    async fn test_classifier_outage_is_service_unavailable() {
        let h = harness(StubClassifier::failing());

        let response = h
            .server
            .post("/volunteers")
            .multipart(application("Austin", false))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            "Service temporarily unavailable, please try again later"
        );
    }

    #[tokio::test]
    async fn test_list_by_city() {
        let h = harness(StubClassifier::answering(true));
        let listed = apply(&h, "Austin", false).await;
        apply(&h, "austin", true).await;

        let response = h.server.get("/volunteers").add_query_param("city", "AUSTIN").await;
        response.assert_status_ok();
        let volunteers: Vec<VolunteerApplicationDto> = response.json();
        assert_eq!(volunteers.len(), 1);
        assert_eq!(volunteers[0].id, listed.id);

        let response = h.server.get("/volunteers").add_query_param("city", "Boston").await;
        response.assert_status_ok();
        let volunteers: Vec<VolunteerApplicationDto> = response.json();
        assert!(volunteers.is_empty());
    }

    #[tokio::test]
    async fn test_list_requires_city() {
        let h = harness(StubClassifier::answering(true));

        h.server
            .get("/volunteers")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        h.server
            .get("/volunteers")
            .add_query_param("city", "A")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_send_sms_endpoint_arms_volunteer() {
        let h = harness(StubClassifier::answering(true));
        let volunteer = apply(&h, "Austin", false).await;

        let response = h
            .server
            .get("/volunteers/send-sms/reset")
            .add_query_param("id", volunteer.id)
            .await;

        response.assert_status_ok();
        let body: VolunteerApplicationDto = response.json();
        assert!(body.send_sms);
        assert!(body.send_sms_set_at.is_some());
        assert!(h.scheduler.is_armed(volunteer.id));

        let fetched: VolunteerApplicationDto = h
            .server
            .get(&format!("/volunteers/{}", volunteer.id))
            .await
            .json();
        assert!(fetched.send_sms);
    }

    #[tokio::test]
    async fn test_send_sms_endpoint_unknown_id_is_bad_request() {
        let h = harness(StubClassifier::answering(true));

        let response = h
            .server
            .get("/volunteers/send-sms/reset")
            .add_query_param("id", uuid::Uuid::new_v4())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Volunteer not found");

        h.server
            .get("/volunteers/send-sms/reset")
            .add_query_param("id", "nope")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(h.scheduler.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_get_volunteer_not_found() {
        let h = harness(StubClassifier::answering(true));

        h.server
            .get(&format!("/volunteers/{}", uuid::Uuid::new_v4()))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
