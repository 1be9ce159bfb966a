use std::time::Duration;

use chrono::{TimeZone, Utc};
use dorm_intake::config::BackendConfig;
use dorm_intake::workflows::facility::{FacilityRequest, RequestStatus};
use dorm_intake::workflows::intake::{
    ApplicationDraft, ApplicationPayload, Field, RecordId, StudentId,
};
use dorm_intake::workflows::submission::{
    HttpSubmissionClient, SubmissionClient, SubmissionError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpSubmissionClient {
    HttpSubmissionClient::new(&BackendConfig {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
    })
    .expect("client builds")
}

fn payload() -> ApplicationPayload {
    let mut draft = ApplicationDraft::new();
    draft.set(Field::FullName, "Leyla Aksoy");
    draft.set(Field::StudentId, "st-2024-0042");
    draft.set(Field::GuardianName, "Murat Aksoy");
    ApplicationPayload::from_draft(
        &draft,
        Utc.with_ymd_and_hms(2024, 9, 1, 8, 30, 0).unwrap(),
    )
}

#[tokio::test]
async fn create_posts_canonical_locked_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/applications"))
        .and(body_partial_json(json!({
            "studentId": "ST-2024-0042",
            "canEdit": false,
            "submittedAt": "2024-09-01T08:30:00Z",
            "personal": { "fullName": "Leyla Aksoy", "studentId": "st-2024-0042" },
            "family": { "guardianName": "Murat Aksoy" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "app-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let record_id = client_for(&server)
        .create_application(&payload())
        .await
        .expect("create succeeds");

    assert_eq!(record_id, RecordId("app-1".to_string()));
}

#[tokio::test]
async fn conflict_status_is_reported_as_duplicate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/applications"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "already exists" })),
        )
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_application(&payload())
        .await
        .unwrap_err();

    assert_eq!(error, SubmissionError::Duplicate("already exists".to_string()));
}

#[tokio::test]
async fn duplicate_wording_on_a_bad_request_is_a_duplicate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/applications"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "E11000 duplicate key error" })),
        )
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_application(&payload())
        .await
        .unwrap_err();

    assert!(error.is_duplicate());
}

#[tokio::test]
async fn server_errors_are_generic_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/applications"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_application(&payload())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        SubmissionError::Rejected {
            status: 500,
            message: "database offline".to_string(),
        }
    );
}

#[tokio::test]
async fn update_puts_to_the_record_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/applications/app-42"))
        .and(body_partial_json(json!({ "studentId": "ST-2024-0042" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .update_application(&RecordId("app-42".to_string()), &payload())
        .await
        .expect("update succeeds");
}

#[tokio::test]
async fn lookup_maps_not_found_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/applications/student/ST-404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let found = client_for(&server)
        .find_application(&StudentId::canonical("st-404"))
        .await
        .expect("lookup succeeds");

    assert!(found.is_none());
}

#[tokio::test]
async fn lookup_decodes_a_stored_application() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/applications/student/ST-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "app-7",
            "studentId": "ST-7",
            "canEdit": true,
            "personal": { "fullName": "Deniz Kaya" },
            "educational": {},
            "school": {},
            "family": {}
        })))
        .mount(&server)
        .await;

    let stored = client_for(&server)
        .find_application(&StudentId::canonical("ST-7"))
        .await
        .expect("lookup succeeds")
        .expect("record present");

    assert_eq!(stored.id, RecordId("app-7".to_string()));
    assert!(stored.can_edit);
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/applications"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_application(&payload())
        .await
        .unwrap_err();

    assert!(matches!(error, SubmissionError::Decode(_)), "{error:?}");
}

#[tokio::test]
async fn facility_requests_post_to_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/requests"))
        .and(body_partial_json(json!({
            "subject": "Facility Issue - Block B, Room 12",
            "status": "pending",
            "studentName": "Anonymous Student"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "req-9" })))
        .expect(1)
        .mount(&server)
        .await;

    let request = FacilityRequest {
        student_name: "Anonymous Student".to_string(),
        student_id: "N/A".to_string(),
        email: "student@university.edu".to_string(),
        phone: "N/A".to_string(),
        subject: FacilityRequest::subject_for("B", "12"),
        message: "No hot water".to_string(),
        category: Some("plumbing".to_string()),
        status: RequestStatus::Pending,
        submitted_at: Utc::now(),
    };

    let record_id = client_for(&server)
        .create_request(&request)
        .await
        .expect("request succeeds");

    assert_eq!(record_id, RecordId("req-9".to_string()));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let client = HttpSubmissionClient::new(&BackendConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        request_timeout: Duration::from_secs(2),
    })
    .expect("client builds");

    let error = client.create_application(&payload()).await.unwrap_err();

    assert!(matches!(error, SubmissionError::Transport(_)), "{error:?}");
}
