use crate::infra::{AppState, InMemoryIntakeStore, StoreError};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use dorm_intake::workflows::facility::FacilityRequest;
use dorm_intake::workflows::intake::{ApplicationPayload, RecordId, StudentId};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// REST surface the intake workflows submit to.
pub(crate) fn intake_router(store: Arc<InMemoryIntakeStore>) -> Router {
    Router::new()
        .route("/api/applications", post(create_application))
        .route("/api/applications/:record_id", put(update_application))
        .route(
            "/api/applications/student/:student_id",
            get(find_application),
        )
        .route("/api/requests", post(create_request))
        .with_state(store)
}

pub(crate) fn with_service_routes(store: Arc<InMemoryIntakeStore>) -> Router {
    intake_router(store)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn create_application(
    State(store): State<Arc<InMemoryIntakeStore>>,
    Json(payload): Json<ApplicationPayload>,
) -> Response {
    let student_id = payload.student_id.clone();
    match store.create_application(payload) {
        Ok(stored) => {
            info!(record_id = %stored.id, %student_id, "application stored");
            (StatusCode::CREATED, Json(json!({ "id": stored.id }))).into_response()
        }
        Err(StoreError::Conflict) => {
            warn!(%student_id, "duplicate application rejected");
            let payload = json!({
                "message": format!("duplicate application for student {student_id}"),
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(StoreError::NotFound) => not_found("application"),
    }
}

pub(crate) async fn update_application(
    State(store): State<Arc<InMemoryIntakeStore>>,
    Path(record_id): Path<String>,
    Json(payload): Json<ApplicationPayload>,
) -> Response {
    let record_id = RecordId(record_id);
    match store.update_application(&record_id, payload) {
        Ok(stored) => {
            info!(%record_id, student_id = %stored.student_id, "application updated");
            (StatusCode::OK, Json(json!({ "id": stored.id }))).into_response()
        }
        Err(StoreError::Conflict) => {
            let payload = json!({
                "message": "duplicate application: student id belongs to another record",
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(StoreError::NotFound) => not_found("application"),
    }
}

pub(crate) async fn find_application(
    State(store): State<Arc<InMemoryIntakeStore>>,
    Path(student_id): Path<String>,
) -> Response {
    match store.find_by_student(&StudentId::canonical(&student_id)) {
        Some(stored) => (StatusCode::OK, Json(stored)).into_response(),
        None => not_found("application"),
    }
}

pub(crate) async fn create_request(
    State(store): State<Arc<InMemoryIntakeStore>>,
    Json(request): Json<FacilityRequest>,
) -> Response {
    let subject = request.subject.clone();
    let id = store.create_request(request);
    info!(record_id = %id, %subject, "facility request stored");
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

fn not_found(resource: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("{resource} not found") })),
    )
        .into_response()
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use dorm_intake::workflows::facility::{ReporterContact, RequestStatus};
    use dorm_intake::workflows::intake::{ApplicationDraft, Field};
    use serde_json::Value;
    use tower::ServiceExt;

    fn payload_body(student_id: &str) -> Body {
        let mut draft = ApplicationDraft::new();
        draft.set(Field::StudentId, student_id);
        draft.set(Field::FullName, "Leyla Aksoy");
        let payload = ApplicationPayload::from_draft(&draft, Utc::now());
        Body::from(serde_json::to_vec(&payload).expect("payload serializes"))
    }

    fn json_request(method: &str, uri: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .expect("request builds")
    }

    async fn read_json(response: Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json body")
    }

    #[tokio::test]
    async fn create_then_duplicate_conflicts() {
        let store = Arc::new(InMemoryIntakeStore::default());
        let router = intake_router(store.clone());

        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/applications", payload_body("st-5")))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        assert_eq!(body["id"], "app-000001");

        let response = router
            .oneshot(json_request("POST", "/api/applications", payload_body("ST-5")))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = read_json(response).await;
        assert!(body["message"]
            .as_str()
            .is_some_and(|message| message.contains("duplicate")));
        assert_eq!(store.application_count(), 1);
    }

    #[tokio::test]
    async fn lookup_returns_stored_application_or_404() {
        let store = Arc::new(InMemoryIntakeStore::default());
        let router = intake_router(store);

        router
            .clone()
            .oneshot(json_request("POST", "/api/applications", payload_body("st-8")))
            .await
            .expect("route executes");

        let response = router
            .clone()
            .oneshot(json_request(
                "GET",
                "/api/applications/student/st-8",
                Body::empty(),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["studentId"], "ST-8");
        assert_eq!(body["canEdit"], false);
        assert_eq!(body["personal"]["fullName"], "Leyla Aksoy");

        let response = router
            .oneshot(json_request(
                "GET",
                "/api/applications/student/ST-404",
                Body::empty(),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let router = intake_router(Arc::new(InMemoryIntakeStore::default()));

        let response = router
            .oneshot(json_request(
                "PUT",
                "/api/applications/app-123456",
                payload_body("st-9"),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn facility_requests_are_recorded() {
        let store = Arc::new(InMemoryIntakeStore::default());
        let router = intake_router(store.clone());
        let contact = ReporterContact::placeholder();
        let request = FacilityRequest {
            student_name: contact.name,
            student_id: contact.student_id,
            email: contact.email,
            phone: contact.phone,
            subject: FacilityRequest::subject_for("A", "3"),
            message: "Door lock stuck".to_string(),
            category: None,
            status: RequestStatus::Pending,
            submitted_at: Utc::now(),
        };

        let response = router
            .oneshot(json_request(
                "POST",
                "/api/requests",
                Body::from(serde_json::to_vec(&request).expect("request serializes")),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::CREATED);
        let stored = store.requests();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1.subject, "Facility Issue - Block A, Room 3");
    }
}
