//! Boundary to the REST backend that stores applications and facility requests.

pub mod http;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::workflows::facility::FacilityRequest;
use crate::workflows::intake::domain::{
    ApplicationDraft, ApplicationPayload, ExistingApplicationRef, RecordId, StoredApplication,
    StudentId,
};

pub use http::HttpSubmissionClient;

/// Outbound operations the workflows need from the backend.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// `POST /api/applications`; yields the newly assigned id.
    async fn create_application(
        &self,
        payload: &ApplicationPayload,
    ) -> Result<RecordId, SubmissionError>;

    /// `PUT /api/applications/{id}`.
    async fn update_application(
        &self,
        id: &RecordId,
        payload: &ApplicationPayload,
    ) -> Result<(), SubmissionError>;

    /// Prior application for a student, if the backend has one.
    async fn find_application(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<StoredApplication>, SubmissionError>;

    /// `POST /api/requests`.
    async fn create_request(&self, request: &FacilityRequest) -> Result<RecordId, SubmissionError>;
}

/// Failure of a backend call, classified for user messaging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("duplicate submission: {0}")]
    Duplicate(String),
    #[error("backend rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl SubmissionError {
    /// Map a non-success HTTP status and its message onto the taxonomy.
    /// A 409, or any message mentioning "duplicate", is a duplicate signal.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 409 || message.to_ascii_lowercase().contains("duplicate") {
            SubmissionError::Duplicate(message)
        } else {
            SubmissionError::Rejected { status, message }
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, SubmissionError::Duplicate(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitAction {
    Create,
    Update,
}

/// Successful submission: which record now holds the application and how it got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub record_id: RecordId,
    pub action: SubmitAction,
}

/// Send a draft to the backend, updating `existing` when present and
/// creating a new record otherwise.
pub async fn submit_application<C>(
    client: &C,
    draft: &ApplicationDraft,
    existing: Option<&ExistingApplicationRef>,
    submitted_at: DateTime<Utc>,
) -> Result<SubmissionReceipt, SubmissionError>
where
    C: SubmissionClient + ?Sized,
{
    let payload = ApplicationPayload::from_draft(draft, submitted_at);

    match existing {
        Some(reference) => {
            client
                .update_application(&reference.record_id, &payload)
                .await?;
            Ok(SubmissionReceipt {
                record_id: reference.record_id.clone(),
                action: SubmitAction::Update,
            })
        }
        None => {
            let record_id = client.create_application(&payload).await?;
            Ok(SubmissionReceipt {
                record_id,
                action: SubmitAction::Create,
            })
        }
    }
}
