use std::sync::Mutex;

use async_trait::async_trait;

use super::{SubmissionClient, SubmissionError};
use crate::workflows::facility::FacilityRequest;
use crate::workflows::intake::domain::{
    ApplicationPayload, RecordId, StoredApplication, StudentId,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create(ApplicationPayload),
    Update(RecordId, ApplicationPayload),
    Find(StudentId),
    Request(FacilityRequest),
}

/// In-memory backend double that records every call it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    create_error: Option<SubmissionError>,
    update_error: Option<SubmissionError>,
    lookup: Option<Result<StoredApplication, SubmissionError>>,
    request_error: Option<SubmissionError>,
}

impl RecordingClient {
    pub(crate) fn failing_create(error: SubmissionError) -> Self {
        Self {
            create_error: Some(error),
            ..Self::default()
        }
    }

    pub(crate) fn failing_update(mut self, error: SubmissionError) -> Self {
        self.update_error = Some(error);
        self
    }

    pub(crate) fn with_existing(stored: StoredApplication) -> Self {
        Self {
            lookup: Some(Ok(stored)),
            ..Self::default()
        }
    }

    pub(crate) fn failing_lookup(error: SubmissionError) -> Self {
        Self {
            lookup: Some(Err(error)),
            ..Self::default()
        }
    }

    pub(crate) fn failing_requests(error: SubmissionError) -> Self {
        Self {
            request_error: Some(error),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

#[async_trait]
impl SubmissionClient for RecordingClient {
    async fn create_application(
        &self,
        payload: &ApplicationPayload,
    ) -> Result<RecordId, SubmissionError> {
        self.record(Call::Create(payload.clone()));
        match &self.create_error {
            Some(error) => Err(error.clone()),
            None => Ok(RecordId("app-000101".to_string())),
        }
    }

    async fn update_application(
        &self,
        id: &RecordId,
        payload: &ApplicationPayload,
    ) -> Result<(), SubmissionError> {
        self.record(Call::Update(id.clone(), payload.clone()));
        match &self.update_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn find_application(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<StoredApplication>, SubmissionError> {
        self.record(Call::Find(student_id.clone()));
        match &self.lookup {
            Some(Ok(stored)) => Ok(Some(stored.clone())),
            Some(Err(error)) => Err(error.clone()),
            None => Ok(None),
        }
    }

    async fn create_request(&self, request: &FacilityRequest) -> Result<RecordId, SubmissionError> {
        self.record(Call::Request(request.clone()));
        match &self.request_error {
            Some(error) => Err(error.clone()),
            None => Ok(RecordId("req-000007".to_string())),
        }
    }
}
