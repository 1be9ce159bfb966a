use dorm_intake::workflows::facility::FacilityRequest;
use dorm_intake::workflows::intake::{ApplicationPayload, RecordId, StoredApplication, StudentId};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreError {
    Conflict,
    NotFound,
}

#[derive(Debug, Default)]
struct Records {
    applications: HashMap<RecordId, StoredApplication>,
    by_student: HashMap<StudentId, RecordId>,
    requests: Vec<(RecordId, FacilityRequest)>,
}

/// Process-local stand-in for the portal backend. One application per
/// student id; facility requests are append-only.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryIntakeStore {
    records: Arc<Mutex<Records>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryIntakeStore {
    fn next_id(&self, prefix: &str) -> RecordId {
        let value = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        RecordId(format!("{prefix}-{value:06}"))
    }

    pub(crate) fn create_application(
        &self,
        payload: ApplicationPayload,
    ) -> Result<StoredApplication, StoreError> {
        let student_id = StudentId::canonical(payload.student_id.as_str());
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.by_student.contains_key(&student_id) {
            return Err(StoreError::Conflict);
        }

        let id = self.next_id("app");
        let stored = StoredApplication {
            id: id.clone(),
            student_id: student_id.clone(),
            submitted_at: Some(payload.submitted_at),
            can_edit: payload.can_edit,
            sections: payload.sections,
        };
        guard.by_student.insert(student_id, id.clone());
        guard.applications.insert(id, stored.clone());
        Ok(stored)
    }

    pub(crate) fn update_application(
        &self,
        id: &RecordId,
        payload: ApplicationPayload,
    ) -> Result<StoredApplication, StoreError> {
        let student_id = StudentId::canonical(payload.student_id.as_str());
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if let Some(owner) = guard.by_student.get(&student_id) {
            if owner != id {
                return Err(StoreError::Conflict);
            }
        }

        let previous = guard
            .applications
            .get(id)
            .map(|stored| stored.student_id.clone())
            .ok_or(StoreError::NotFound)?;

        let stored = StoredApplication {
            id: id.clone(),
            student_id: student_id.clone(),
            submitted_at: Some(payload.submitted_at),
            can_edit: payload.can_edit,
            sections: payload.sections,
        };
        guard.by_student.remove(&previous);
        guard.by_student.insert(student_id, id.clone());
        guard.applications.insert(id.clone(), stored.clone());
        Ok(stored)
    }

    pub(crate) fn find_by_student(&self, student_id: &StudentId) -> Option<StoredApplication> {
        let guard = self.records.lock().expect("store mutex poisoned");
        guard
            .by_student
            .get(student_id)
            .and_then(|id| guard.applications.get(id))
            .cloned()
    }

    pub(crate) fn create_request(&self, request: FacilityRequest) -> RecordId {
        let id = self.next_id("req");
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.requests.push((id.clone(), request));
        id
    }

    pub(crate) fn requests(&self) -> Vec<(RecordId, FacilityRequest)> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .requests
            .clone()
    }

    pub(crate) fn application_count(&self) -> usize {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .applications
            .len()
    }
}
