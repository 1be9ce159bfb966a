use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{FacilityRequest, ReportData, ReportField, ReporterContact};
use super::schema;
use crate::config::WorkflowTimings;
use crate::workflows::form::{Feedback, FieldValue, FormField, MissingField, Notification};
use crate::workflows::intake::domain::RecordId;
use crate::workflows::presentation::{keys, Presentation};
use crate::workflows::submission::SubmissionClient;

/// What a report submission attempt amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// A required field is empty; nothing was sent.
    Blocked(MissingField<ReportField>),
    /// The user was told the report went through. `record_id` is `None`
    /// when the backend call failed and the failure was only logged.
    Submitted { record_id: Option<RecordId> },
}

/// Facility issue form. Validation and submission are one action, and
/// backend failures never reach the user.
pub struct SingleShotReport<C: ?Sized> {
    client: Arc<C>,
    presentation: Presentation,
    contact: ReporterContact,
    data: ReportData,
    feedback: Feedback,
}

impl<C> SingleShotReport<C>
where
    C: SubmissionClient + ?Sized,
{
    pub fn new(client: Arc<C>, presentation: Presentation, timings: WorkflowTimings) -> Self {
        Self {
            client,
            presentation,
            contact: ReporterContact::placeholder(),
            data: ReportData::new(),
            feedback: Feedback::new(timings.notification_ttl),
        }
    }

    pub fn with_contact(mut self, contact: ReporterContact) -> Self {
        self.contact = contact;
        self
    }

    pub fn set_field(&mut self, field: ReportField, value: impl Into<FieldValue>) {
        self.data.insert(field, value.into());
    }

    pub fn data(&self) -> &ReportData {
        &self.data
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.feedback.current()
    }

    pub fn dark_mode(&self) -> bool {
        self.presentation.dark_mode()
    }

    pub async fn submit(&mut self, now: Instant) -> ReportOutcome {
        if let Some(missing) = schema::validate(&self.data).into_iter().next() {
            let message = self
                .presentation
                .missing_field_message(&missing.field.label_key(), missing.label);
            self.feedback.error(message, now);
            return ReportOutcome::Blocked(missing);
        }

        let request = FacilityRequest::from_report(&self.data, &self.contact, Utc::now());
        let record_id = match self.client.create_request(&request).await {
            Ok(record_id) => {
                info!(%record_id, subject = %request.subject, "facility request filed");
                Some(record_id)
            }
            Err(error) => {
                warn!(%error, subject = %request.subject, "facility request failed; user still sees success");
                None
            }
        };

        self.data = ReportData::new();
        self.feedback.success(
            self.presentation.translate_or(
                keys::REPORT_SUBMITTED,
                "Your report has been submitted.",
            ),
            now,
        );

        ReportOutcome::Submitted { record_id }
    }

    pub fn dismiss_notification(&mut self) -> Option<Notification> {
        self.feedback.dismiss()
    }

    pub fn tick(&mut self, now: Instant) {
        self.feedback.tick(now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.feedback.next_deadline()
    }

    pub fn teardown(&mut self) -> usize {
        self.feedback.shutdown()
    }
}
