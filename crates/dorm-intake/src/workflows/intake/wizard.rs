use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{ApplicationDraft, ExistingApplicationRef, Field, Section, StudentId};
use super::schema;
use super::view::WizardView;
use crate::config::WorkflowTimings;
use crate::workflows::form::{
    Feedback, FieldValue, FormField, MissingField, Notification, TimerTask,
};
use crate::workflows::presentation::{keys, Presentation};
use crate::workflows::submission::{
    submit_application, SubmissionClient, SubmissionError, SubmissionReceipt, SubmitAction,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    Editing,
    Confirming,
    Submitting,
    Resetting,
}

impl WizardPhase {
    pub const fn label(self) -> &'static str {
        match self {
            WizardPhase::Editing => "editing",
            WizardPhase::Confirming => "confirming",
            WizardPhase::Submitting => "submitting",
            WizardPhase::Resetting => "resetting",
        }
    }
}

impl fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An action was attempted in a phase that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("a submission is in flight; the form is locked until it settles")]
    SubmissionInFlight,
    #[error("cannot {action} while the wizard is {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: WizardPhase,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("existing application lookup failed: {0}")]
    Backend(#[from] SubmissionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The first missing mandatory field of the current section.
    Blocked(MissingField<Field>),
    Moved(Section),
    AwaitingConfirmation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted(SubmissionReceipt),
    Failed(SubmissionError),
}

/// Snapshot of what a confirmed submission will send, detached from the
/// wizard so the request can run without borrowing it.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    draft: ApplicationDraft,
    existing: Option<ExistingApplicationRef>,
}

impl SubmissionTicket {
    pub fn action(&self) -> SubmitAction {
        match self.existing {
            Some(_) => SubmitAction::Update,
            None => SubmitAction::Create,
        }
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub async fn dispatch<C>(&self, client: &C) -> Result<SubmissionReceipt, SubmissionError>
    where
        C: SubmissionClient + ?Sized,
    {
        submit_application(client, &self.draft, self.existing.as_ref(), Utc::now()).await
    }
}

/// Four-section dormitory application wizard.
///
/// Forward movement through "continue" is gated on the current section's
/// mandatory fields; tab selection is free. The last section asks for
/// confirmation, then a single create or update request is issued. A
/// successful submission schedules a form reset so the success message stays
/// readable before the fields empty.
pub struct FormWizard<C: ?Sized> {
    client: Arc<C>,
    presentation: Presentation,
    timings: WorkflowTimings,
    phase: WizardPhase,
    position: Section,
    draft: ApplicationDraft,
    existing: Option<ExistingApplicationRef>,
    feedback: Feedback,
}

impl<C> FormWizard<C>
where
    C: SubmissionClient + ?Sized,
{
    pub fn new(client: Arc<C>, presentation: Presentation, timings: WorkflowTimings) -> Self {
        Self {
            client,
            presentation,
            timings,
            phase: WizardPhase::Editing,
            position: Section::first(),
            draft: ApplicationDraft::new(),
            existing: None,
            feedback: Feedback::new(timings.notification_ttl),
        }
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn position(&self) -> Section {
        self.position
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn existing(&self) -> Option<&ExistingApplicationRef> {
        self.existing.as_ref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.feedback.current()
    }

    pub fn is_confirming(&self) -> bool {
        self.phase == WizardPhase::Confirming
    }

    pub fn view(&self) -> WizardView {
        WizardView::build(
            self.phase,
            self.position,
            &self.draft,
            self.existing.as_ref(),
            self.feedback.current(),
            &self.presentation,
        )
    }

    fn ensure_not_submitting(&self) -> Result<(), TransitionError> {
        if self.phase == WizardPhase::Submitting {
            Err(TransitionError::SubmissionInFlight)
        } else {
            Ok(())
        }
    }

    fn ensure_phase(
        &self,
        action: &'static str,
        allowed: &[WizardPhase],
    ) -> Result<(), TransitionError> {
        self.ensure_not_submitting()?;
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(TransitionError::InvalidPhase {
                action,
                phase: self.phase,
            })
        }
    }

    /// Record user input. Edits made while the post-submit reset is pending
    /// are accepted but will be wiped when it fires.
    pub fn set_field(
        &mut self,
        field: Field,
        value: impl Into<FieldValue>,
    ) -> Result<(), TransitionError> {
        self.ensure_phase("edit a field", &[WizardPhase::Editing, WizardPhase::Resetting])?;
        self.draft.set(field, value);
        Ok(())
    }

    /// Jump straight to a tab. Never validates and never touches the draft.
    pub fn select_section(&mut self, section: Section) -> Result<(), TransitionError> {
        self.ensure_not_submitting()?;
        self.position = section;
        Ok(())
    }

    /// The guarded "continue" action.
    pub fn advance(&mut self, now: Instant) -> Result<AdvanceOutcome, TransitionError> {
        self.ensure_phase("continue", &[WizardPhase::Editing])?;

        let section = self.position;
        if let Some(missing) = schema::validate(section, self.draft.section(section))
            .into_iter()
            .next()
        {
            let message = self
                .presentation
                .missing_field_message(&missing.field.label_key(), missing.label);
            self.feedback.error(message, now);
            return Ok(AdvanceOutcome::Blocked(missing));
        }

        match section.next() {
            Some(next) => {
                self.position = next;
                Ok(AdvanceOutcome::Moved(next))
            }
            None => {
                self.phase = WizardPhase::Confirming;
                Ok(AdvanceOutcome::AwaitingConfirmation)
            }
        }
    }

    pub fn cancel_confirmation(&mut self) -> Result<(), TransitionError> {
        self.ensure_phase("cancel confirmation", &[WizardPhase::Confirming])?;
        self.phase = WizardPhase::Editing;
        self.position = Section::last();
        Ok(())
    }

    /// Lock the form and hand out what must be sent.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, TransitionError> {
        self.ensure_phase("submit", &[WizardPhase::Confirming])?;
        self.phase = WizardPhase::Submitting;

        let ticket = SubmissionTicket {
            draft: self.draft.clone(),
            existing: self.existing.clone(),
        };
        info!(action = ?ticket.action(), "dormitory application submission started");
        Ok(ticket)
    }

    /// Settle an in-flight submission and surface its outcome.
    pub fn complete_submission(
        &mut self,
        result: Result<SubmissionReceipt, SubmissionError>,
        now: Instant,
    ) -> Result<SubmissionOutcome, TransitionError> {
        if self.phase != WizardPhase::Submitting {
            return Err(TransitionError::InvalidPhase {
                action: "complete a submission",
                phase: self.phase,
            });
        }

        match result {
            Ok(receipt) => {
                let (key, default) = match receipt.action {
                    SubmitAction::Create => {
                        (keys::SUBMIT_CREATED, "Application submitted successfully!")
                    }
                    SubmitAction::Update => {
                        (keys::SUBMIT_UPDATED, "Application updated successfully!")
                    }
                };
                self.feedback
                    .success(self.presentation.translate_or(key, default), now);
                self.feedback
                    .schedule(TimerTask::ResetForm, now + self.timings.reset_delay);
                self.phase = WizardPhase::Resetting;

                info!(
                    record_id = %receipt.record_id,
                    action = ?receipt.action,
                    "dormitory application accepted"
                );
                Ok(SubmissionOutcome::Accepted(receipt))
            }
            Err(error) => {
                let message = if error.is_duplicate() {
                    self.presentation.translate_or(
                        keys::SUBMIT_DUPLICATE,
                        "You have already submitted an application with this Student ID.",
                    )
                } else {
                    self.presentation.translate_or(
                        keys::SUBMIT_FAILED,
                        "Failed to submit application. Please try again.",
                    )
                };
                self.feedback.error(message, now);
                self.phase = WizardPhase::Editing;
                self.position = Section::last();

                warn!(%error, duplicate = error.is_duplicate(), "dormitory application rejected");
                Ok(SubmissionOutcome::Failed(error))
            }
        }
    }

    /// Confirm and run the submission to completion. Timers start when the
    /// request settles.
    pub async fn confirm_submit(&mut self) -> Result<SubmissionOutcome, TransitionError> {
        let ticket = self.begin_submission()?;
        let client = Arc::clone(&self.client);
        let result = ticket.dispatch(client.as_ref()).await;
        self.complete_submission(result, Instant::now())
    }

    /// Look up a prior application for `student_id` and switch to update
    /// mode when one exists, pre-filling the draft from it. On failure the
    /// wizard stays in create mode and the user is told so.
    pub async fn load_existing(
        &mut self,
        student_id: &str,
        now: Instant,
    ) -> Result<Option<ExistingApplicationRef>, LookupError> {
        self.ensure_phase("look up an existing application", &[WizardPhase::Editing])?;

        let student_id = StudentId::canonical(student_id);
        let client = Arc::clone(&self.client);
        match client.find_application(&student_id).await {
            Ok(Some(stored)) => {
                let reference = stored.reference();
                info!(
                    %student_id,
                    record_id = %reference.record_id,
                    editable = reference.editable,
                    "existing dormitory application found"
                );
                self.draft = stored.sections;
                self.existing = Some(reference.clone());
                Ok(Some(reference))
            }
            Ok(None) => {
                self.existing = None;
                Ok(None)
            }
            Err(error) => {
                warn!(%student_id, %error, "existing application lookup failed");
                self.existing = None;
                self.feedback.error(
                    self.presentation.translate_or(
                        keys::LOOKUP_FAILED,
                        "We could not check for an existing application.",
                    ),
                    now,
                );
                Err(LookupError::Backend(error))
            }
        }
    }

    /// Empty the form and forget any existing application.
    pub fn clear(&mut self) -> Result<(), TransitionError> {
        self.ensure_phase("clear the form", &[WizardPhase::Editing, WizardPhase::Confirming])?;
        self.reset_form();
        Ok(())
    }

    pub fn dismiss_notification(&mut self) -> Option<Notification> {
        self.feedback.dismiss()
    }

    /// Apply every timer due at `now`.
    pub fn tick(&mut self, now: Instant) {
        for task in self.feedback.tick(now) {
            if task == TimerTask::ResetForm {
                self.reset_form();
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.feedback.next_deadline()
    }

    /// Cancel pending timers; call when the form goes away.
    pub fn teardown(&mut self) -> usize {
        self.feedback.shutdown()
    }

    fn reset_form(&mut self) {
        self.draft = ApplicationDraft::new();
        self.existing = None;
        self.position = Section::first();
        self.phase = WizardPhase::Editing;
    }
}

impl<C: ?Sized> fmt::Debug for FormWizard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormWizard")
            .field("phase", &self.phase)
            .field("position", &self.position)
            .field("existing", &self.existing)
            .finish_non_exhaustive()
    }
}
