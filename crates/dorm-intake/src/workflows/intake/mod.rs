//! Dormitory application intake: four gated sections, a confirmation step,
//! and create-or-update submission with timed feedback.

pub mod domain;
pub mod schema;
mod view;
mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationDraft, ApplicationPayload, DraftError, ExistingApplicationRef, Field, RecordId,
    Section, SectionData, StoredApplication, StudentId,
};
pub use schema::{schema_for, validate, SectionSchema};
pub use view::{SectionTab, WizardView};
pub use wizard::{
    AdvanceOutcome, FormWizard, LookupError, SubmissionOutcome, SubmissionTicket,
    TransitionError, WizardPhase,
};
