use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;

use crate::config::WorkflowTimings;
use crate::workflows::form::FieldValue;
use crate::workflows::intake::domain::{ApplicationDraft, Field, Section};
use crate::workflows::intake::schema::schema_for;
use crate::workflows::intake::{AdvanceOutcome, FormWizard};
use crate::workflows::presentation::Presentation;
pub(super) use crate::workflows::submission::testing::{Call, RecordingClient};

pub(super) fn sample_value(field: Field) -> FieldValue {
    match field {
        Field::FullName => "Leyla Aksoy".into(),
        Field::StudentId => "st-2024-0042".into(),
        Field::Email => "leyla.aksoy@student.example.edu".into(),
        Field::Phone => "+90 555 010 2030".into(),
        Field::DateOfBirth => NaiveDate::from_ymd_opt(2005, 3, 14)
            .expect("valid date")
            .into(),
        Field::Gender => "female".into(),
        Field::Nationality => "Turkish".into(),
        Field::Address => "12 Harbor Street, Izmir".into(),
        Field::Faculty => "Engineering".into(),
        Field::Department => "Computer Engineering".into(),
        Field::ProgramLevel => "undergraduate".into(),
        Field::YearOfStudy => "2".into(),
        Field::EnrollmentDate => NaiveDate::from_ymd_opt(2024, 9, 16)
            .expect("valid date")
            .into(),
        Field::Gpa => "3.4".into(),
        Field::SchoolName => "Karsiyaka Science High School".into(),
        Field::SchoolCity => "Izmir".into(),
        Field::GraduationYear => "2023".into(),
        Field::ExamScore => "452.1".into(),
        Field::GuardianName => "Murat Aksoy".into(),
        Field::GuardianRelationship => "father".into(),
        Field::GuardianPhone => "+90 555 010 9999".into(),
        Field::HouseholdSize => "4".into(),
        Field::FamilyAddress => "12 Harbor Street, Izmir".into(),
    }
}

pub(super) fn complete_draft() -> ApplicationDraft {
    let mut draft = ApplicationDraft::new();
    for section in Section::ordered() {
        for spec in schema_for(section).fields {
            draft.set(spec.field, sample_value(spec.field));
        }
    }
    draft
}

pub(super) fn build_wizard(client: Arc<RecordingClient>) -> FormWizard<RecordingClient> {
    FormWizard::new(client, Presentation::english(false), WorkflowTimings::default())
}

pub(super) fn fill_section(wizard: &mut FormWizard<RecordingClient>, section: Section) {
    for spec in schema_for(section).fields {
        wizard
            .set_field(spec.field, sample_value(spec.field))
            .expect("wizard accepts edits");
    }
}

/// Fill every section and continue until the confirmation step.
pub(super) fn reach_confirmation(wizard: &mut FormWizard<RecordingClient>, now: Instant) {
    for section in Section::ordered() {
        fill_section(wizard, section);
    }
    wizard
        .select_section(Section::first())
        .expect("tab selection allowed");
    for _ in Section::ordered() {
        let outcome = wizard.advance(now).expect("advance allowed");
        assert!(
            !matches!(outcome, AdvanceOutcome::Blocked(_)),
            "complete sections must not block: {outcome:?}"
        );
    }
}
