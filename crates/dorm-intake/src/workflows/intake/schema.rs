use crate::workflows::form::{missing_fields, FieldSpec, FormField, MissingField};

use super::domain::{Field, Section, SectionData};

/// Ordered fields of one section and which of them are mandatory.
#[derive(Debug, Clone, Copy)]
pub struct SectionSchema {
    pub section: Section,
    pub fields: &'static [FieldSpec<Field>],
}

impl SectionSchema {
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec<Field>> {
        self.fields.iter().filter(|spec| spec.required)
    }
}

pub const PERSONAL: SectionSchema = SectionSchema {
    section: Section::Personal,
    fields: &[
        FieldSpec::required(Field::FullName, "Full Name"),
        FieldSpec::required(Field::StudentId, "Student ID"),
        FieldSpec::required(Field::Email, "Email Address"),
        FieldSpec::required(Field::Phone, "Phone Number"),
        FieldSpec::required(Field::DateOfBirth, "Date of Birth"),
        FieldSpec::required(Field::Gender, "Gender"),
        FieldSpec::optional(Field::Nationality, "Nationality"),
        FieldSpec::required(Field::Address, "Home Address"),
    ],
};

pub const EDUCATIONAL: SectionSchema = SectionSchema {
    section: Section::Educational,
    fields: &[
        FieldSpec::required(Field::Faculty, "Faculty"),
        FieldSpec::required(Field::Department, "Department"),
        FieldSpec::required(Field::ProgramLevel, "Program Level"),
        FieldSpec::required(Field::YearOfStudy, "Year of Study"),
        FieldSpec::optional(Field::EnrollmentDate, "Enrollment Date"),
        FieldSpec::optional(Field::Gpa, "Current GPA"),
    ],
};

pub const SCHOOL: SectionSchema = SectionSchema {
    section: Section::School,
    fields: &[
        FieldSpec::required(Field::SchoolName, "Previous School"),
        FieldSpec::required(Field::SchoolCity, "School City"),
        FieldSpec::required(Field::GraduationYear, "Graduation Year"),
        FieldSpec::optional(Field::ExamScore, "Final Exam Score"),
    ],
};

pub const FAMILY: SectionSchema = SectionSchema {
    section: Section::Family,
    fields: &[
        FieldSpec::required(Field::GuardianName, "Guardian Name"),
        FieldSpec::required(Field::GuardianRelationship, "Relationship to Guardian"),
        FieldSpec::required(Field::GuardianPhone, "Guardian Phone Number"),
        FieldSpec::optional(Field::HouseholdSize, "Household Size"),
        FieldSpec::optional(Field::FamilyAddress, "Family Address"),
    ],
};

pub fn schema_for(section: Section) -> &'static SectionSchema {
    match section {
        Section::Personal => &PERSONAL,
        Section::Educational => &EDUCATIONAL,
        Section::School => &SCHOOL,
        Section::Family => &FAMILY,
    }
}

/// Missing mandatory fields of `section`, first offender first.
pub fn validate(section: Section, data: &SectionData) -> Vec<MissingField<Field>> {
    missing_fields(schema_for(section).fields, data)
}

/// Default English label for a `field.*` or `intake.section.*` key.
pub fn label_for_key(key: &str) -> Option<&'static str> {
    if let Some(rest) = key.strip_prefix("intake.section.") {
        return Section::ordered()
            .into_iter()
            .find(|section| section.key() == rest)
            .map(Section::label);
    }

    let rest = key.strip_prefix("field.")?;
    Section::ordered()
        .into_iter()
        .flat_map(|section| schema_for(section).fields.iter())
        .find(|spec| spec.field.key() == rest)
        .map(|spec| spec.label)
}
