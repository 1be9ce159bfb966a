use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::workflows::form::{FieldMap, FieldValue, FormField};

/// The four tabs of the dormitory application, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Personal,
    Educational,
    School,
    Family,
}

impl Section {
    pub const fn ordered() -> [Self; 4] {
        [Self::Personal, Self::Educational, Self::School, Self::Family]
    }

    pub const fn first() -> Self {
        Self::Personal
    }

    pub const fn last() -> Self {
        Self::Family
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Personal => Some(Self::Educational),
            Self::Educational => Some(Self::School),
            Self::School => Some(Self::Family),
            Self::Family => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Educational => "educational",
            Self::School => "school",
            Self::Family => "family",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal Information",
            Self::Educational => "Educational Information",
            Self::School => "School Information",
            Self::Family => "Family Information",
        }
    }

    pub fn label_key(self) -> String {
        format!("intake.section.{}", self.key())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Every input of the application. Each field belongs to exactly one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    // personal
    FullName,
    StudentId,
    Email,
    Phone,
    DateOfBirth,
    Gender,
    Nationality,
    Address,
    // educational
    Faculty,
    Department,
    ProgramLevel,
    YearOfStudy,
    EnrollmentDate,
    Gpa,
    // school
    SchoolName,
    SchoolCity,
    GraduationYear,
    ExamScore,
    // family
    GuardianName,
    GuardianRelationship,
    GuardianPhone,
    HouseholdSize,
    FamilyAddress,
}

impl Field {
    pub const fn section(self) -> Section {
        match self {
            Field::FullName
            | Field::StudentId
            | Field::Email
            | Field::Phone
            | Field::DateOfBirth
            | Field::Gender
            | Field::Nationality
            | Field::Address => Section::Personal,
            Field::Faculty
            | Field::Department
            | Field::ProgramLevel
            | Field::YearOfStudy
            | Field::EnrollmentDate
            | Field::Gpa => Section::Educational,
            Field::SchoolName | Field::SchoolCity | Field::GraduationYear | Field::ExamScore => {
                Section::School
            }
            Field::GuardianName
            | Field::GuardianRelationship
            | Field::GuardianPhone
            | Field::HouseholdSize
            | Field::FamilyAddress => Section::Family,
        }
    }
}

impl FormField for Field {
    fn key(self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::StudentId => "studentId",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::DateOfBirth => "dateOfBirth",
            Field::Gender => "gender",
            Field::Nationality => "nationality",
            Field::Address => "address",
            Field::Faculty => "faculty",
            Field::Department => "department",
            Field::ProgramLevel => "programLevel",
            Field::YearOfStudy => "yearOfStudy",
            Field::EnrollmentDate => "enrollmentDate",
            Field::Gpa => "gpa",
            Field::SchoolName => "schoolName",
            Field::SchoolCity => "schoolCity",
            Field::GraduationYear => "graduationYear",
            Field::ExamScore => "examScore",
            Field::GuardianName => "guardianName",
            Field::GuardianRelationship => "guardianRelationship",
            Field::GuardianPhone => "guardianPhone",
            Field::HouseholdSize => "householdSize",
            Field::FamilyAddress => "familyAddress",
        }
    }

    fn is_date(self) -> bool {
        matches!(self, Field::DateOfBirth | Field::EnrollmentDate)
    }
}

pub type SectionData = FieldMap<Field>;

/// In-progress dormitory application, one field map per section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DraftSections")]
pub struct ApplicationDraft {
    personal: SectionData,
    educational: SectionData,
    school: SectionData,
    family: SectionData,
}

impl ApplicationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, section: Section) -> &SectionData {
        match section {
            Section::Personal => &self.personal,
            Section::Educational => &self.educational,
            Section::School => &self.school,
            Section::Family => &self.family,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut SectionData {
        match section {
            Section::Personal => &mut self.personal,
            Section::Educational => &mut self.educational,
            Section::School => &mut self.school,
            Section::Family => &mut self.family,
        }
    }

    /// Store `value` in the section that owns `field`.
    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.section_mut(field.section()).insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.section(field.section()).get(field)
    }

    pub fn student_id(&self) -> Option<StudentId> {
        self.personal
            .text(Field::StudentId)
            .filter(|raw| !raw.is_empty())
            .map(StudentId::canonical)
    }

    pub fn is_empty(&self) -> bool {
        Section::ordered()
            .into_iter()
            .all(|section| self.section(section).is_empty())
    }
}

/// Wire shape of the four sections before ownership checks.
#[derive(Debug, Deserialize)]
struct DraftSections {
    #[serde(default)]
    personal: SectionData,
    #[serde(default)]
    educational: SectionData,
    #[serde(default)]
    school: SectionData,
    #[serde(default)]
    family: SectionData,
}

impl TryFrom<DraftSections> for ApplicationDraft {
    type Error = DraftError;

    fn try_from(raw: DraftSections) -> Result<Self, Self::Error> {
        let draft = ApplicationDraft {
            personal: raw.personal,
            educational: raw.educational,
            school: raw.school,
            family: raw.family,
        };

        for section in Section::ordered() {
            if let Some(field) = draft
                .section(section)
                .keys()
                .find(|field| field.section() != section)
            {
                return Err(DraftError::MisplacedField { field, section });
            }
        }

        Ok(draft)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("field '{}' does not belong to the {section} section", .field.key())]
    MisplacedField { field: Field, section: Section },
}

/// Student identifier in its transmitted, uppercased form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(String);

impl StudentId {
    /// Uppercase the raw identifier. Applying it twice changes nothing.
    pub fn canonical(raw: &str) -> Self {
        Self(raw.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend-assigned identifier of a stored application or request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A prior submission for the acting student. Present means "update".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExistingApplicationRef {
    pub record_id: RecordId,
    pub editable: bool,
}

/// Body of `POST /api/applications` and `PUT /api/applications/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
    pub student_id: StudentId,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub sections: ApplicationDraft,
    pub can_edit: bool,
}

impl ApplicationPayload {
    /// Canonicalise a draft for transmission. New submissions are locked.
    ///
    /// A draft without a student id (the personal tab can be skipped through
    /// tab selection) is sent with an empty `studentId` and logged.
    pub fn from_draft(draft: &ApplicationDraft, submitted_at: DateTime<Utc>) -> Self {
        let student_id = draft.student_id().unwrap_or_else(|| {
            warn!("draft has no student id; sending an empty one");
            StudentId::canonical("")
        });

        Self {
            student_id,
            submitted_at,
            sections: draft.clone(),
            can_edit: false,
        }
    }
}

/// Application as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredApplication {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub student_id: StudentId,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(flatten)]
    pub sections: ApplicationDraft,
}

impl StoredApplication {
    pub fn reference(&self) -> ExistingApplicationRef {
        ExistingApplicationRef {
            record_id: self.id.clone(),
            editable: self.can_edit,
        }
    }
}
