use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::form::{FieldMap, FormField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportField {
    Block,
    Room,
    Category,
    Description,
}

impl FormField for ReportField {
    fn key(self) -> &'static str {
        match self {
            ReportField::Block => "block",
            ReportField::Room => "room",
            ReportField::Category => "category",
            ReportField::Description => "description",
        }
    }
}

pub type ReportData = FieldMap<ReportField>;

/// Contact details attached to a report. The portal has no identity
/// provider on this path, so the default is a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterContact {
    pub name: String,
    pub student_id: String,
    pub email: String,
    pub phone: String,
}

impl ReporterContact {
    pub fn placeholder() -> Self {
        Self {
            name: "Anonymous Student".to_string(),
            student_id: "N/A".to_string(),
            email: "student@university.edu".to_string(),
            phone: "N/A".to_string(),
        }
    }
}

impl Default for ReporterContact {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
}

/// Body of `POST /api/requests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityRequest {
    pub student_name: String,
    pub student_id: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
}

impl FacilityRequest {
    pub fn subject_for(block: &str, room: &str) -> String {
        format!("Facility Issue - Block {block}, Room {room}")
    }

    pub fn from_report(
        data: &ReportData,
        contact: &ReporterContact,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let text = |field| {
            data.get(field)
                .map(ToString::to_string)
                .unwrap_or_default()
        };

        let category = Some(text(ReportField::Category)).filter(|value| !value.is_empty());

        Self {
            student_name: contact.name.clone(),
            student_id: contact.student_id.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            subject: Self::subject_for(&text(ReportField::Block), &text(ReportField::Room)),
            message: text(ReportField::Description),
            category,
            status: RequestStatus::Pending,
            submitted_at,
        }
    }
}
