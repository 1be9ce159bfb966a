use crate::workflows::form::{missing_fields, FieldSpec, FormField, MissingField};

use super::domain::{ReportData, ReportField};

pub const REPORT_FIELDS: &[FieldSpec<ReportField>] = &[
    FieldSpec::required(ReportField::Block, "Block"),
    FieldSpec::required(ReportField::Room, "Room Number"),
    FieldSpec::optional(ReportField::Category, "Issue Category"),
    FieldSpec::required(ReportField::Description, "Issue Description"),
];

pub fn validate(data: &ReportData) -> Vec<MissingField<ReportField>> {
    missing_fields(REPORT_FIELDS, data)
}

pub fn label_for_key(key: &str) -> Option<&'static str> {
    let rest = key.strip_prefix("field.")?;
    REPORT_FIELDS
        .iter()
        .find(|spec| spec.field.key() == rest)
        .map(|spec| spec.label)
}
