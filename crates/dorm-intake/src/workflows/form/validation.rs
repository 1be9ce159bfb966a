use serde::Serialize;

use super::field::{FieldMap, FieldSpec, FormField};

/// A mandatory field that has no usable value yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissingField<F> {
    pub field: F,
    pub label: &'static str,
}

/// Report every required field without a value, in schema order.
///
/// An empty result is the only signal that the section may be left through
/// the guarded "continue" action. Absent and empty-text values count as
/// missing; whitespace and dates are taken as provided.
pub fn missing_fields<F: FormField>(
    specs: &[FieldSpec<F>],
    data: &FieldMap<F>,
) -> Vec<MissingField<F>> {
    specs
        .iter()
        .filter(|spec| spec.required && !data.is_filled(spec.field))
        .map(|spec| MissingField {
            field: spec.field,
            label: spec.label,
        })
        .collect()
}
