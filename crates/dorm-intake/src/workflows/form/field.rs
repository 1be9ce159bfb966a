use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// A field identifier with a stable wire key.
pub trait FormField: Copy + Ord + fmt::Debug + 'static {
    fn key(self) -> &'static str;

    /// Translation key for the field's human label.
    fn label_key(self) -> String {
        format!("field.{}", self.key())
    }

    /// Whether the input is a date picker. Only these fields decode as dates.
    fn is_date(self) -> bool {
        false
    }
}

/// Raw value captured from a form input. No coercion happens between variants.
/// Both variants serialise as strings; the owning [`FieldMap`] decides which
/// one a wire value becomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    /// Mirrors an empty text input; a picked date is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Date(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Date(_) => None,
        }
    }

    fn decode<F: FormField>(field: F, raw: String) -> Self {
        if field.is_date() {
            if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                return FieldValue::Date(date);
            }
        }
        FieldValue::Text(raw)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// Flat field-to-value mapping for one form section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMap<F: Ord>(BTreeMap<F, FieldValue>);

impl<F: Ord> Default for FieldMap<F> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<F: FormField> FieldMap<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: F) -> Option<&FieldValue> {
        self.0.get(&field)
    }

    pub fn text(&self, field: F) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn is_filled(&self, field: F) -> bool {
        self.get(field).is_some_and(|value| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &FieldValue)> {
        self.0.iter().map(|(field, value)| (*field, value))
    }

    /// Owners are responsible for routing only their own fields here.
    pub(crate) fn insert(&mut self, field: F, value: FieldValue) {
        self.0.insert(field, value);
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = F> + '_ {
        self.0.keys().copied()
    }
}

/// Values decode as text unless the field is a date picker; an unparseable
/// date stays text.
impl<'de, F> Deserialize<'de> for FieldMap<F>
where
    F: FormField + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldMapVisitor<F>(std::marker::PhantomData<F>);

        impl<'de, F> Visitor<'de> for FieldMapVisitor<F>
        where
            F: FormField + Deserialize<'de>,
        {
            type Value = FieldMap<F>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field keys to string values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut values = BTreeMap::new();
                while let Some((field, raw)) = access.next_entry::<F, String>()? {
                    values.insert(field, FieldValue::decode(field, raw));
                }
                Ok(FieldMap(values))
            }
        }

        deserializer.deserialize_map(FieldMapVisitor(std::marker::PhantomData))
    }
}

/// Static description of one field inside a section schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec<F> {
    pub field: F,
    pub label: &'static str,
    pub required: bool,
}

impl<F> FieldSpec<F> {
    pub const fn required(field: F, label: &'static str) -> Self {
        Self {
            field,
            label,
            required: true,
        }
    }

    pub const fn optional(field: F, label: &'static str) -> Self {
        Self {
            field,
            label,
            required: false,
        }
    }
}
