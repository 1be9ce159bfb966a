//! Injected presentation context: the language lookup and the theme flag.
//!
//! The workflows never reach for ambient globals; whatever renders them
//! passes a [`Presentation`] in at construction time.

use std::fmt;
use std::sync::Arc;

use crate::workflows::facility::schema as facility_schema;
use crate::workflows::intake::schema as intake_schema;

/// Message keys the workflows translate before showing text to the user.
pub mod keys {
    pub const MISSING_FIELD: &str = "intake.validation.missing";
    pub const SUBMIT_CREATED: &str = "intake.submit.created";
    pub const SUBMIT_UPDATED: &str = "intake.submit.updated";
    pub const SUBMIT_DUPLICATE: &str = "intake.submit.duplicate";
    pub const SUBMIT_FAILED: &str = "intake.submit.failed";
    pub const LOOKUP_FAILED: &str = "intake.lookup.failed";
    pub const REPORT_SUBMITTED: &str = "facility.submit.success";
}

/// Placeholder substituted with the translated field label.
pub const FIELD_PLACEHOLDER: &str = "{field}";

pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

/// Built-in English strings; unknown keys are echoed back unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishCatalog;

impl EnglishCatalog {
    fn message(key: &str) -> Option<&'static str> {
        let text = match key {
            keys::MISSING_FIELD => "Please fill in {field}",
            keys::SUBMIT_CREATED => "Application submitted successfully!",
            keys::SUBMIT_UPDATED => "Application updated successfully!",
            keys::SUBMIT_DUPLICATE => {
                "You have already submitted an application with this Student ID."
            }
            keys::SUBMIT_FAILED => "Failed to submit application. Please try again.",
            keys::LOOKUP_FAILED => {
                "We could not check for an existing application. A new one will be created."
            }
            keys::REPORT_SUBMITTED => {
                "Your report has been submitted. Maintenance staff will follow up shortly."
            }
            _ => return None,
        };
        Some(text)
    }
}

impl Translator for EnglishCatalog {
    fn translate(&self, key: &str) -> String {
        Self::message(key)
            .or_else(|| intake_schema::label_for_key(key))
            .or_else(|| facility_schema::label_for_key(key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }
}

#[derive(Clone)]
pub struct Presentation {
    translator: Arc<dyn Translator>,
    dark_mode: bool,
}

impl Presentation {
    pub fn new(translator: Arc<dyn Translator>, dark_mode: bool) -> Self {
        Self {
            translator,
            dark_mode,
        }
    }

    pub fn english(dark_mode: bool) -> Self {
        Self::new(Arc::new(EnglishCatalog), dark_mode)
    }

    pub fn translate(&self, key: &str) -> String {
        self.translator.translate(key)
    }

    /// Translate `key`, falling back to `default` when the lookup has no entry.
    pub fn translate_or(&self, key: &str, default: &str) -> String {
        let text = self.translate(key);
        if text.is_empty() || text == key {
            default.to_string()
        } else {
            text
        }
    }

    pub fn missing_field_message(&self, label_key: &str, label: &str) -> String {
        let field = self.translate_or(label_key, label);
        self.translate_or(keys::MISSING_FIELD, "Please fill in {field}")
            .replace(FIELD_PLACEHOLDER, &field)
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::english(false)
    }
}

impl fmt::Debug for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presentation")
            .field("dark_mode", &self.dark_mode)
            .finish_non_exhaustive()
    }
}
