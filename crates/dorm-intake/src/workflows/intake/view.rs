use serde::Serialize;

use super::domain::{ApplicationDraft, ExistingApplicationRef, Section};
use super::schema;
use super::wizard::WizardPhase;
use crate::workflows::form::Notification;
use crate::workflows::presentation::Presentation;
use crate::workflows::submission::SubmitAction;

/// One tab header as the presentation layer should draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionTab {
    pub section: Section,
    pub label: String,
    pub active: bool,
    pub complete: bool,
}

/// Serializable snapshot of the wizard for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardView {
    pub phase: WizardPhase,
    pub active_section: Section,
    pub tabs: Vec<SectionTab>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    pub confirming: bool,
    pub locked: bool,
    pub submit_action: SubmitAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    pub dark_mode: bool,
}

impl WizardView {
    pub(super) fn build(
        phase: WizardPhase,
        position: Section,
        draft: &ApplicationDraft,
        existing: Option<&ExistingApplicationRef>,
        notification: Option<&Notification>,
        presentation: &Presentation,
    ) -> Self {
        let tabs = Section::ordered()
            .into_iter()
            .map(|section| SectionTab {
                section,
                label: presentation.translate_or(&section.label_key(), section.label()),
                active: section == position,
                complete: schema::validate(section, draft.section(section)).is_empty(),
            })
            .collect();

        Self {
            phase,
            active_section: position,
            tabs,
            notification: notification.cloned(),
            confirming: phase == WizardPhase::Confirming,
            locked: phase == WizardPhase::Submitting,
            submit_action: match existing {
                Some(_) => SubmitAction::Update,
                None => SubmitAction::Create,
            },
            editable: existing.map(|reference| reference.editable),
            dark_mode: presentation.dark_mode(),
        }
    }
}
