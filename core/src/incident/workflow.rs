use super::model::{Incident, IncidentRecord, INCIDENT_STORAGE_KEY};
use super::reconcile::reconcile;
use super::render::{
    render_action_preview, render_actions, render_evidence, section_panel, ActionPreview,
    ACTIONS_PANEL, ACTIONS_TAKEN, ACTION_LIST, COUNT_CHOSEN, COUNT_ESCALATE, COUNT_LOST,
    COUNT_PRESERVED, ESCALATE_NO, ESCALATE_NOT_YET, ESCALATE_PANEL, ESCALATE_YES, EVIDENCE_LIST,
    MODAL_BACKDROP, MODAL_DESC, MODAL_LOSE, MODAL_PRESERVE, MODAL_RISKS, MODAL_TAKE_BTN,
    MODAL_TITLE, NOTE_ACTIONS, NOTE_ESCALATE_WHY, NOTE_STATUS, NOTE_WHAT, NOTE_WHEN,
    RECORD_PANEL, STEP_ACTIONS, STEP_ESCALATE, STEP_OUTCOME, STEP_RECORD, STEP_ROLES,
    TOKENS_LEFT, TOAST,
};
use super::rules::{self, action_availability, ActionAvailability, ActionOutcome};
use super::summary::{summarize, IncidentSummary};
use crate::error::CoreResult;
use crate::labels::Escalation;
use crate::storage::kv::KeyValueStore;
use crate::storage::state_store::{ReconcileReport, StateStore};
use crate::toast::Toast;
use crate::view::surface::RenderSurface;
use std::time::{Duration, Instant};

pub const MSG_ACTION_TAKEN: &str = "Action taken. Check the Evidence Board for impact.";
pub const MSG_NOTES_SAVED: &str = "Notes saved (stored in this browser).";
pub const MSG_TEMPLATE_FILLED: &str = "Template filled.";

const TEMPLATE_WHAT: &str = "Confirmed: User reported unexpected MFA prompts.\n\
Suspected: Unauthorized access attempt or account compromise.\n\
Plan: Preserve identity evidence and check for persistence indicators before containment changes state.";

const TEMPLATE_STATUS: &str = "Status: Under investigation. Evidence preservation in progress. \
Containment decisions pending initial findings.";

fn template_when(report_time: &str) -> String {
    format!(
        "- {} — User report received\n- (Add observed timestamps from sign-in history / MFA events)\n",
        report_time
    )
}

/// Free-text fields submitted from the incident record form. The escalation choice is set
/// separately through `set_escalate`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesForm {
    pub what: String,
    pub when: String,
    pub actions: String,
    pub status: String,
    pub escalate_why: String,
}

/// Transient UI state that is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentUiState {
    /// Action shown in the confirmation modal, if any.
    pub pending_action: Option<String>,
    pub modal_open: bool,
    /// Panel last navigated to through the stepper.
    pub focused_panel: Option<&'static str>,
}

/// Incident-response walkthrough session.
pub struct IncidentWalkthrough<S: KeyValueStore> {
    incident: Incident,
    store: StateStore<S>,
    record: IncidentRecord,
    ui: IncidentUiState,
    toast: Toast,
}

impl<S: KeyValueStore> IncidentWalkthrough<S> {
    pub fn new(incident: Incident, kv: S) -> Self {
        Self {
            incident,
            store: StateStore::new(kv, INCIDENT_STORAGE_KEY),
            record: IncidentRecord::default(),
            ui: IncidentUiState::default(),
            toast: Toast::default(),
        }
    }

    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast = Toast::new(duration);
        self
    }

    /// Loads and reconciles the persisted record, then writes the reconciled form back.
    pub fn init(&mut self) -> CoreResult<ReconcileReport> {
        let mut next: IncidentRecord = self.store.load();
        let report = reconcile(&self.incident, &mut next);
        if !report.trimmed.is_empty() {
            tracing::warn!(
                trimmed = ?report.trimmed,
                "stored action list exceeded the budget or had duplicates"
            );
        }
        self.commit(next)?;
        Ok(report)
    }

    /// Opens the confirmation modal for an action. Unknown ids leave the UI unchanged.
    pub fn preview_action(&mut self, action_id: &str) -> Option<ActionPreview> {
        let preview = render_action_preview(&self.incident, &self.record, action_id)?;
        self.ui.pending_action = Some(preview.action_id.clone());
        self.ui.modal_open = true;
        Some(preview)
    }

    /// Takes the pending action, if any, and closes the modal.
    pub fn confirm_take_action(&mut self, now: Instant) -> CoreResult<Option<ActionOutcome>> {
        let Some(action_id) = self.ui.pending_action.clone() else {
            return Ok(None);
        };
        let outcome = self.take_action(&action_id, now)?;
        self.close_modal();
        Ok(Some(outcome))
    }

    pub fn close_modal(&mut self) {
        self.ui.modal_open = false;
        self.ui.pending_action = None;
    }

    /// Applies an action and persists on success. Rejections are logged and change nothing.
    pub fn take_action(&mut self, action_id: &str, now: Instant) -> CoreResult<ActionOutcome> {
        let mut next = self.record.clone();
        let outcome = rules::take_action(&self.incident, &mut next, action_id);
        match &outcome {
            ActionOutcome::Applied(applied) => {
                self.commit(next)?;
                tracing::debug!(
                    action_id,
                    preserved = applied.preserved.len(),
                    lost = applied.lost.len(),
                    "action applied"
                );
                self.toast.show(MSG_ACTION_TAKEN, now);
            }
            ActionOutcome::Rejected { reason } => {
                tracing::debug!(action_id, ?reason, "action rejected");
            }
        }
        Ok(outcome)
    }

    /// Overwrites the record fields from the form. An empty actions field keeps the
    /// existing transcript.
    pub fn save_notes(&mut self, form: NotesForm, now: Instant) -> CoreResult<()> {
        let mut next = self.record.clone();
        next.notes.what = form.what;
        next.notes.when = form.when;
        if !form.actions.is_empty() {
            next.notes.actions = form.actions;
        }
        next.notes.status = form.status;
        next.notes.escalate_why = form.escalate_why;
        self.commit(next)?;
        self.toast.show(MSG_NOTES_SAVED, now);
        Ok(())
    }

    /// Fills the blank what/when/status fields with starter text.
    pub fn fill_template(&mut self, now: Instant) -> CoreResult<()> {
        let mut next = self.record.clone();
        let notes = &mut next.notes;
        if notes.what.trim().is_empty() {
            notes.what = TEMPLATE_WHAT.to_string();
        }
        if notes.when.trim().is_empty() {
            notes.when = template_when(&self.incident.report.time);
        }
        if notes.status.trim().is_empty() {
            notes.status = TEMPLATE_STATUS.to_string();
        }
        self.commit(next)?;
        self.toast.show(MSG_TEMPLATE_FILLED, now);
        Ok(())
    }

    pub fn set_escalate(&mut self, choice: Escalation) -> CoreResult<()> {
        let mut next = self.record.clone();
        next.notes.escalate = choice;
        self.commit(next)
    }

    /// Persists `next` and only then adopts it, so a failed write leaves the session on
    /// the last stored record.
    fn commit(&mut self, next: IncidentRecord) -> CoreResult<()> {
        self.store.save(&next)?;
        self.record = next;
        Ok(())
    }

    /// Drops the persisted record and starts over with a closed modal.
    pub fn reset(&mut self) -> CoreResult<ReconcileReport> {
        tracing::info!(key = self.store.key(), "incident state reset");
        self.store.clear()?;
        self.ui = IncidentUiState::default();
        self.init()
    }

    /// Focuses a walkthrough section. Unknown sections are ignored.
    pub fn go_to(&mut self, section: &str) -> Option<&'static str> {
        let panel = section_panel(section)?;
        self.ui.focused_panel = Some(panel);
        Some(panel)
    }

    pub fn summary(&self) -> IncidentSummary {
        summarize(&self.incident, &self.record)
    }

    pub fn availability(&self, action_id: &str) -> ActionAvailability {
        action_availability(&self.incident, &self.record, action_id)
    }

    pub fn incident(&self) -> &Incident {
        &self.incident
    }

    pub fn record(&self) -> &IncidentRecord {
        &self.record
    }

    pub fn ui(&self) -> &IncidentUiState {
        &self.ui
    }

    pub fn toast(&self) -> &Toast {
        &self.toast
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.toast.tick(now)
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    pub fn render(&self, surface: &mut impl RenderSurface) {
        surface.replace_html(ACTION_LIST, &render_actions(&self.incident, &self.record));
        surface.replace_html(EVIDENCE_LIST, &render_evidence(&self.incident, &self.record));

        let s = self.summary();
        surface.set_text(COUNT_PRESERVED, &s.preserved.to_string());
        surface.set_text(COUNT_LOST, &s.lost.to_string());
        surface.set_text(COUNT_CHOSEN, &s.chosen.to_string());
        surface.set_text(COUNT_ESCALATE, &s.escalate.to_string());
        surface.set_text(TOKENS_LEFT, &s.tokens_left.to_string());
        surface.set_text(ACTIONS_TAKEN, &s.actions_taken.to_string());

        surface.set_active(STEP_ROLES, s.steps.roles);
        surface.set_active(STEP_ACTIONS, s.steps.actions);
        surface.set_active(STEP_OUTCOME, s.steps.outcome);
        surface.set_active(STEP_RECORD, s.steps.record);
        surface.set_active(STEP_ESCALATE, s.steps.escalate);

        let notes = &self.record.notes;
        surface.set_text(NOTE_WHAT, &notes.what);
        surface.set_text(NOTE_WHEN, &notes.when);
        surface.set_text(NOTE_ACTIONS, &notes.actions);
        surface.set_text(NOTE_STATUS, &notes.status);
        surface.set_text(NOTE_ESCALATE_WHY, &notes.escalate_why);
        surface.set_active(ESCALATE_NO, notes.escalate == Escalation::No);
        surface.set_active(ESCALATE_NOT_YET, notes.escalate == Escalation::NotYet);
        surface.set_active(ESCALATE_YES, notes.escalate == Escalation::Yes);

        let preview = self
            .ui
            .pending_action
            .as_deref()
            .and_then(|id| render_action_preview(&self.incident, &self.record, id));
        surface.set_active(MODAL_BACKDROP, self.ui.modal_open && preview.is_some());
        if let Some(p) = preview {
            surface.set_text(MODAL_TITLE, &p.title);
            surface.set_text(MODAL_DESC, &p.description);
            surface.set_text(MODAL_PRESERVE, &p.preserve_list);
            surface.set_text(MODAL_LOSE, &p.lose_list);
            surface.set_text(MODAL_RISKS, &p.risk_list);
            surface.set_text(MODAL_TAKE_BTN, &p.take_label);
            surface.set_active(MODAL_TAKE_BTN, p.take_enabled);
        }

        surface.set_text(TOAST, self.toast.message().unwrap_or(""));
        surface.set_active(TOAST, self.toast.is_visible());

        for panel in [ACTIONS_PANEL, RECORD_PANEL, ESCALATE_PANEL] {
            surface.set_active(panel, self.ui.focused_panel == Some(panel));
        }
    }
}
