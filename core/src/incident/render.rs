use super::model::{Incident, IncidentRecord};
use super::rules::{action_availability, ActionAvailability};
use crate::view::escape::escape_html;
use serde::Serialize;

pub const ACTION_LIST: &str = "actionList";
pub const EVIDENCE_LIST: &str = "evidenceList";
pub const COUNT_PRESERVED: &str = "countPreserved";
pub const COUNT_LOST: &str = "countLost";
pub const COUNT_CHOSEN: &str = "countChosen";
pub const COUNT_ESCALATE: &str = "countEscalate";
pub const TOKENS_LEFT: &str = "tokensLeft";
pub const ACTIONS_TAKEN: &str = "actionsTaken";

pub const STEP_ROLES: &str = "stepRoles";
pub const STEP_ACTIONS: &str = "stepActions";
pub const STEP_OUTCOME: &str = "stepOutcome";
pub const STEP_RECORD: &str = "stepRecord";
pub const STEP_ESCALATE: &str = "stepEscalate";

pub const NOTE_WHAT: &str = "irWhat";
pub const NOTE_WHEN: &str = "irWhen";
pub const NOTE_ACTIONS: &str = "irActions";
pub const NOTE_STATUS: &str = "irStatus";
pub const NOTE_ESCALATE_WHY: &str = "escalateWhy";
pub const ESCALATE_NO: &str = "escalate-no";
pub const ESCALATE_NOT_YET: &str = "escalate-not_yet";
pub const ESCALATE_YES: &str = "escalate-yes";

pub const MODAL_BACKDROP: &str = "modalBackdrop";
pub const MODAL_TITLE: &str = "modalTitle";
pub const MODAL_DESC: &str = "modalDesc";
pub const MODAL_PRESERVE: &str = "modalPreserve";
pub const MODAL_LOSE: &str = "modalLose";
pub const MODAL_RISKS: &str = "modalRisks";
pub const MODAL_TAKE_BTN: &str = "modalTakeBtn";
pub const TOAST: &str = "toast";

pub const ACTIONS_PANEL: &str = "actionsPanel";
pub const RECORD_PANEL: &str = "recordPanel";
pub const ESCALATE_PANEL: &str = "escalatePanel";

/// Every element id the walkthrough renders into.
pub const SURFACE_TARGETS: [&str; 32] = [
    ACTION_LIST,
    EVIDENCE_LIST,
    COUNT_PRESERVED,
    COUNT_LOST,
    COUNT_CHOSEN,
    COUNT_ESCALATE,
    TOKENS_LEFT,
    ACTIONS_TAKEN,
    STEP_ROLES,
    STEP_ACTIONS,
    STEP_OUTCOME,
    STEP_RECORD,
    STEP_ESCALATE,
    NOTE_WHAT,
    NOTE_WHEN,
    NOTE_ACTIONS,
    NOTE_STATUS,
    NOTE_ESCALATE_WHY,
    ESCALATE_NO,
    ESCALATE_NOT_YET,
    ESCALATE_YES,
    MODAL_BACKDROP,
    MODAL_TITLE,
    MODAL_DESC,
    MODAL_PRESERVE,
    MODAL_LOSE,
    MODAL_RISKS,
    MODAL_TAKE_BTN,
    TOAST,
    ACTIONS_PANEL,
    RECORD_PANEL,
    ESCALATE_PANEL,
];

/// Panel ids reachable through the stepper shortcuts.
pub fn section_panel(which: &str) -> Option<&'static str> {
    match which {
        "actions" => Some(ACTIONS_PANEL),
        "record" => Some(RECORD_PANEL),
        "escalate" => Some(ESCALATE_PANEL),
        _ => None,
    }
}

fn badge_row(class: &str, prefix: &str, labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| format!(r#"<span class="badge {}">{}{}</span>"#, class, prefix, escape_html(l)))
        .collect::<Vec<_>>()
        .join("")
}

pub fn render_actions(incident: &Incident, record: &IncidentRecord) -> String {
    let mut out = Vec::new();
    for a in &incident.actions {
        let availability = action_availability(incident, record, &a.id);
        let taken = availability == ActionAvailability::Taken;
        let no_tokens = availability == ActionAvailability::NoTokensLeft;
        let aid = escape_html(&a.id);

        let preserve_labels: Vec<String> = a
            .preserves
            .iter()
            .map(|x| incident.evidence_label(x).to_string())
            .collect();
        let destroy_labels: Vec<String> = a
            .destroys
            .iter()
            .map(|x| incident.evidence_label(x).to_string())
            .collect();

        out.push(format!(r#"<div class="action-item" id="action-{}">"#, aid));
        out.push(r#"  <div class="action-top">"#.to_string());
        out.push(format!(
            r#"    <div class="action-title">{}</div>"#,
            escape_html(&a.title)
        ));
        out.push(format!(r#"    <span class="tag">{}</span>"#, escape_html(&a.phase)));
        out.push("  </div>".to_string());
        out.push(format!(
            r#"  <div class="action-desc">{}</div>"#,
            escape_html(&a.description)
        ));
        out.push(format!(
            r#"  <div class="action-effects">{}{}{}</div>"#,
            badge_row("badge-preserve", "Preserve: ", &preserve_labels),
            badge_row("badge-destroy", "May lose: ", &destroy_labels),
            badge_row("badge-risk", "", &a.risks)
        ));
        out.push(r#"  <div class="action-btns">"#.to_string());
        out.push(format!(
            r#"    <button class="btn" type="button" data-action="preview" data-id="{}">Preview</button>"#,
            aid
        ));
        out.push(format!(
            r#"    <button class="btn btn-secondary" type="button" data-action="take" data-id="{}"{}>Take action</button>"#,
            aid,
            if taken || no_tokens { " disabled" } else { "" }
        ));
        if taken {
            out.push(r#"    <span class="pill pill-warn">Taken</span>"#.to_string());
        }
        if no_tokens {
            out.push(r#"    <span class="pill">No tokens left</span>"#.to_string());
        }
        out.push("  </div>".to_string());
        out.push("</div>".to_string());
    }
    out.join("\n")
}

pub fn render_evidence(incident: &Incident, record: &IncidentRecord) -> String {
    let mut out = Vec::new();
    for e in &incident.evidence {
        let st = record.status_of(&e.id);
        out.push(r#"<div class="evidence-item">"#.to_string());
        out.push(r#"  <div class="evidence-top">"#.to_string());
        out.push(format!(
            r#"    <div class="evidence-title">{}</div>"#,
            escape_html(&e.title)
        ));
        out.push(format!(
            r#"    <span class="state {}">{}</span>"#,
            st.css_class(),
            st.display_label()
        ));
        out.push("  </div>".to_string());
        out.push(format!(
            r#"  <div class="evidence-desc">{}</div>"#,
            escape_html(&e.description)
        ));
        out.push("</div>".to_string());
    }
    out.join("\n")
}

/// Confirmation modal content. All fields are plain text, not markup.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionPreview {
    pub action_id: String,
    pub title: String,
    pub description: String,
    pub preserve_list: String,
    pub lose_list: String,
    pub risk_list: String,
    pub take_enabled: bool,
    pub take_label: String,
}

fn bullet_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let lines: Vec<String> = items.map(|i| format!("• {}", i)).collect();
    if lines.is_empty() {
        "• (none)".to_string()
    } else {
        lines.join("\n")
    }
}

pub fn render_action_preview(
    incident: &Incident,
    record: &IncidentRecord,
    action_id: &str,
) -> Option<ActionPreview> {
    let a = incident.action(action_id)?;
    let availability = action_availability(incident, record, action_id);
    Some(ActionPreview {
        action_id: a.id.clone(),
        title: format!("Preview: {}", a.title),
        description: a.description.clone(),
        preserve_list: bullet_list(a.preserves.iter().map(|id| incident.evidence_label(id))),
        lose_list: bullet_list(a.destroys.iter().map(|id| incident.evidence_label(id))),
        risk_list: bullet_list(a.risks.iter().map(String::as_str)),
        take_enabled: availability == ActionAvailability::Available,
        take_label: availability.button_label().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::model::{Evidence, EvidenceStatus, IncidentAction};

    fn incident() -> Incident {
        Incident::new(
            vec![Evidence {
                id: "e1".to_string(),
                title: "Sign-in <logs>".to_string(),
                description: "IdP audit trail".to_string(),
            }],
            vec![IncidentAction {
                id: "a1".to_string(),
                title: "Reset password".to_string(),
                description: "Force a reset".to_string(),
                phase: "Contain".to_string(),
                preserves: vec![],
                destroys: vec!["e1".to_string(), "ghost".to_string()],
                risks: vec!["Tips off attacker".to_string()],
            }],
            1,
        )
    }

    #[test]
    fn actions_show_resolved_and_escaped_effect_labels() {
        let html = render_actions(&incident(), &IncidentRecord::default());
        assert!(html.contains("May lose: Sign-in &lt;logs&gt;"));
        assert!(html.contains("May lose: ghost"));
        assert!(html.contains(r#"<span class="badge badge-risk">Tips off attacker</span>"#));
        assert!(!html.contains(" disabled"));
        assert!(!html.contains("Taken"));
    }

    #[test]
    fn taken_action_is_disabled_and_marked() {
        let mut rec = IncidentRecord::default();
        rec.actions_taken.push("a1".to_string());
        let html = render_actions(&incident(), &rec);
        assert!(html.contains(r#"data-id="a1" disabled>Take action"#));
        assert!(html.contains(r#"<span class="pill pill-warn">Taken</span>"#));
        assert!(!html.contains("No tokens left"));
    }

    #[test]
    fn evidence_chip_follows_status() {
        let mut rec = IncidentRecord::default();
        let html = render_evidence(&incident(), &rec);
        assert!(html.contains(r#"<span class="state state-available">Available</span>"#));

        rec.evidence.insert("e1".to_string(), EvidenceStatus::Lost);
        let html = render_evidence(&incident(), &rec);
        assert!(html.contains(r#"<span class="state state-lost">Lost</span>"#));
    }

    #[test]
    fn preview_lists_effects_and_button_state() {
        let p = render_action_preview(&incident(), &IncidentRecord::default(), "a1").unwrap();
        assert_eq!(p.title, "Preview: Reset password");
        assert_eq!(p.preserve_list, "• (none)");
        assert_eq!(p.lose_list, "• Sign-in <logs>\n• ghost");
        assert_eq!(p.risk_list, "• Tips off attacker");
        assert!(p.take_enabled);
        assert_eq!(p.take_label, "Take action");

        assert!(render_action_preview(&incident(), &IncidentRecord::default(), "zz").is_none());
    }

    #[test]
    fn section_shortcuts() {
        assert_eq!(section_panel("record"), Some("recordPanel"));
        assert_eq!(section_panel("evidence"), None);
    }
}
