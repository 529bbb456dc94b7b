use super::model::{EvidenceStatus, Incident, IncidentAction, IncidentRecord};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    UnknownAction,
    AlreadyTaken,
    BudgetExhausted,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppliedAction {
    pub action_id: String,
    /// Evidence ids whose status changed to preserved.
    pub preserved: Vec<String>,
    /// Evidence ids whose status changed to lost.
    pub lost: Vec<String>,
    pub transcript_line: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Applied(AppliedAction),
    Rejected { reason: RejectReason },
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied(_))
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionAvailability {
    Available,
    Taken,
    NoTokensLeft,
}

impl ActionAvailability {
    pub fn button_label(self) -> &'static str {
        match self {
            ActionAvailability::Available => "Take action",
            ActionAvailability::Taken => "Already taken",
            ActionAvailability::NoTokensLeft => "No tokens left",
        }
    }
}

pub fn action_availability(
    incident: &Incident,
    record: &IncidentRecord,
    action_id: &str,
) -> ActionAvailability {
    if record.has_taken(action_id) {
        ActionAvailability::Taken
    } else if record.actions_taken.len() >= incident.rules.max_first_actions {
        ActionAvailability::NoTokensLeft
    } else {
        ActionAvailability::Available
    }
}

pub fn tokens_left(incident: &Incident, record: &IncidentRecord) -> usize {
    incident
        .rules
        .max_first_actions
        .saturating_sub(record.actions_taken.len())
}

pub fn transcript_line(action: &IncidentAction) -> String {
    format!("- {} ({}) — {}", action.title, action.phase, action.description)
}

/// Applies one action to the record.
///
/// Preserves are applied before destroys, each checked against the status at that moment:
/// `lost` is never re-preserved and `preserved` is never lost, so an id listed on both
/// sides of one action ends up preserved. Rejections leave the record untouched.
pub fn take_action(
    incident: &Incident,
    record: &mut IncidentRecord,
    action_id: &str,
) -> ActionOutcome {
    if record.has_taken(action_id) {
        return ActionOutcome::Rejected {
            reason: RejectReason::AlreadyTaken,
        };
    }
    if record.actions_taken.len() >= incident.rules.max_first_actions {
        return ActionOutcome::Rejected {
            reason: RejectReason::BudgetExhausted,
        };
    }
    let Some(action) = incident.action(action_id) else {
        return ActionOutcome::Rejected {
            reason: RejectReason::UnknownAction,
        };
    };

    let mut preserved = Vec::new();
    for eid in &action.preserves {
        let st = record.evidence.entry(eid.clone()).or_default();
        if *st != EvidenceStatus::Lost && *st != EvidenceStatus::Preserved {
            *st = EvidenceStatus::Preserved;
            preserved.push(eid.clone());
        }
    }
    let mut lost = Vec::new();
    for eid in &action.destroys {
        let st = record.evidence.entry(eid.clone()).or_default();
        if *st != EvidenceStatus::Preserved && *st != EvidenceStatus::Lost {
            *st = EvidenceStatus::Lost;
            lost.push(eid.clone());
        }
    }

    record.actions_taken.push(action.id.clone());

    let line = transcript_line(action);
    let existing = record.notes.actions.trim();
    record.notes.actions = if existing.is_empty() {
        line.clone()
    } else {
        format!("{}\n{}", existing, line)
    };

    ActionOutcome::Applied(AppliedAction {
        action_id: action.id.clone(),
        preserved,
        lost,
        transcript_line: line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::model::Evidence;

    fn ev(id: &str) -> Evidence {
        Evidence {
            id: id.to_string(),
            title: format!("Evidence {}", id),
            description: String::new(),
        }
    }

    fn act(id: &str, preserves: &[&str], destroys: &[&str]) -> IncidentAction {
        IncidentAction {
            id: id.to_string(),
            title: format!("Action {}", id),
            description: "does things".to_string(),
            phase: "Contain".to_string(),
            preserves: preserves.iter().map(|s| s.to_string()).collect(),
            destroys: destroys.iter().map(|s| s.to_string()).collect(),
            risks: vec![],
        }
    }

    #[test]
    fn preserve_wins_when_listed_on_both_sides() {
        let inc = Incident::new(vec![ev("e1")], vec![act("a1", &["e1"], &["e1"])], 3);
        let mut rec = IncidentRecord::default();
        let out = take_action(&inc, &mut rec, "a1");
        assert!(out.is_applied());
        assert_eq!(rec.status_of("e1"), EvidenceStatus::Preserved);
    }

    #[test]
    fn lost_is_sticky_against_later_preserve() {
        let inc = Incident::new(
            vec![ev("e1")],
            vec![act("wipe", &[], &["e1"]), act("image", &["e1"], &[])],
            3,
        );
        let mut rec = IncidentRecord::default();
        take_action(&inc, &mut rec, "wipe");
        assert_eq!(rec.status_of("e1"), EvidenceStatus::Lost);

        let out = take_action(&inc, &mut rec, "image");
        assert_eq!(rec.status_of("e1"), EvidenceStatus::Lost);
        match out {
            ActionOutcome::Applied(applied) => assert!(applied.preserved.is_empty()),
            other => panic!("expected applied, got {:?}", other),
        }
    }

    #[test]
    fn preserved_survives_later_destroy() {
        let inc = Incident::new(
            vec![ev("e1")],
            vec![act("image", &["e1"], &[]), act("reimage", &[], &["e1"])],
            3,
        );
        let mut rec = IncidentRecord::default();
        take_action(&inc, &mut rec, "image");
        take_action(&inc, &mut rec, "reimage");
        assert_eq!(rec.status_of("e1"), EvidenceStatus::Preserved);
    }

    #[test]
    fn rejections_leave_record_untouched() {
        let inc = Incident::new(vec![ev("e1")], vec![act("a1", &["e1"], &[])], 1);
        let mut rec = IncidentRecord::default();

        assert_eq!(
            take_action(&inc, &mut rec, "nope"),
            ActionOutcome::Rejected {
                reason: RejectReason::UnknownAction
            }
        );
        assert_eq!(rec, IncidentRecord::default());

        take_action(&inc, &mut rec, "a1");
        let snapshot = rec.clone();
        assert_eq!(
            take_action(&inc, &mut rec, "a1"),
            ActionOutcome::Rejected {
                reason: RejectReason::AlreadyTaken
            }
        );
        assert_eq!(rec, snapshot);
    }

    #[test]
    fn transcript_lines_are_appended() {
        let inc = Incident::new(
            vec![ev("e1")],
            vec![act("a1", &["e1"], &[]), act("a2", &[], &[])],
            2,
        );
        let mut rec = IncidentRecord::default();
        rec.notes.actions = "  first thoughts \n".to_string();
        take_action(&inc, &mut rec, "a1");
        take_action(&inc, &mut rec, "a2");
        assert_eq!(
            rec.notes.actions,
            "first thoughts\n- Action a1 (Contain) — does things\n- Action a2 (Contain) — does things"
        );
    }

    #[test]
    fn availability_tracks_budget() {
        let inc = Incident::new(vec![], vec![act("a1", &[], &[]), act("a2", &[], &[])], 1);
        let mut rec = IncidentRecord::default();
        assert_eq!(action_availability(&inc, &rec, "a1"), ActionAvailability::Available);
        assert_eq!(tokens_left(&inc, &rec), 1);

        take_action(&inc, &mut rec, "a1");
        assert_eq!(action_availability(&inc, &rec, "a1"), ActionAvailability::Taken);
        assert_eq!(action_availability(&inc, &rec, "a2"), ActionAvailability::NoTokensLeft);
        assert_eq!(tokens_left(&inc, &rec), 0);
        assert_eq!(ActionAvailability::NoTokensLeft.button_label(), "No tokens left");
    }
}
