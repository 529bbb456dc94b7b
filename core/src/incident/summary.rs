use super::model::{EvidenceStatus, Incident, IncidentRecord};
use super::rules::tokens_left;
use crate::labels::Escalation;
use serde::Serialize;

/// Which walkthrough steps are lit.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Steps {
    pub roles: bool,
    pub actions: bool,
    pub outcome: bool,
    pub record: bool,
    pub escalate: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct IncidentSummary {
    pub preserved: usize,
    pub lost: usize,
    pub chosen: usize,
    /// 1 when the escalation choice is "yes", else 0.
    pub escalate: usize,
    pub tokens_left: usize,
    pub actions_taken: usize,
    pub steps: Steps,
}

pub fn summarize(incident: &Incident, record: &IncidentRecord) -> IncidentSummary {
    let mut preserved = 0;
    let mut lost = 0;
    let mut any_changed = false;
    for e in &incident.evidence {
        match record.status_of(&e.id) {
            EvidenceStatus::Preserved => preserved += 1,
            EvidenceStatus::Lost => lost += 1,
            EvidenceStatus::Available => continue,
        }
        any_changed = true;
    }

    let taken = record.actions_taken.len();
    let steps = Steps {
        roles: true,
        actions: taken > 0,
        outcome: any_changed || taken >= incident.rules.max_first_actions,
        record: record.notes.has_record_text(),
        escalate: record.notes.escalate.is_recorded(),
    };

    IncidentSummary {
        preserved,
        lost,
        chosen: taken,
        escalate: usize::from(record.notes.escalate == Escalation::Yes),
        tokens_left: tokens_left(incident, record),
        actions_taken: taken,
        steps,
    }
}
