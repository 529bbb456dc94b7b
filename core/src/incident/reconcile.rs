use super::model::{EvidenceStatus, Incident, IncidentRecord};
use crate::storage::state_store::ReconcileReport;

/// Default-fills evidence statuses and restores the `actions_taken` invariants
/// (no duplicates, at most `max_first_actions` entries). Existing statuses are kept.
pub fn reconcile(incident: &Incident, record: &mut IncidentRecord) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    for ev in &incident.evidence {
        if !record.evidence.contains_key(&ev.id) {
            record
                .evidence
                .insert(ev.id.clone(), EvidenceStatus::Available);
            report.added.push(ev.id.clone());
        }
    }

    let mut kept: Vec<String> = Vec::with_capacity(record.actions_taken.len());
    for id in record.actions_taken.drain(..) {
        if kept.contains(&id) || kept.len() >= incident.rules.max_first_actions {
            report.trimmed.push(id);
        } else {
            kept.push(id);
        }
    }
    record.actions_taken = kept;
    report
}
