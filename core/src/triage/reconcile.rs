use super::model::{EventResponse, TriageCatalog, TriageRecord};
use crate::storage::state_store::ReconcileReport;

/// Gives every catalog event a response entry. Existing entries are left untouched,
/// so running this twice is the same as running it once.
pub fn reconcile(catalog: &TriageCatalog, record: &mut TriageRecord) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    for ev in &catalog.events {
        if !record.responses.contains_key(&ev.id) {
            record
                .responses
                .insert(ev.id.clone(), EventResponse::default());
            report.added.push(ev.id.clone());
        }
    }
    report
}
