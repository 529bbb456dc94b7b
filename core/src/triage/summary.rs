use super::model::{Classification, TriageCatalog, TriageRecord};
use crate::labels::Escalation;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TriageSummary {
    pub noise: usize,
    pub signal: usize,
    pub context: usize,
    pub escalate: usize,
}

/// Counts over catalog events only; responses for ids no longer in the catalog are ignored.
pub fn summarize(catalog: &TriageCatalog, record: &TriageRecord) -> TriageSummary {
    let mut s = TriageSummary::default();
    for ev in &catalog.events {
        let Some(r) = record.responses.get(&ev.id) else {
            continue;
        };
        match r.classification {
            Classification::Noise => s.noise += 1,
            Classification::Signal => s.signal += 1,
            Classification::Context => s.context += 1,
            Classification::None => {}
        }
        if r.escalate == Escalation::Yes {
            s.escalate += 1;
        }
    }
    s
}
