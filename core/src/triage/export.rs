use super::model::{EventResponse, TriageCatalog, TriageRecord};
use crate::error::CoreResult;
use crate::labels::StoredLabel;

/// One row per catalog event, in catalog order, for instructor review.
pub fn render_responses_csv(catalog: &TriageCatalog, record: &TriageRecord) -> CoreResult<String> {
    let blank = EventResponse::default();
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record([
        "event_id",
        "timestamp",
        "category",
        "type",
        "classification",
        "escalate",
        "wanted",
        "notes",
    ])?;
    for ev in &catalog.events {
        let r = record.responses.get(&ev.id).unwrap_or(&blank);
        wtr.write_record([
            ev.id.as_str(),
            ev.timestamp.as_str(),
            ev.category.as_str(),
            ev.event_type.as_str(),
            r.classification.as_label(),
            r.escalate.as_label(),
            r.wanted.as_str(),
            r.notes.as_str(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}
