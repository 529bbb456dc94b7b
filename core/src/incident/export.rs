use super::model::{Incident, IncidentRecord};
use super::summary::summarize;
use crate::error::CoreResult;
use crate::labels::{Escalation, StoredLabel};

pub fn render_evidence_board_csv(incident: &Incident, record: &IncidentRecord) -> CoreResult<String> {
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(["evidence_id", "title", "status"])?;
    for e in &incident.evidence {
        wtr.write_record([
            e.id.as_str(),
            e.title.as_str(),
            record.status_of(&e.id).as_label(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}

fn escalation_text(choice: Escalation) -> &'static str {
    match choice {
        Escalation::None => "(not decided)",
        Escalation::No => "No",
        Escalation::NotYet => "Not yet",
        Escalation::Yes => "Yes",
    }
}

fn section(out: &mut Vec<String>, heading: &str, body: &str) {
    out.push(format!("## {}", heading));
    out.push(String::new());
    let body = body.trim();
    out.push(if body.is_empty() { "_(blank)_".to_string() } else { body.to_string() });
    out.push(String::new());
}

/// Markdown incident record for instructor review.
pub fn render_incident_record_markdown(incident: &Incident, record: &IncidentRecord) -> String {
    let s = summarize(incident, record);
    let notes = &record.notes;
    let title = incident
        .extra
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("Incident Record");

    let mut out = vec![format!("# {}", title), String::new()];
    out.push(format!(
        "- Actions taken: {} (tokens left: {})",
        s.actions_taken, s.tokens_left
    ));
    out.push(format!("- Evidence preserved: {}", s.preserved));
    out.push(format!("- Evidence lost: {}", s.lost));
    out.push(String::new());

    section(&mut out, "What happened", &notes.what);
    section(&mut out, "When", &notes.when);
    section(&mut out, "Actions", &notes.actions);
    section(&mut out, "Status", &notes.status);

    out.push("## Escalation".to_string());
    out.push(String::new());
    out.push(format!("Decision: {}", escalation_text(notes.escalate)));
    if !notes.escalate_why.trim().is_empty() {
        out.push(String::new());
        out.push(notes.escalate_why.trim().to_string());
    }
    out.push(String::new());

    out.push("## Evidence Board".to_string());
    out.push(String::new());
    out.push("| Evidence | Status |".to_string());
    out.push("|---|---|".to_string());
    for e in &incident.evidence {
        out.push(format!(
            "| {} | {} |",
            e.title.replace('|', "\\|"),
            record.status_of(&e.id).display_label()
        ));
    }
    out.join("\n") + "\n"
}
