use super::model::{Classification, EventResponse, TriageCatalog, TriageEvent, TriageRecord};
use crate::labels::{Escalation, StoredLabel};
use crate::view::escape::escape_html;

pub const EVENT_LIST: &str = "eventList";
pub const DETAIL_PANEL: &str = "detailPanel";
pub const COUNT_NOISE: &str = "countNoise";
pub const COUNT_SIGNAL: &str = "countSignal";
pub const COUNT_CONTEXT: &str = "countContext";
pub const COUNT_ESCALATE: &str = "countEscalate";

/// Every element id the triage board renders into.
pub const SURFACE_TARGETS: [&str; 6] = [
    EVENT_LIST,
    DETAIL_PANEL,
    COUNT_NOISE,
    COUNT_SIGNAL,
    COUNT_CONTEXT,
    COUNT_ESCALATE,
];

const SELECTED_OUTLINE: &str = "outline: 2px solid rgba(138,180,248,.55);";

pub fn event_button_id(event_id: &str) -> String {
    format!("eventBtn-{}", event_id)
}

pub fn badges_id(event_id: &str) -> String {
    format!("badges-{}", event_id)
}

fn classification_badge(c: Classification) -> Option<(&'static str, &'static str)> {
    match c {
        Classification::Noise => Some(("badge-noise", "Noise")),
        Classification::Signal => Some(("badge-signal", "Signal")),
        Classification::Context => Some(("badge-context", "Needs context")),
        Classification::None => None,
    }
}

pub fn render_badges(resp: &EventResponse) -> String {
    let mut badges = Vec::new();
    if let Some((class, label)) = classification_badge(resp.classification) {
        badges.push(format!(r#"<span class="badge {}">{}</span>"#, class, label));
    }
    if resp.escalate == Escalation::Yes {
        badges.push(r#"<span class="badge badge-escalate">Escalate</span>"#.to_string());
    }
    badges.join("")
}

/// Left-hand event list. Only the selected event carries the highlight.
pub fn render_event_list(
    catalog: &TriageCatalog,
    record: &TriageRecord,
    selected: Option<&str>,
) -> String {
    let blank = EventResponse::default();
    let mut out = Vec::new();
    for ev in &catalog.events {
        let resp = record.responses.get(&ev.id).unwrap_or(&blank);
        let is_selected = selected == Some(ev.id.as_str());
        let id = escape_html(&ev.id);
        out.push(format!(
            r#"<button class="event-item{}" id="{}" type="button" data-event="{}"{}>"#,
            if is_selected { " selected" } else { "" },
            escape_html(&event_button_id(&ev.id)),
            id,
            if is_selected {
                format!(r#" style="{}""#, SELECTED_OUTLINE)
            } else {
                String::new()
            }
        ));
        out.push(format!(
            r#"  <div class="event-meta"><strong>{}</strong> · {} · {}</div>"#,
            escape_html(&ev.timestamp),
            escape_html(&ev.category),
            escape_html(&ev.source)
        ));
        out.push(format!(
            r#"  <div class="event-type">{}</div>"#,
            escape_html(&ev.event_type)
        ));
        out.push(format!(
            r#"  <div class="badges" id="{}">{}</div>"#,
            escape_html(&badges_id(&ev.id)),
            render_badges(resp)
        ));
        out.push("</button>".to_string());
    }
    out.join("\n")
}

fn radio(group: &str, event_id: &str, value: &str, label: &str, checked: bool) -> String {
    let id = escape_html(&format!("{}-{}-{}", group, event_id, value));
    let name = escape_html(&format!("{}-{}", group, event_id));
    format!(
        r#"<label class="radio" for="{id}"><input type="radio" id="{id}" name="{name}" value="{value}"{checked}><span>{label}</span></label>"#,
        id = id,
        name = name,
        value = escape_html(value),
        checked = if checked { " checked" } else { "" },
        label = escape_html(label),
    )
}

fn bullet_lines(items: &[String]) -> String {
    items
        .iter()
        .map(|p| format!("• {}", escape_html(p)))
        .collect::<Vec<_>>()
        .join("<br/>")
}

fn instructor_block(ev: &TriageEvent) -> Option<String> {
    let notes = ev.instructor_notes.as_ref()?;
    Some(
        [
            r#"<details class="instructor">"#.to_string(),
            "  <summary>Instructor Guidance</summary>".to_string(),
            r#"  <div class="callout callout-good">"#.to_string(),
            "    <strong>Guidance:</strong>".to_string(),
            format!(r#"    <div class="small">{}</div>"#, bullet_lines(notes)),
            "  </div>".to_string(),
            "</details>".to_string(),
        ]
        .join("\n"),
    )
}

/// Detail panel for one event: facts, classification and escalation choices, free-text
/// fields, and context prompts.
pub fn render_event_detail(ev: &TriageEvent, resp: &EventResponse, instructor: bool) -> String {
    let eid = ev.id.as_str();
    let classifications = [
        (Classification::Noise, "Noise"),
        (Classification::Signal, "Signal"),
        (Classification::Context, "Needs more context"),
    ];
    let escalations = [
        (Escalation::No, "No"),
        (Escalation::NotYet, "Not yet"),
        (Escalation::Yes, "Yes"),
    ];

    let mut out = vec![
        r#"<h2 class="h2">Event Details</h2>"#.to_string(),
        r#"<div class="codebox">"#.to_string(),
        format!("  <strong>{}</strong><br/>", escape_html(&ev.timestamp)),
        format!("  Category: {}<br/>", escape_html(&ev.category)),
        format!("  Source: {}<br/>", escape_html(&ev.source)),
        format!("  Type: {}<br/><br/>", escape_html(&ev.event_type)),
        format!("  {}", escape_html(&ev.details)),
        "</div>".to_string(),
        r#"<div class="form-row">"#.to_string(),
        r#"  <div class="pill">Step 1: classify</div>"#.to_string(),
        r#"  <div class="pill">Step 2: context</div>"#.to_string(),
        r#"  <div class="pill">Step 3: escalate decision</div>"#.to_string(),
        "</div>".to_string(),
        "<label>Classification</label>".to_string(),
        r#"<div class="radio-group">"#.to_string(),
    ];
    for (value, label) in classifications {
        out.push(format!(
            "  {}",
            radio("classification", eid, value.as_label(), label, resp.classification == value)
        ));
    }
    out.push("</div>".to_string());
    out.push(
        r#"<div class="small">If you pick “Needs more context,” write what you’d want before deciding.</div>"#
            .to_string(),
    );
    out.push("<label>What additional data would you want?</label>".to_string());
    out.push(format!(
        r#"<textarea id="{}">{}</textarea>"#,
        escape_html(&format!("wanted-{}", eid)),
        escape_html(&resp.wanted)
    ));
    out.push("<label>Escalate?</label>".to_string());
    out.push(r#"<div class="radio-group">"#.to_string());
    for (value, label) in escalations {
        out.push(format!(
            "  {}",
            radio("escalate", eid, value.as_label(), label, resp.escalate == value)
        ));
    }
    out.push("</div>".to_string());
    out.push(
        r#"<div class="small">Escalation should be rare. “Not yet” is valid if you need more context first.</div>"#
            .to_string(),
    );
    out.push("<label>Notes / justification</label>".to_string());
    out.push(format!(
        r#"<textarea id="{}">{}</textarea>"#,
        escape_html(&format!("notes-{}", eid)),
        escape_html(&resp.notes)
    ));
    out.push(r#"<div class="form-row">"#.to_string());
    out.push(format!(
        r#"  <button class="btn btn-secondary" type="button" data-action="triage-save" data-event="{}">Save</button>"#,
        escape_html(eid)
    ));
    out.push(format!(
        r#"  <button class="btn btn-danger" type="button" data-action="triage-clear" data-event="{}">Clear</button>"#,
        escape_html(eid)
    ));
    out.push("</div>".to_string());
    out.push(r#"<div class="callout">"#.to_string());
    out.push("  <strong>Context prompts:</strong>".to_string());
    out.push(format!(r#"  <div class="small">{}</div>"#, bullet_lines(&ev.prompts)));
    out.push("</div>".to_string());
    if instructor {
        if let Some(block) = instructor_block(ev) {
            out.push(block);
        }
    }
    out.join("\n")
}
