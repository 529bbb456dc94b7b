use cyberlab_core::labels::Escalation;
use cyberlab_core::storage::kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use cyberlab_core::storage::state_store::StateStore;
use cyberlab_core::triage::model::{
    Classification, EventResponse, TriageCatalog, TriageEvent, TriageRecord, TRIAGE_STORAGE_KEY,
};
use cyberlab_core::triage::reconcile::reconcile;
use cyberlab_core::triage::render::{self, SURFACE_TARGETS};
use cyberlab_core::triage::workflow::TriageBoard;
use cyberlab_core::view::surface::MemorySurface;
use serde_json::json;

fn event(id: &str) -> TriageEvent {
    TriageEvent {
        id: id.to_string(),
        timestamp: "2025-03-01 09:14".to_string(),
        category: "Identity".to_string(),
        source: "IdP".to_string(),
        event_type: "MFA push denied".to_string(),
        details: "Three denied pushes in two minutes".to_string(),
        prompts: vec!["Did the user initiate a sign-in?".to_string()],
        instructor_notes: Some(vec!["Classic MFA fatigue".to_string()]),
    }
}

fn catalog() -> TriageCatalog {
    TriageCatalog::new(vec![event("A"), event("B")])
}

fn signal_yes() -> EventResponse {
    EventResponse {
        classification: Classification::Signal,
        escalate: Escalation::Yes,
        wanted: "sign-in history".to_string(),
        notes: "burst of denials".to_string(),
    }
}

#[test]
fn triage_scenario_save_then_clear() {
    let mut board = TriageBoard::new(catalog(), MemoryKeyValueStore::new());
    assert_eq!(board.init().unwrap(), Some("A".to_string()));

    assert_eq!(board.record().responses.len(), 2);
    assert!(board.record().responses.values().all(EventResponse::is_blank));

    assert!(board.save_response("A", signal_yes()).unwrap());
    let s = board.summary();
    assert_eq!((s.noise, s.signal, s.context, s.escalate), (0, 1, 0, 1));

    assert!(board.clear_response("A").unwrap());
    let s = board.summary();
    assert_eq!((s.signal, s.escalate), (0, 0));
    assert!(board.response("A").unwrap().is_blank());
    assert_eq!(board.selected(), Some("A"));
}

#[test]
fn unknown_event_ids_are_ignored() {
    let mut board = TriageBoard::new(catalog(), MemoryKeyValueStore::new());
    board.init().unwrap();
    let before = board.record().clone();

    assert!(!board.save_response("Z", signal_yes()).unwrap());
    assert!(!board.clear_response("Z").unwrap());
    assert!(board.open_event("Z").is_none());
    assert_eq!(board.record(), &before);
    assert_eq!(board.selected(), Some("A"));
}

#[test]
fn reconciliation_is_idempotent_and_non_destructive() {
    let mut record = TriageRecord::default();
    record.responses.insert("A".to_string(), signal_yes());
    // responses for events no longer in the catalog are left alone
    record
        .responses
        .insert("retired".to_string(), EventResponse::default());

    let first = reconcile(&catalog(), &mut record);
    assert_eq!(first.added, vec!["B".to_string()]);
    let after_first = record.clone();

    let second = reconcile(&catalog(), &mut record);
    assert!(second.is_noop());
    assert_eq!(record, after_first);
    assert_eq!(record.responses["A"], signal_yes());
    assert!(record.responses.contains_key("retired"));
}

#[test]
fn responses_survive_a_new_session() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut board = TriageBoard::new(catalog(), FileKeyValueStore::open(dir.path()).unwrap());
        board.init().unwrap();
        board.save_response("B", signal_yes()).unwrap();
    }
    let mut board = TriageBoard::new(catalog(), FileKeyValueStore::open(dir.path()).unwrap());
    board.init().unwrap();
    assert_eq!(board.response("B"), Some(&signal_yes()));
    assert_eq!(board.summary().signal, 1);
}

#[test]
fn reset_removes_blob_and_reinitializes() {
    let mut board = TriageBoard::new(catalog(), MemoryKeyValueStore::new());
    board.init().unwrap();
    board.save_response("A", signal_yes()).unwrap();
    board.open_event("B");

    assert_eq!(board.reset_all().unwrap(), Some("A".to_string()));
    assert!(board.record().responses.values().all(EventResponse::is_blank));
    let raw = board.store().kv().get_item(TRIAGE_STORAGE_KEY).unwrap().unwrap();
    let stored: TriageRecord = serde_json::from_str(&raw).unwrap();
    assert_eq!(&stored, board.record());
}

#[test]
fn corrupt_blob_starts_fresh_and_is_overwritten() {
    let mut kv = MemoryKeyValueStore::new();
    kv.set_item(TRIAGE_STORAGE_KEY, "]]not json").unwrap();
    let mut board = TriageBoard::new(catalog(), kv);
    board.init().unwrap();
    assert_eq!(board.record().responses.len(), 2);

    let store = StateStore::new(board.store().kv().clone(), TRIAGE_STORAGE_KEY);
    let reloaded: TriageRecord = store.load();
    assert_eq!(&reloaded, board.record());
}

#[test]
fn stored_labels_outside_the_enum_load_as_defaults() {
    let mut kv = MemoryKeyValueStore::new();
    let blob = json!({"responses": {"A": {"classification": "maybe", "escalate": "yes", "notes": "x"}}});
    kv.set_item(TRIAGE_STORAGE_KEY, &blob.to_string()).unwrap();

    let mut board = TriageBoard::new(catalog(), kv);
    board.init().unwrap();
    let a = board.response("A").unwrap();
    assert_eq!(a.classification, Classification::None);
    assert_eq!(a.escalate, Escalation::Yes);
    assert_eq!(a.notes, "x");
}

#[test]
fn render_fills_panels_and_counters() {
    let mut board = TriageBoard::new(catalog(), MemoryKeyValueStore::new()).with_instructor(true);
    board.init().unwrap();
    board.save_response("B", signal_yes()).unwrap();
    board.open_event("B");

    let mut surface = MemorySurface::with_targets(SURFACE_TARGETS);
    board.render(&mut surface);
    let first = surface.clone();

    assert_eq!(surface.content(render::COUNT_SIGNAL), Some("1"));
    assert_eq!(surface.content(render::COUNT_ESCALATE), Some("1"));
    assert_eq!(surface.content(render::COUNT_NOISE), Some("0"));
    let detail = surface.content(render::DETAIL_PANEL).unwrap();
    assert!(detail.contains(r#"value="signal" checked>"#));
    assert!(detail.contains("Instructor Guidance"));
    let list = surface.content(render::EVENT_LIST).unwrap();
    assert!(list.contains(r#"<span class="badge badge-signal">Signal</span><span class="badge badge-escalate">Escalate</span>"#));

    board.render(&mut surface);
    assert_eq!(surface, first);
}

#[test]
fn render_skips_missing_targets() {
    let mut board = TriageBoard::new(catalog(), MemoryKeyValueStore::new());
    board.init().unwrap();

    let mut surface = MemorySurface::with_targets([render::COUNT_NOISE]);
    board.render(&mut surface);
    assert_eq!(surface.slots().len(), 1);
    assert_eq!(surface.content(render::COUNT_NOISE), Some("0"));
    assert_eq!(surface.content(render::EVENT_LIST), None);
}

#[test]
fn foreign_top_level_keys_survive_a_session() {
    let mut kv = MemoryKeyValueStore::new();
    let blob = json!({"responses": {"A": {"classification": "noise"}}, "cohort": "spring"});
    kv.set_item(TRIAGE_STORAGE_KEY, &blob.to_string()).unwrap();

    let mut board = TriageBoard::new(catalog(), kv);
    board.init().unwrap();
    board.save_response("B", signal_yes()).unwrap();

    let raw = board.store().kv().get_item(TRIAGE_STORAGE_KEY).unwrap().unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["cohort"], json!("spring"));
    assert_eq!(stored["responses"]["A"]["classification"], json!("noise"));
    assert_eq!(stored["responses"]["B"]["classification"], json!("signal"));
}
