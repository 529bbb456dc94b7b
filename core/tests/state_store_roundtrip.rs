use cyberlab_core::config::LabConfig;
use cyberlab_core::incident::model::{EvidenceStatus, IncidentRecord, INCIDENT_STORAGE_KEY};
use cyberlab_core::labels::Escalation;
use cyberlab_core::storage::kv::{FileKeyValueStore, KeyValueStore};
use cyberlab_core::storage::state_store::StateStore;
use cyberlab_core::triage::model::{
    Classification, EventResponse, TriageRecord, TRIAGE_STORAGE_KEY,
};
use std::path::PathBuf;

fn sample_incident_record() -> IncidentRecord {
    let mut rec = IncidentRecord::default();
    rec.evidence.insert("signin".to_string(), EvidenceStatus::Preserved);
    rec.evidence.insert("device".to_string(), EvidenceStatus::Lost);
    rec.evidence.insert("mailbox".to_string(), EvidenceStatus::Available);
    rec.actions_taken = vec!["export".to_string(), "reimage".to_string()];
    rec.notes.what = "Unexpected MFA prompts \"x3\"".to_string();
    rec.notes.actions = "- Export logs (Preserve) — last 7 days\n- Reimage (Recover) — wipe".to_string();
    rec.notes.escalate = Escalation::Yes;
    rec.notes.escalate_why = "Executive".to_string();
    rec
}

#[test]
fn save_then_load_is_deep_equal() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = StateStore::new(
        FileKeyValueStore::open(dir.path()).unwrap(),
        INCIDENT_STORAGE_KEY,
    );
    let rec = sample_incident_record();
    store.save(&rec).unwrap();
    let loaded: IncidentRecord = store.load();
    assert_eq!(loaded, rec);

    // a second save of the loaded record changes nothing on disk
    let before = store.kv().get_item(INCIDENT_STORAGE_KEY).unwrap();
    store.save(&loaded).unwrap();
    assert_eq!(store.kv().get_item(INCIDENT_STORAGE_KEY).unwrap(), before);
}

#[test]
fn labs_use_separate_blobs() {
    let dir = tempfile::tempdir().unwrap();
    let kv = FileKeyValueStore::open(dir.path()).unwrap();
    let mut triage = StateStore::new(kv.clone(), TRIAGE_STORAGE_KEY);
    let mut incident = StateStore::new(kv, INCIDENT_STORAGE_KEY);

    let mut t = TriageRecord::default();
    t.responses.insert(
        "A".to_string(),
        EventResponse {
            classification: Classification::Context,
            ..EventResponse::default()
        },
    );
    triage.save(&t).unwrap();
    incident.save(&sample_incident_record()).unwrap();

    assert!(dir.path().join(format!("{}.json", TRIAGE_STORAGE_KEY)).exists());
    assert!(dir.path().join(format!("{}.json", INCIDENT_STORAGE_KEY)).exists());

    incident.clear().unwrap();
    assert_eq!(triage.load::<TriageRecord>(), t);
    assert_eq!(incident.load::<IncidentRecord>(), IncidentRecord::default());
}

#[test]
fn every_kind_of_corruption_loads_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut kv = FileKeyValueStore::open(dir.path()).unwrap();
    for raw in ["", "{", "null", "[1,2]", "42", "\"text\"", "{\"responses\": []}"] {
        kv.set_item(TRIAGE_STORAGE_KEY, raw).unwrap();
        let store = StateStore::new(kv.clone(), TRIAGE_STORAGE_KEY);
        assert_eq!(store.load::<TriageRecord>(), TriageRecord::default(), "{raw:?}");
    }
}

#[test]
fn config_file_and_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lab.json");
    std::fs::write(&path, r#"{"state_dir": "/var/lib/cyberlab", "toast_duration_ms": 1000}"#).unwrap();

    let cfg = LabConfig::load(&path).unwrap();
    assert_eq!(cfg.state_dir, PathBuf::from("/var/lib/cyberlab"));
    assert_eq!(cfg.toast_duration().as_millis(), 1000);
    assert!(!cfg.instructor);

    let missing = dir.path().join("nope.json");
    assert_eq!(LabConfig::load_or_default(Some(&missing)), LabConfig::default());

    std::fs::write(&path, "not json").unwrap();
    assert_eq!(LabConfig::load_or_default(Some(&path)), LabConfig::default());
}
