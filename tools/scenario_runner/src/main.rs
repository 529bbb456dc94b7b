use cyberlab_core::error::CoreResult;
use cyberlab_core::incident::model::{Evidence, Incident, IncidentAction, IncidentRecord};
use cyberlab_core::incident::rules::{ActionOutcome, RejectReason};
use cyberlab_core::incident::workflow::IncidentWalkthrough;
use cyberlab_core::labels::Escalation;
use cyberlab_core::storage::kv::{FileKeyValueStore, KeyValueStore};
use cyberlab_core::storage::state_store::StateStore;
use cyberlab_core::triage::model::{
    Classification, EventResponse, TriageCatalog, TriageEvent, TriageRecord, TRIAGE_STORAGE_KEY,
};
use cyberlab_core::triage::workflow::TriageBoard;
use serde_json::json;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    // Replays the reference scenarios against file-backed storage in a scratch directory and
    // prints one stable CHECK line per property. Exits non-zero if any check fails.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let tmp = match tempfile::tempdir() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("scenario_runner error: {}", e);
            std::process::exit(1);
        }
    };

    let checks: [(&str, fn(&Path) -> CoreResult<bool>); 5] = [
        ("TRIAGE_SCENARIO", triage_scenario),
        ("TRIAGE_RECONCILE_NON_DESTRUCTIVE", triage_reconcile_non_destructive),
        ("IR_BUDGET_SCENARIO", incident_budget_scenario),
        ("IR_PRESERVE_TIE_BREAK", incident_tie_break),
        ("STORE_CORRUPTION_RECOVERY", corruption_recovery),
    ];

    let mut any_fail = false;
    for (idx, (check_id, run)) in checks.iter().enumerate() {
        let dir = tmp.path().join(format!("check_{}", idx));
        let (result, message) = match run(&dir) {
            Ok(true) => ("PASS", String::new()),
            Ok(false) => ("FAIL", "unexpected state".to_string()),
            Err(e) => ("FAIL", e.to_string()),
        };
        if result != "PASS" {
            any_fail = true;
        }
        println!("CHECK {} {} {}", check_id, result, message);
    }

    if any_fail {
        std::process::exit(1);
    }
}

fn event(id: &str) -> TriageEvent {
    TriageEvent {
        id: id.to_string(),
        timestamp: "2025-03-01 09:00".to_string(),
        category: "Identity".to_string(),
        source: "IdP".to_string(),
        event_type: "Sign-in".to_string(),
        details: String::new(),
        prompts: vec![],
        instructor_notes: None,
    }
}

fn triage_scenario(dir: &Path) -> CoreResult<bool> {
    let catalog = TriageCatalog::new(vec![event("A"), event("B")]);
    let mut board = TriageBoard::new(catalog, FileKeyValueStore::open(dir)?);
    board.init()?;
    let filled = ["A", "B"]
        .iter()
        .all(|id| board.response(id).is_some_and(EventResponse::is_blank));

    board.save_response(
        "A",
        EventResponse {
            classification: Classification::Signal,
            escalate: Escalation::Yes,
            ..EventResponse::default()
        },
    )?;
    let s = board.summary();
    let counted = s.signal == 1 && s.escalate == 1;

    board.clear_response("A")?;
    let s = board.summary();
    let cleared = s.signal == 0 && s.escalate == 0 && board.response("A").is_some_and(EventResponse::is_blank);

    Ok(filled && counted && cleared)
}

fn triage_reconcile_non_destructive(dir: &Path) -> CoreResult<bool> {
    let mut kv = FileKeyValueStore::open(dir)?;
    let stored = json!({"responses": {"A": {"classification": "noise", "notes": "scanner"}}});
    kv.set_item(TRIAGE_STORAGE_KEY, &stored.to_string())?;

    let catalog = TriageCatalog::new(vec![event("A"), event("B")]);
    let mut board = TriageBoard::new(catalog, kv);
    board.init()?;
    let first = board.record().clone();
    board.init()?;

    let kept = board
        .response("A")
        .is_some_and(|r| r.classification == Classification::Noise && r.notes == "scanner");
    Ok(kept && board.record() == &first && board.response("B").is_some())
}

fn three_action_incident() -> Incident {
    let ev = |id: &str| Evidence {
        id: id.to_string(),
        title: id.to_uppercase(),
        description: String::new(),
    };
    let act = |id: &str, preserves: &[&str], destroys: &[&str]| IncidentAction {
        id: id.to_string(),
        title: format!("Action {}", id),
        description: String::new(),
        phase: "Contain".to_string(),
        preserves: preserves.iter().map(|s| s.to_string()).collect(),
        destroys: destroys.iter().map(|s| s.to_string()).collect(),
        risks: vec![],
    };
    Incident::new(
        vec![ev("e1"), ev("e2")],
        vec![act("a1", &["e1"], &[]), act("a2", &[], &["e2"]), act("a3", &["e2"], &[])],
        2,
    )
}

fn rejected_with(outcome: &ActionOutcome, expected: RejectReason) -> bool {
    matches!(outcome, ActionOutcome::Rejected { reason } if *reason == expected)
}

fn incident_budget_scenario(dir: &Path) -> CoreResult<bool> {
    let mut ir = IncidentWalkthrough::new(three_action_incident(), FileKeyValueStore::open(dir)?);
    ir.init()?;
    let now = Instant::now();

    let first = ir.take_action("a1", now)?.is_applied();
    let second = ir.take_action("a2", now)?.is_applied();
    let third = rejected_with(&ir.take_action("a3", now)?, RejectReason::BudgetExhausted);
    let again = ir.take_action("a1", now)?;
    let duplicate = rejected_with(&again, RejectReason::AlreadyTaken);

    // state survives a fresh session on the same directory
    let mut reopened = IncidentWalkthrough::new(three_action_incident(), FileKeyValueStore::open(dir)?);
    reopened.init()?;

    Ok(first
        && second
        && third
        && duplicate
        && ir.record().actions_taken == ["a1", "a2"]
        && reopened.record() == ir.record())
}

fn incident_tie_break(dir: &Path) -> CoreResult<bool> {
    let mut incident = three_action_incident();
    incident.actions[0].destroys = vec!["e1".to_string()];
    let mut ir = IncidentWalkthrough::new(incident, FileKeyValueStore::open(dir)?);
    ir.init()?;
    ir.take_action("a1", Instant::now())?;
    Ok(ir.summary().preserved == 1 && ir.summary().lost == 0)
}

fn corruption_recovery(dir: &Path) -> CoreResult<bool> {
    let mut kv = FileKeyValueStore::open(dir)?;
    kv.set_item(TRIAGE_STORAGE_KEY, "{not json")?;
    let store = StateStore::new(kv, TRIAGE_STORAGE_KEY);
    let triage: TriageRecord = store.load();
    let incident: IncidentRecord = store.load();
    Ok(triage == TriageRecord::default() && incident == IncidentRecord::default())
}
