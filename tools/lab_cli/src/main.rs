use cyberlab_core::catalog::{load_incident_catalog, load_triage_catalog};
use cyberlab_core::config::LabConfig;
use cyberlab_core::error::{CoreError, CoreResult};
use cyberlab_core::incident::export::{render_evidence_board_csv, render_incident_record_markdown};
use cyberlab_core::incident::render as ir_render;
use cyberlab_core::incident::workflow::{IncidentWalkthrough, NotesForm};
use cyberlab_core::labels::{Escalation, StoredLabel};
use cyberlab_core::storage::kv::{FileKeyValueStore, KeyValueStore};
use cyberlab_core::triage::export::render_responses_csv;
use cyberlab_core::triage::model::{Classification, EventResponse, TriageCatalog};
use cyberlab_core::triage::render as triage_render;
use cyberlab_core::triage::workflow::TriageBoard;
use cyberlab_core::view::surface::MemorySurface;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "usage: lab_cli [--config <lab.json>] <triage|ir> <catalog.json> <command> [args...]

triage commands:
  show                      render the board (event list, selected detail, counters)
  open <event_id>           render one event's detail panel
  save <event_id> <noise|signal|context|-> <no|not_yet|yes|-> [wanted] [notes]
  clear <event_id>
  summary | export-csv | reset

ir commands:
  show                      render the walkthrough panels
  preview <action_id>       show the confirmation modal content
  take <action_id>
  notes <what> <when> <actions> <status> <escalate_why>
  template
  escalate <no|not_yet|yes>
  goto <actions|record|escalate>
  summary | export-csv | export-md | reset";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn main() {
    init_tracing();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut config_path: Option<PathBuf> = None;
    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
        config_path = Some(PathBuf::from(args.remove(1)));
        args.remove(0);
    }
    if args.len() < 3 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let cfg = LabConfig::load_or_default(config_path.as_deref()).with_env_overrides();
    tracing::debug!(state_dir = ?cfg.state_dir, instructor = cfg.instructor, "config resolved");
    let lab = args[0].as_str();
    let catalog = PathBuf::from(&args[1]);
    let rest = &args[2..];

    let result = match lab {
        "triage" => run_triage(&cfg, &catalog, rest),
        "ir" => run_incident(&cfg, &catalog, rest),
        other => {
            eprintln!("unknown lab: {}", other);
            std::process::exit(2);
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(CoreError::InvalidInput(msg)) => {
            eprintln!("{}", msg);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("lab_cli error: {}", e);
            std::process::exit(1);
        }
    }
}

fn arg(rest: &[String], idx: usize, name: &str) -> CoreResult<String> {
    rest.get(idx)
        .cloned()
        .ok_or_else(|| CoreError::InvalidInput(format!("missing argument <{}>", name)))
}

fn choice<T: StoredLabel>(raw: &str, name: &str) -> CoreResult<T> {
    let raw = if raw == "-" { "" } else { raw };
    T::from_label(raw).ok_or_else(|| CoreError::InvalidInput(format!("invalid {}: {}", name, raw)))
}

fn print_json<T: serde::Serialize>(value: &T) -> CoreResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_surface(surface: &MemorySurface) {
    for (target, slot) in surface.slots() {
        if slot.content.is_empty() && !slot.active {
            continue;
        }
        let marker = if slot.active { " [active]" } else { "" };
        println!("== {}{}", target, marker);
        if !slot.content.is_empty() {
            println!("{}", slot.content);
        }
    }
}

/// Instructor mode is on when either the config or the catalog asks for it.
fn open_board<S: KeyValueStore>(cfg: &LabConfig, catalog: TriageCatalog, kv: S) -> TriageBoard<S> {
    let instructor = cfg.instructor || catalog.instructor;
    TriageBoard::new(catalog, kv).with_instructor(instructor)
}

/// Returns `Ok(false)` when the command was a recognised no-op (unknown id).
fn run_triage(cfg: &LabConfig, catalog: &Path, rest: &[String]) -> CoreResult<bool> {
    let catalog = load_triage_catalog(catalog)?;
    let kv = FileKeyValueStore::open(&cfg.state_dir)?;
    let mut board = open_board(cfg, catalog, kv);
    board.init()?;

    let cmd = arg(rest, 0, "command")?;
    match cmd.as_str() {
        "show" => {
            let mut surface = MemorySurface::with_targets(triage_render::SURFACE_TARGETS);
            board.render(&mut surface);
            print_surface(&surface);
        }
        "open" => {
            let id = arg(rest, 1, "event_id")?;
            match board.open_event(&id) {
                Some(html) => println!("{}", html),
                None => {
                    eprintln!("unknown event: {}", id);
                    return Ok(false);
                }
            }
        }
        "save" => {
            let id = arg(rest, 1, "event_id")?;
            let response = EventResponse {
                classification: choice::<Classification>(&arg(rest, 2, "classification")?, "classification")?,
                escalate: choice::<Escalation>(&arg(rest, 3, "escalate")?, "escalate")?,
                wanted: rest.get(4).cloned().unwrap_or_default(),
                notes: rest.get(5).cloned().unwrap_or_default(),
            };
            if !board.save_response(&id, response)? {
                eprintln!("unknown event: {}", id);
                return Ok(false);
            }
            print_json(&board.summary())?;
        }
        "clear" => {
            let id = arg(rest, 1, "event_id")?;
            if !board.clear_response(&id)? {
                eprintln!("unknown event: {}", id);
                return Ok(false);
            }
            print_json(&board.summary())?;
        }
        "summary" => print_json(&board.summary())?,
        "export-csv" => print!("{}", render_responses_csv(board.catalog(), board.record())?),
        "reset" => {
            board.reset_all()?;
            print_json(&board.summary())?;
        }
        other => return Err(CoreError::InvalidInput(format!("unknown triage command: {}", other))),
    }
    Ok(true)
}

fn run_incident(cfg: &LabConfig, catalog: &Path, rest: &[String]) -> CoreResult<bool> {
    let incident = load_incident_catalog(catalog)?;
    let kv = FileKeyValueStore::open(&cfg.state_dir)?;
    let mut ir = IncidentWalkthrough::new(incident, kv).with_toast_duration(cfg.toast_duration());
    ir.init()?;

    let now = Instant::now();
    let cmd = arg(rest, 0, "command")?;
    match cmd.as_str() {
        "show" => {
            let mut surface = MemorySurface::with_targets(ir_render::SURFACE_TARGETS);
            ir.render(&mut surface);
            print_surface(&surface);
        }
        "preview" => {
            let id = arg(rest, 1, "action_id")?;
            match ir.preview_action(&id) {
                Some(preview) => print_json(&preview)?,
                None => {
                    eprintln!("unknown action: {}", id);
                    return Ok(false);
                }
            }
        }
        "take" => {
            let id = arg(rest, 1, "action_id")?;
            let outcome = ir.take_action(&id, now)?;
            print_json(&outcome)?;
            if let Some(msg) = ir.toast().message() {
                eprintln!("{}", msg);
            }
            if !outcome.is_applied() {
                return Ok(false);
            }
        }
        "notes" => {
            let form = NotesForm {
                what: arg(rest, 1, "what")?,
                when: arg(rest, 2, "when")?,
                actions: arg(rest, 3, "actions")?,
                status: arg(rest, 4, "status")?,
                escalate_why: arg(rest, 5, "escalate_why")?,
            };
            ir.save_notes(form, now)?;
            eprintln!("{}", ir.toast().message().unwrap_or_default());
            print_json(&ir.record().notes)?;
        }
        "template" => {
            ir.fill_template(now)?;
            eprintln!("{}", ir.toast().message().unwrap_or_default());
            print_json(&ir.record().notes)?;
        }
        "escalate" => {
            let decision = choice::<Escalation>(&arg(rest, 1, "choice")?, "escalate")?;
            ir.set_escalate(decision)?;
            print_json(&ir.summary())?;
        }
        "goto" => {
            let section = arg(rest, 1, "section")?;
            match ir.go_to(&section) {
                Some(panel) => println!("{}", panel),
                None => return Ok(false),
            }
        }
        "summary" => print_json(&ir.summary())?,
        "export-csv" => print!("{}", render_evidence_board_csv(ir.incident(), ir.record())?),
        "export-md" => print!("{}", render_incident_record_markdown(ir.incident(), ir.record())),
        "reset" => {
            ir.reset()?;
            print_json(&ir.summary())?;
        }
        other => return Err(CoreError::InvalidInput(format!("unknown ir command: {}", other))),
    }
    Ok(true)
}
