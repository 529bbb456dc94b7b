use crate::error::{CoreError, CoreResult};
use crate::labels::{label_from_value, text_field, Escalation, StoredLabel};
use crate::storage::state_store::PersistedRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

pub const TRIAGE_STORAGE_KEY: &str = "wwc2025_lab3_triage_v1";
pub const DEFAULT_TRIAGE_TITLE: &str = "Lab 3 — Threat Detection Workflow: Signal vs Noise";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriageEvent {
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub prompts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_notes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageCatalog {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub scenario: Value,
    #[serde(default)]
    pub events: Vec<TriageEvent>,
    #[serde(default)]
    pub instructor: bool,
}

fn default_title() -> String {
    DEFAULT_TRIAGE_TITLE.to_string()
}

impl TriageCatalog {
    pub fn new(events: Vec<TriageEvent>) -> Self {
        Self {
            title: default_title(),
            scenario: Value::Object(Map::new()),
            events,
            instructor: false,
        }
    }

    pub fn event(&self, id: &str) -> Option<&TriageEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let mut seen = BTreeSet::new();
        for ev in &self.events {
            if ev.id.trim().is_empty() {
                return Err(CoreError::InvalidInput("event with empty id".to_string()));
            }
            if !seen.insert(ev.id.as_str()) {
                return Err(CoreError::InvalidInput(format!(
                    "duplicate event id {}",
                    ev.id
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Classification {
    #[default]
    None,
    Noise,
    Signal,
    Context,
}

impl StoredLabel for Classification {
    fn as_label(self) -> &'static str {
        match self {
            Classification::None => "",
            Classification::Noise => "noise",
            Classification::Signal => "signal",
            Classification::Context => "context",
        }
    }

    fn from_label(raw: &str) -> Option<Self> {
        match raw {
            "" => Some(Classification::None),
            "noise" => Some(Classification::Noise),
            "signal" => Some(Classification::Signal),
            "context" => Some(Classification::Context),
            _ => None,
        }
    }
}

crate::stored_label_serde!(Classification);

/// A user's answer for one event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventResponse {
    pub classification: Classification,
    pub escalate: Escalation,
    pub wanted: String,
    pub notes: String,
}

impl EventResponse {
    pub fn from_stored(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        Some(Self {
            classification: obj.get("classification").map(label_from_value).unwrap_or_default(),
            escalate: obj.get("escalate").map(label_from_value).unwrap_or_default(),
            wanted: text_field(obj, "wanted"),
            notes: text_field(obj, "notes"),
        })
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriageRecord {
    #[serde(default)]
    pub responses: BTreeMap<String, EventResponse>,
    /// Top-level keys this version does not know about, written back as they were read.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersistedRecord for TriageRecord {
    fn from_stored(mut obj: Map<String, Value>) -> Self {
        let responses = obj
            .get("responses")
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(id, raw)| EventResponse::from_stored(raw).map(|r| (id.clone(), r)))
                    .collect()
            })
            .unwrap_or_default();
        obj.remove("responses");
        Self {
            responses,
            extra: obj,
        }
    }
}
