use crate::error::{CoreError, CoreResult};
use crate::labels::{label_from_value, text_field, Escalation, StoredLabel};
use crate::storage::state_store::PersistedRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

pub const INCIDENT_STORAGE_KEY: &str = "wwc2025_lab4_ir_evidence_v2";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Evidence {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentAction {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub preserves: Vec<String>,
    #[serde(default)]
    pub destroys: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentRules {
    pub max_first_actions: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentReport {
    #[serde(default)]
    pub time: String,
}

/// Exercise definition for the walkthrough. Fields the core does not use (title, summary,
/// roles, ...) are carried through untouched in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub evidence: Vec<Evidence>,
    pub actions: Vec<IncidentAction>,
    pub rules: IncidentRules,
    #[serde(default)]
    pub report: IncidentReport,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Incident {
    pub fn new(evidence: Vec<Evidence>, actions: Vec<IncidentAction>, max_first_actions: usize) -> Self {
        Self {
            evidence,
            actions,
            rules: IncidentRules { max_first_actions },
            report: IncidentReport::default(),
            extra: Map::new(),
        }
    }

    pub fn action(&self, id: &str) -> Option<&IncidentAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn evidence_item(&self, id: &str) -> Option<&Evidence> {
        self.evidence.iter().find(|e| e.id == id)
    }

    /// Display label for an evidence id: its title, or the raw id when unknown.
    pub fn evidence_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.evidence_item(id).map(|e| e.title.as_str()).unwrap_or(id)
    }

    pub fn validate(&self) -> CoreResult<()> {
        check_unique("evidence", self.evidence.iter().map(|e| e.id.as_str()))?;
        check_unique("action", self.actions.iter().map(|a| a.id.as_str()))?;
        Ok(())
    }
}

fn check_unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> CoreResult<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(CoreError::InvalidInput(format!("{} with empty id", kind)));
        }
        if !seen.insert(id) {
            return Err(CoreError::InvalidInput(format!("duplicate {} id {}", kind, id)));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EvidenceStatus {
    #[default]
    Available,
    Preserved,
    Lost,
}

impl EvidenceStatus {
    pub fn display_label(self) -> &'static str {
        match self {
            EvidenceStatus::Available => "Available",
            EvidenceStatus::Preserved => "Preserved",
            EvidenceStatus::Lost => "Lost",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            EvidenceStatus::Available => "state-available",
            EvidenceStatus::Preserved => "state-preserved",
            EvidenceStatus::Lost => "state-lost",
        }
    }
}

impl StoredLabel for EvidenceStatus {
    fn as_label(self) -> &'static str {
        match self {
            EvidenceStatus::Available => "available",
            EvidenceStatus::Preserved => "preserved",
            EvidenceStatus::Lost => "lost",
        }
    }

    fn from_label(raw: &str) -> Option<Self> {
        match raw {
            "available" => Some(EvidenceStatus::Available),
            "preserved" => Some(EvidenceStatus::Preserved),
            "lost" => Some(EvidenceStatus::Lost),
            _ => None,
        }
    }
}

crate::stored_label_serde!(EvidenceStatus);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IncidentNotes {
    pub what: String,
    pub when: String,
    /// Append-only transcript of taken actions, editable by the user.
    pub actions: String,
    pub status: String,
    pub escalate: Escalation,
    #[serde(rename = "escalateWhy")]
    pub escalate_why: String,
}

impl IncidentNotes {
    fn from_stored(obj: &Map<String, Value>) -> Self {
        Self {
            what: text_field(obj, "what"),
            when: text_field(obj, "when"),
            actions: text_field(obj, "actions"),
            status: text_field(obj, "status"),
            escalate: obj.get("escalate").map(label_from_value).unwrap_or_default(),
            escalate_why: text_field(obj, "escalateWhy"),
        }
    }

    pub fn has_record_text(&self) -> bool {
        [&self.what, &self.when, &self.actions, &self.status]
            .iter()
            .any(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IncidentRecord {
    pub evidence: BTreeMap<String, EvidenceStatus>,
    pub actions_taken: Vec<String>,
    pub notes: IncidentNotes,
}

impl IncidentRecord {
    pub fn status_of(&self, evidence_id: &str) -> EvidenceStatus {
        self.evidence.get(evidence_id).copied().unwrap_or_default()
    }

    pub fn has_taken(&self, action_id: &str) -> bool {
        self.actions_taken.iter().any(|a| a == action_id)
    }
}

impl PersistedRecord for IncidentRecord {
    fn from_stored(obj: Map<String, Value>) -> Self {
        let evidence = obj
            .get("evidence")
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(id, raw)| {
                        raw.as_str()
                            .and_then(EvidenceStatus::from_label)
                            .map(|st| (id.clone(), st))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut actions_taken: Vec<String> = Vec::new();
        if let Some(raw) = obj.get("actions_taken").and_then(Value::as_array) {
            for id in raw.iter().filter_map(Value::as_str) {
                if !actions_taken.iter().any(|a| a == id) {
                    actions_taken.push(id.to_string());
                }
            }
        }

        let notes = obj
            .get("notes")
            .and_then(Value::as_object)
            .map(IncidentNotes::from_stored)
            .unwrap_or_default();

        Self {
            evidence,
            actions_taken,
            notes,
        }
    }
}
