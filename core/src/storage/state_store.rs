use crate::error::CoreResult;
use crate::storage::kv::KeyValueStore;
use serde::Serialize;
use serde_json::{Map, Value};

/// A response record that lives as one JSON object under one storage key.
pub trait PersistedRecord: Serialize + Default {
    /// Builds a record from a parsed top-level object. Fields that fail validation are
    /// dropped rather than rejected; the reconciler default-fills whatever is missing.
    fn from_stored(obj: Map<String, Value>) -> Self;
}

/// Load/save of a single record blob.
///
/// `load` never fails: a missing, unreadable, unparsable, or non-object blob yields the
/// default record. `save` overwrites unconditionally.
pub struct StateStore<S: KeyValueStore> {
    kv: S,
    key: String,
}

impl<S: KeyValueStore> StateStore<S> {
    pub fn new(kv: S, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut S {
        &mut self.kv
    }

    pub fn load<R: PersistedRecord>(&self) -> R {
        let raw = match self.kv.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return R::default(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "state blob unreadable; starting fresh");
                return R::default();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(obj)) => R::from_stored(obj),
            Ok(other) => {
                tracing::warn!(
                    key = %self.key,
                    kind = json_kind(&other),
                    "state blob is not an object; starting fresh"
                );
                R::default()
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "state blob unparsable; starting fresh");
                R::default()
            }
        }
    }

    pub fn save<R: PersistedRecord>(&mut self, record: &R) -> CoreResult<()> {
        let raw = serde_json::to_string(record)?;
        self.kv.set_item(&self.key, &raw)
    }

    pub fn clear(&mut self) -> CoreResult<()> {
        self.kv.remove_item(&self.key)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Catalog ids that received a default entry.
    pub added: Vec<String>,
    /// Ids dropped to restore a record invariant (duplicates, over-budget entries).
    pub trimmed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.trimmed.is_empty()
    }
}
