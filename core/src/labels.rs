use serde_json::{Map, Value};

/// Closed set of values persisted as a plain string label.
///
/// Loading never fails on a bad label: anything unknown maps to the `Default` variant
/// ("nothing chosen yet" for choices, the initial state for lifecycles).
pub trait StoredLabel: Sized + Copy + Default {
    fn as_label(self) -> &'static str;
    fn from_label(raw: &str) -> Option<Self>;
}

pub fn label_from_value<T: StoredLabel>(raw: &Value) -> T {
    raw.as_str().and_then(T::from_label).unwrap_or_default()
}

/// Reads a free-text field out of a persisted object. Missing or non-string values read as "".
pub fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Implements `Serialize`/`Deserialize` for a `StoredLabel` enum.
#[macro_export]
macro_rules! stored_label_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str($crate::labels::StoredLabel::as_label(*self))
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = <serde_json::Value as serde::Deserialize>::deserialize(d)?;
                Ok($crate::labels::label_from_value(&raw))
            }
        }
    };
}

/// Escalation decision shared by the triage board and the incident walkthrough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Escalation {
    #[default]
    None,
    No,
    NotYet,
    Yes,
}

impl Escalation {
    pub fn is_recorded(self) -> bool {
        self != Escalation::None
    }
}

impl StoredLabel for Escalation {
    fn as_label(self) -> &'static str {
        match self {
            Escalation::None => "",
            Escalation::No => "no",
            Escalation::NotYet => "not_yet",
            Escalation::Yes => "yes",
        }
    }

    fn from_label(raw: &str) -> Option<Self> {
        match raw {
            "" => Some(Escalation::None),
            "no" => Some(Escalation::No),
            "not_yet" => Some(Escalation::NotYet),
            "yes" => Some(Escalation::Yes),
            _ => None,
        }
    }
}

stored_label_serde!(Escalation);
