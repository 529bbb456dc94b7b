use crate::error::{CoreError, CoreResult};
use crate::incident::model::Incident;
use crate::triage::model::TriageCatalog;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

fn read_catalog<T: DeserializeOwned>(path: &Path, what: &str) -> CoreResult<T> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CoreError::CatalogMissing(format!(
                "missing {} file at {}",
                what,
                path.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

/// Reads and validates a triage event catalog (`events.json`).
pub fn load_triage_catalog(path: impl AsRef<Path>) -> CoreResult<TriageCatalog> {
    let catalog: TriageCatalog = read_catalog(path.as_ref(), "events")?;
    catalog.validate()?;
    tracing::debug!(events = catalog.events.len(), "triage catalog loaded");
    Ok(catalog)
}

/// Reads and validates an incident definition (`incident.json`).
pub fn load_incident_catalog(path: impl AsRef<Path>) -> CoreResult<Incident> {
    let incident: Incident = read_catalog(path.as_ref(), "incident")?;
    incident.validate()?;
    tracing::debug!(
        evidence = incident.evidence.len(),
        actions = incident.actions.len(),
        "incident catalog loaded"
    );
    Ok(incident)
}
