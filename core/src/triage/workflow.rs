use super::model::{EventResponse, TriageCatalog, TriageRecord, TRIAGE_STORAGE_KEY};
use super::reconcile::reconcile;
use super::render::{
    render_event_detail, render_event_list, COUNT_CONTEXT, COUNT_ESCALATE, COUNT_NOISE,
    COUNT_SIGNAL, DETAIL_PANEL, EVENT_LIST,
};
use super::summary::{summarize, TriageSummary};
use crate::error::CoreResult;
use crate::storage::kv::KeyValueStore;
use crate::storage::state_store::StateStore;
use crate::view::surface::RenderSurface;

/// Triage board session: one catalog, one persisted response record, one selected event.
///
/// Every mutation is persisted before it returns; `render` always works off the
/// in-memory record, so summaries are never stale.
pub struct TriageBoard<S: KeyValueStore> {
    catalog: TriageCatalog,
    store: StateStore<S>,
    record: TriageRecord,
    selected: Option<String>,
    instructor: bool,
}

impl<S: KeyValueStore> TriageBoard<S> {
    pub fn new(catalog: TriageCatalog, kv: S) -> Self {
        let instructor = catalog.instructor;
        Self {
            catalog,
            store: StateStore::new(kv, TRIAGE_STORAGE_KEY),
            record: TriageRecord::default(),
            selected: None,
            instructor,
        }
    }

    pub fn with_instructor(mut self, instructor: bool) -> Self {
        self.instructor = instructor;
        self
    }

    /// Loads, reconciles and persists the record, then opens the first event.
    /// Returns the id of the opened event, if the catalog has any.
    pub fn init(&mut self) -> CoreResult<Option<String>> {
        let mut next: TriageRecord = self.store.load();
        let report = reconcile(&self.catalog, &mut next);
        if !report.added.is_empty() {
            tracing::debug!(added = report.added.len(), "triage responses default-filled");
        }
        self.commit(next)?;
        self.selected = self.catalog.events.first().map(|ev| ev.id.clone());
        Ok(self.selected.clone())
    }

    /// Selects an event and returns its detail panel markup. Unknown ids change nothing.
    pub fn open_event(&mut self, event_id: &str) -> Option<String> {
        let ev = self.catalog.event(event_id)?;
        self.selected = Some(ev.id.clone());
        Some(self.detail_markup(event_id))
    }

    pub fn save_response(&mut self, event_id: &str, response: EventResponse) -> CoreResult<bool> {
        if self.catalog.event(event_id).is_none() {
            tracing::debug!(event_id, "save for unknown event ignored");
            return Ok(false);
        }
        let mut next = self.record.clone();
        next.responses.insert(event_id.to_string(), response);
        self.commit(next)?;
        Ok(true)
    }

    /// Resets one event's response to the defaults and reopens it.
    pub fn clear_response(&mut self, event_id: &str) -> CoreResult<bool> {
        if self.catalog.event(event_id).is_none() {
            tracing::debug!(event_id, "clear for unknown event ignored");
            return Ok(false);
        }
        let mut next = self.record.clone();
        next.responses
            .insert(event_id.to_string(), EventResponse::default());
        self.commit(next)?;
        self.selected = Some(event_id.to_string());
        Ok(true)
    }

    /// Drops the persisted record and starts over.
    pub fn reset_all(&mut self) -> CoreResult<Option<String>> {
        tracing::info!(key = self.store.key(), "triage state reset");
        self.store.clear()?;
        self.selected = None;
        self.init()
    }

    /// Writes `next` first and adopts it only once the write succeeded.
    fn commit(&mut self, next: TriageRecord) -> CoreResult<()> {
        self.store.save(&next)?;
        self.record = next;
        Ok(())
    }

    pub fn summary(&self) -> TriageSummary {
        summarize(&self.catalog, &self.record)
    }

    pub fn response(&self, event_id: &str) -> Option<&EventResponse> {
        self.record.responses.get(event_id)
    }

    pub fn record(&self) -> &TriageRecord {
        &self.record
    }

    pub fn catalog(&self) -> &TriageCatalog {
        &self.catalog
    }

    pub fn instructor(&self) -> bool {
        self.instructor
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    /// Re-renders every panel from the current record.
    pub fn render(&self, surface: &mut impl RenderSurface) {
        surface.replace_html(
            EVENT_LIST,
            &render_event_list(&self.catalog, &self.record, self.selected()),
        );
        if let Some(id) = self.selected() {
            surface.replace_html(DETAIL_PANEL, &self.detail_markup(id));
        }
        let s = self.summary();
        surface.set_text(COUNT_NOISE, &s.noise.to_string());
        surface.set_text(COUNT_SIGNAL, &s.signal.to_string());
        surface.set_text(COUNT_CONTEXT, &s.context.to_string());
        surface.set_text(COUNT_ESCALATE, &s.escalate.to_string());
    }

    fn detail_markup(&self, event_id: &str) -> String {
        let blank = EventResponse::default();
        match self.catalog.event(event_id) {
            Some(ev) => {
                let resp = self.record.responses.get(event_id).unwrap_or(&blank);
                render_event_detail(ev, resp, self.instructor)
            }
            None => String::new(),
        }
    }
}
