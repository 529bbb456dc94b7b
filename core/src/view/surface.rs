use std::collections::BTreeMap;

/// Whatever the rendered markup ends up on. Targets are addressed by element id.
///
/// Every method reports whether the target existed; writing to a missing target is a
/// no-op, never an error.
pub trait RenderSurface {
    /// Replaces the whole content of `target` with `html`.
    fn replace_html(&mut self, target: &str, html: &str) -> bool;
    /// Replaces the content of `target` with plain text (no markup interpretation).
    fn set_text(&mut self, target: &str, text: &str) -> bool;
    /// Toggles the "active" marker used by progress steps.
    fn set_active(&mut self, target: &str, active: bool) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceSlot {
    pub content: String,
    pub active: bool,
}

/// Map-backed surface with a fixed set of known targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    slots: BTreeMap<String, SurfaceSlot>,
}

impl MemorySurface {
    pub fn with_targets<I, T>(targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            slots: targets
                .into_iter()
                .map(|t| (t.into(), SurfaceSlot::default()))
                .collect(),
        }
    }

    pub fn content(&self, target: &str) -> Option<&str> {
        self.slots.get(target).map(|s| s.content.as_str())
    }

    pub fn is_active(&self, target: &str) -> Option<bool> {
        self.slots.get(target).map(|s| s.active)
    }

    pub fn slots(&self) -> &BTreeMap<String, SurfaceSlot> {
        &self.slots
    }

    fn slot_mut(&mut self, target: &str) -> Option<&mut SurfaceSlot> {
        let slot = self.slots.get_mut(target);
        if slot.is_none() {
            tracing::debug!(target_id = target, "render target missing; skipped");
        }
        slot
    }
}

impl RenderSurface for MemorySurface {
    fn replace_html(&mut self, target: &str, html: &str) -> bool {
        match self.slot_mut(target) {
            Some(slot) => {
                slot.content = html.to_string();
                true
            }
            None => false,
        }
    }

    fn set_text(&mut self, target: &str, text: &str) -> bool {
        self.replace_html(target, text)
    }

    fn set_active(&mut self, target: &str, active: bool) -> bool {
        match self.slot_mut(target) {
            Some(slot) => {
                slot.active = active;
                true
            }
            None => false,
        }
    }
}
