use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3200);

/// Identifies one `show` call. Only the ticket of the newest message can dismiss it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTicket(u64);

/// Transient notification with a cancellable delayed dismissal.
///
/// Showing a new message replaces the pending deadline, so an older message's timer can
/// never hide a newer message.
#[derive(Debug, Clone)]
pub struct Toast {
    duration: Duration,
    message: Option<String>,
    generation: u64,
    dismiss_at: Option<Instant>,
}

impl Default for Toast {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl Toast {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            message: None,
            generation: 0,
            dismiss_at: None,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, now: Instant) -> ToastTicket {
        self.generation += 1;
        self.message = Some(message.into());
        self.dismiss_at = Some(now + self.duration);
        ToastTicket(self.generation)
    }

    /// Fires the dismissal for `ticket`. Stale tickets are ignored.
    pub fn dismiss(&mut self, ticket: ToastTicket) -> bool {
        if ticket.0 != self.generation || self.message.is_none() {
            return false;
        }
        self.hide();
        true
    }

    /// Hides the message once its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.dismiss_at {
            Some(deadline) if now >= deadline => {
                self.hide();
                true
            }
            _ => false,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn hide(&mut self) {
        self.message = None;
        self.dismiss_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_message_survives_older_timer() {
        let t0 = Instant::now();
        let mut toast = Toast::default();
        let first = toast.show("Template filled.", t0);
        let _second = toast.show("Notes saved (stored in this browser).", t0 + Duration::from_millis(1000));

        assert!(!toast.dismiss(first));
        assert_eq!(toast.message(), Some("Notes saved (stored in this browser)."));

        // the first message's deadline has passed, the second one's has not
        assert!(!toast.tick(t0 + Duration::from_millis(3300)));
        assert!(toast.is_visible());
        assert!(toast.tick(t0 + Duration::from_millis(4200)));
        assert!(!toast.is_visible());
    }

    #[test]
    fn current_ticket_dismisses() {
        let mut toast = Toast::new(Duration::from_millis(10));
        let ticket = toast.show("hello", Instant::now());
        assert!(toast.dismiss(ticket));
        assert!(!toast.dismiss(ticket));
        assert_eq!(toast.message(), None);
    }
}
