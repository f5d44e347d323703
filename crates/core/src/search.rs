use std::time::{Duration, Instant};

/// Debounces search-string edits so a large sample tree is not rewalked
/// on every keystroke.
///
/// Two states: idle, or one pending query with a deadline. Each edit
/// replaces the pending query and pushes the deadline out. The host's
/// per-frame tick calls `poll`; when the deadline has passed the query
/// is handed over exactly once and the machine returns to idle. No
/// timers or async, the host tick is the only clock.
#[derive(Debug)]
pub struct SearchDebounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

/// Long enough to swallow bursts of typing, short enough to feel
/// immediate once typing stops.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(350);

impl SearchDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record an edited query at time `now`; restarts the delay window.
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        self.pending = Some((query.into(), now + self.delay));
    }

    /// Drop any pending query without firing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand over the pending query once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                self.pending.take().map(|(query, _)| query)
            }
            _ => None,
        }
    }
}

impl Default for SearchDebounce {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_delay() {
        let t0 = Instant::now();
        let mut debounce = SearchDebounce::new(Duration::from_millis(350));
        debounce.set_query("Phys", t0);
        assert!(debounce.is_pending());
        assert_eq!(debounce.poll(t0 + Duration::from_millis(100)), None);
        assert_eq!(
            debounce.poll(t0 + Duration::from_millis(350)),
            Some("Phys".to_string())
        );
        assert!(!debounce.is_pending());
        // Fired exactly once.
        assert_eq!(debounce.poll(t0 + Duration::from_millis(400)), None);
    }

    #[test]
    fn new_edit_restarts_the_window() {
        let t0 = Instant::now();
        let mut debounce = SearchDebounce::new(Duration::from_millis(350));
        debounce.set_query("Ph", t0);
        debounce.set_query("Phys", t0 + Duration::from_millis(300));
        // Original deadline passes but the edit pushed it out.
        assert_eq!(debounce.poll(t0 + Duration::from_millis(360)), None);
        assert_eq!(
            debounce.poll(t0 + Duration::from_millis(650)),
            Some("Phys".to_string())
        );
    }

    #[test]
    fn cancel_discards_pending_query() {
        let t0 = Instant::now();
        let mut debounce = SearchDebounce::default();
        debounce.set_query("GC", t0);
        debounce.cancel();
        assert_eq!(debounce.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn idle_poll_is_a_no_op() {
        let mut debounce = SearchDebounce::default();
        assert_eq!(debounce.poll(Instant::now()), None);
    }
}
