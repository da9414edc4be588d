//! Debounced "content changed" notifications.
//!
//! The DOM bumps a revision counter on every structural or text mutation.
//! [`ModificationsObserver::observe`] compares it against the last seen value on
//! each tick and reports one change once the document has been quiet for
//! [`DEBOUNCE`].

use std::time::{Duration, Instant};

pub const DEBOUNCE: Duration = Duration::from_millis(450);

pub type ChangeCallback = Box<dyn FnMut()>;

pub struct ModificationsObserver {
    enabled: bool,
    last_revision: u64,
    pending_since: Option<Instant>,
    on_change: Option<ChangeCallback>,
}

impl std::fmt::Debug for ModificationsObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModificationsObserver")
            .field("enabled", &self.enabled)
            .field("last_revision", &self.last_revision)
            .field("pending_since", &self.pending_since)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl ModificationsObserver {
    pub fn new(revision: u64) -> Self {
        Self {
            enabled: true,
            last_revision: revision,
            pending_since: None,
            on_change: None,
        }
    }

    pub fn set_on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Mutations made while disabled are never reported.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.pending_since = None;
    }

    pub fn enable(&mut self, revision: u64) {
        self.enabled = true;
        self.last_revision = revision;
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Returns true when a burst of changes has settled. Each new revision
    /// restarts the quiet period.
    pub fn observe(&mut self, revision: u64, now: Instant) -> bool {
        if !self.enabled {
            self.last_revision = revision;
            return false;
        }

        if revision != self.last_revision {
            self.last_revision = revision;
            self.pending_since = Some(now);
            return false;
        }

        match self.pending_since {
            Some(since) if now.duration_since(since) >= DEBOUNCE => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Runs [`observe`](Self::observe) and calls the callback when it fires.
    pub fn tick(&mut self, revision: u64, now: Instant) {
        if self.observe(revision, now)
            && let Some(callback) = self.on_change.as_mut()
        {
            log::debug!("Document changed at revision {revision}");
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_burst_reports_once_after_quiet_period() {
        let start = Instant::now();
        let mut observer = ModificationsObserver::new(0);

        assert!(!observer.observe(1, start));
        assert!(!observer.observe(2, start + Duration::from_millis(100)));
        assert!(!observer.observe(2, start + Duration::from_millis(500)));
        assert!(observer.observe(2, start + Duration::from_millis(550)));
        assert!(!observer.observe(2, start + Duration::from_millis(2000)));
    }

    #[test]
    fn test_disabled_swallows_changes() {
        let start = Instant::now();
        let mut observer = ModificationsObserver::new(0);
        observer.disable();

        assert!(!observer.observe(5, start));
        observer.enable(5);

        assert!(!observer.observe(5, start + DEBOUNCE * 2));
        assert!(!observer.is_pending());
    }

    #[test]
    fn test_tick_calls_callback() {
        let start = Instant::now();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut observer = ModificationsObserver::new(0);
        observer.set_on_change(Box::new(move || counter.set(counter.get() + 1)));

        observer.tick(1, start);
        observer.tick(1, start + DEBOUNCE);

        assert_eq!(calls.get(), 1);
    }
}
