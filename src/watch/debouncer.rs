use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::types::WatchEvent;

/// Quiet period used when none is configured.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(3);

/// Coalesces bursts of watch events into a single "rebuild due" signal.
///
/// Holds one pending timestamp for the whole site, not one per file. Writers
/// (the watcher thread) and the reader (the main loop) share it through a
/// mutex, and the due-check and clear happen under the same lock so an event
/// landing between them is never lost.
#[derive(Debug, Default)]
pub struct ChangeDebouncer {
    last_modified: Mutex<Option<Instant>>,
}

impl ChangeDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a qualifying event at the current time.
    ///
    /// Returns `true` when this event starts a new burst.
    pub fn on_event(&self, event: &WatchEvent) -> bool {
        crate::debug!("watch"; "{} {:?}: {}", event.kind.label(), event.scope, event.path.display());
        self.record(Instant::now())
    }

    /// Record a change at `at`. Returns `true` when nothing was pending.
    pub fn record(&self, at: Instant) -> bool {
        self.last_modified.lock().replace(at).is_none()
    }

    /// Whether a change is waiting for its quiet period to elapse.
    pub fn is_pending(&self) -> bool {
        self.last_modified.lock().is_some()
    }

    /// True iff a change is pending and `quiet_period` has passed since it.
    pub fn is_rebuild_due(&self, now: Instant, quiet_period: Duration) -> bool {
        is_due(*self.last_modified.lock(), now, quiet_period)
    }

    /// Consume the rebuild signal: when due, clear the pending change and
    /// return `true`.
    pub fn take_due(&self, now: Instant, quiet_period: Duration) -> bool {
        let mut last_modified = self.last_modified.lock();
        if !is_due(*last_modified, now, quiet_period) {
            return false;
        }
        *last_modified = None;
        true
    }
}

fn is_due(last_modified: Option<Instant>, now: Instant, quiet_period: Duration) -> bool {
    last_modified.is_some_and(|last| now.saturating_duration_since(last) >= quiet_period)
}
