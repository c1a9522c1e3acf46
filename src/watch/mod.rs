//! Source watching.
//!
//! Watches the site's source directories and feeds qualifying changes into
//! the [`ChangeDebouncer`], which the main loop polls.
//!
//! ```text
//! notify → WatchEvent (translation) → ChangeDebouncer → MainLoop
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::core::RunError;
use crate::utils::path::display_relative;

// Pure timing: pending change + quiet period decision.
mod debouncer;
// Required watch roots.
mod roots;
// Shared event types and notify translation.
mod types;

#[cfg(test)]
mod tests;

pub use debouncer::{ChangeDebouncer, DEFAULT_QUIET_PERIOD};
pub use roots::{WATCH_DIRS, resolve_watch_roots};
pub use types::{ChangeKind, Scope, WatchEvent};

/// A running source of watch events that can be stopped.
pub trait DirectoryWatcher: Send {
    /// Stop delivering events. Calling it again is a no-op.
    fn stop(&mut self);
}

/// [`DirectoryWatcher`] backed by the platform's notify watcher.
pub struct NotifyWatcher {
    /// Watcher handle; dropping it ends event delivery
    inner: Option<RecommendedWatcher>,
    roots: Vec<PathBuf>,
}

impl NotifyWatcher {
    /// Start watching `roots` recursively, invoking `on_event` on the
    /// watcher's own thread for every qualifying change.
    pub fn start<F>(roots: Vec<PathBuf>, on_event: F) -> notify::Result<Self>
    where
        F: Fn(WatchEvent) + Send + 'static,
    {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => WatchEvent::from_notify(&event).into_iter().for_each(&on_event),
                Err(e) => crate::log!("watch"; "notify error: {}", e),
            }
        })?;

        for root in &roots {
            watcher.watch(root, RecursiveMode::Recursive)?;
        }

        Ok(Self {
            inner: Some(watcher),
            roots,
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_some()
    }
}

impl DirectoryWatcher for NotifyWatcher {
    fn stop(&mut self) {
        if self.inner.take().is_some() {
            crate::debug!("watch"; "stopped");
        }
    }
}

/// Watch the site's source directories, recording changes in `debouncer`.
///
/// The first change of each burst is announced with a one-line notice.
pub fn watch_site(
    site_root: &Path,
    debouncer: Arc<ChangeDebouncer>,
) -> Result<NotifyWatcher, RunError> {
    let roots = resolve_watch_roots(site_root)?;
    let notice_root = site_root.to_path_buf();

    let watcher = NotifyWatcher::start(roots, move |event| {
        if debouncer.on_event(&event) {
            crate::log!("watch"; "{}: {}", event.kind.label(), display_relative(&event.path, &notice_root));
        }
    })?;

    crate::log!("watch"; "watching {}", WATCH_DIRS.join(", "));
    Ok(watcher)
}
