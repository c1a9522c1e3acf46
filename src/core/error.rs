//! Run-level error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

use crate::generator::BuildError;

/// Errors that abort a development session before or during startup.
///
/// Rebuild failures inside the loop never surface here: they are reported
/// and the loop keeps going. Server failures escalate through the
/// [`ShutdownCoordinator`](super::ShutdownCoordinator) instead.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("missing `{name}` folder at {}", .path.display())]
    MissingWatchRoot { name: &'static str, path: PathBuf },

    #[error("missing `Output` folder at {}; nothing to serve", .0.display())]
    MissingOutput(PathBuf),

    #[error("initial build failed")]
    InitialBuild(#[source] BuildError),

    #[error("failed to start file watcher")]
    Watcher(#[from] notify::Error),

    #[error("failed to register interrupt handler")]
    Signal(#[from] ctrlc::Error),

    #[error("failed to spawn server supervisor")]
    Spawn(#[source] std::io::Error),
}

impl RunError {
    /// Missing site folders: not retried, the user has to fix the layout.
    pub fn is_fatal_precondition(&self) -> bool {
        matches!(self, Self::MissingWatchRoot { .. } | Self::MissingOutput(_))
    }
}
