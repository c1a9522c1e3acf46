use std::path::{Path, PathBuf};

use crate::core::RunError;

/// Site subdirectories whose subtrees trigger rebuilds.
pub const WATCH_DIRS: [&str; 3] = ["Sources", "Resources", "Content"];

/// Resolve the watch roots under `site_root`.
///
/// Every root is required: watching a subset would silently miss changes,
/// so the first missing directory fails the whole setup.
pub fn resolve_watch_roots(site_root: &Path) -> Result<Vec<PathBuf>, RunError> {
    WATCH_DIRS
        .iter()
        .map(|&name| {
            let path = site_root.join(name);
            if path.is_dir() {
                Ok(path)
            } else {
                Err(RunError::MissingWatchRoot { name, path })
            }
        })
        .collect()
}
