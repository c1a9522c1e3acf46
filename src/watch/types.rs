use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::EventKind;

/// What happened to a watched path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Renamed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
            Self::Renamed => "renamed",
        }
    }
}

/// Whether the changed path is a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    File,
    Directory,
}

/// A single qualifying filesystem change under a watch root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub scope: Scope,
}

impl WatchEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind, scope: Scope) -> Self {
        Self {
            path: path.into(),
            kind,
            scope,
        }
    }

    /// Translate a raw notify event into qualifying watch events.
    ///
    /// Access events and metadata-only modifications (mtime/chmod noise) are
    /// dropped. Everything else maps to one event per path.
    pub fn from_notify(event: &notify::Event) -> Vec<Self> {
        let (kind, hint) = match event.kind {
            EventKind::Create(CreateKind::File) => (ChangeKind::Created, Some(Scope::File)),
            EventKind::Create(CreateKind::Folder) => (ChangeKind::Created, Some(Scope::Directory)),
            EventKind::Create(_) => (ChangeKind::Created, None),
            EventKind::Remove(RemoveKind::File) => (ChangeKind::Removed, Some(Scope::File)),
            EventKind::Remove(RemoveKind::Folder) => (ChangeKind::Removed, Some(Scope::Directory)),
            EventKind::Remove(_) => (ChangeKind::Removed, None),
            EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
            EventKind::Modify(ModifyKind::Name(_)) => (ChangeKind::Renamed, None),
            EventKind::Modify(_) => (ChangeKind::Modified, None),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
        };

        event
            .paths
            .iter()
            .map(|path| Self::new(path.clone(), kind, hint.unwrap_or_else(|| scope_of(path))))
            .collect()
    }
}

/// Best-effort scope for a path the event did not classify.
///
/// Removed paths no longer exist and are reported as files.
fn scope_of(path: &Path) -> Scope {
    if path.is_dir() {
        Scope::Directory
    } else {
        Scope::File
    }
}
