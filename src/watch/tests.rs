use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use tempfile::TempDir;

use super::*;

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn make_site(dirs: &[&str]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for dir in dirs {
        std::fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    temp
}

const QUIET: Duration = Duration::from_secs(3);

// ----------------------------------------------------------------------------
// notify translation
// ----------------------------------------------------------------------------

#[test]
fn test_translate_kinds() {
    let created = WatchEvent::from_notify(&make_event(
        vec!["/site/Content/a.md"],
        notify::EventKind::Create(CreateKind::File),
    ));
    assert_eq!(
        created,
        vec![WatchEvent::new("/site/Content/a.md", ChangeKind::Created, Scope::File)]
    );

    let removed = WatchEvent::from_notify(&make_event(
        vec!["/site/Content/posts"],
        notify::EventKind::Remove(RemoveKind::Folder),
    ));
    assert_eq!(removed[0].kind, ChangeKind::Removed);
    assert_eq!(removed[0].scope, Scope::Directory);

    let modified = WatchEvent::from_notify(&make_event(
        vec!["/site/Sources/main.swift"],
        notify::EventKind::Modify(ModifyKind::Data(DataChange::Content)),
    ));
    assert_eq!(modified[0].kind, ChangeKind::Modified);

    let renamed = WatchEvent::from_notify(&make_event(
        vec!["/site/Content/old.md", "/site/Content/new.md"],
        notify::EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
    ));
    assert_eq!(renamed.len(), 2);
    assert!(renamed.iter().all(|e| e.kind == ChangeKind::Renamed));
}

#[test]
fn test_translate_ignores_noise() {
    let metadata = make_event(
        vec!["/site/Content/a.md"],
        notify::EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
    );
    assert!(WatchEvent::from_notify(&metadata).is_empty());

    let access = make_event(
        vec!["/site/Content/a.md"],
        notify::EventKind::Access(notify::event::AccessKind::Read),
    );
    assert!(WatchEvent::from_notify(&access).is_empty());
}

#[test]
fn test_translate_scope_from_disk() {
    let site = make_site(&["Content/posts"]);
    let dir = site.path().join("Content/posts");
    let events = WatchEvent::from_notify(&notify::Event {
        kind: notify::EventKind::Modify(ModifyKind::Any),
        paths: vec![dir],
        attrs: Default::default(),
    });
    assert_eq!(events[0].scope, Scope::Directory);
}

// ----------------------------------------------------------------------------
// ChangeDebouncer
// ----------------------------------------------------------------------------

#[test]
fn test_debouncer_empty() {
    let debouncer = ChangeDebouncer::new();
    assert!(!debouncer.is_pending());
    assert!(!debouncer.is_rebuild_due(Instant::now(), QUIET));
    assert!(!debouncer.take_due(Instant::now() + QUIET * 10, QUIET));
}

#[test]
fn test_debouncer_first_event_starts_burst() {
    let debouncer = ChangeDebouncer::new();
    let t0 = Instant::now();

    assert!(debouncer.record(t0));
    assert!(!debouncer.record(t0 + Duration::from_millis(200)));

    assert!(debouncer.take_due(t0 + Duration::from_secs(10), QUIET));
    // consumed: the next event opens a new burst
    assert!(debouncer.record(t0 + Duration::from_secs(11)));
}

#[test]
fn test_debouncer_waits_for_last_event_of_burst() {
    let debouncer = ChangeDebouncer::new();
    let t0 = Instant::now();

    for i in 0..5 {
        debouncer.record(t0 + Duration::from_millis(i * 400));
    }
    let last = t0 + Duration::from_millis(1600);

    // quiet period has passed since the first event, not since the last
    assert!(!debouncer.is_rebuild_due(t0 + QUIET, QUIET));
    assert!(!debouncer.take_due(last + QUIET - Duration::from_millis(1), QUIET));
    assert!(debouncer.take_due(last + QUIET, QUIET));
}

#[test]
fn test_debouncer_due_once_per_burst() {
    let debouncer = ChangeDebouncer::new();
    let t0 = Instant::now();
    debouncer.record(t0);

    let later = t0 + QUIET;
    assert!(debouncer.is_rebuild_due(later, QUIET));
    assert!(debouncer.take_due(later, QUIET));

    for step in 1..50 {
        let now = later + Duration::from_millis(step * 100);
        assert!(!debouncer.is_rebuild_due(now, QUIET));
        assert!(!debouncer.take_due(now, QUIET));
    }
    assert!(!debouncer.is_pending());
}

#[test]
fn test_debouncer_three_events_half_second_apart() {
    let debouncer = ChangeDebouncer::new();
    let t0 = Instant::now();
    let events = [0, 500, 1000].map(|ms| t0 + Duration::from_millis(ms));

    let mut rebuilds = Vec::new();
    for tick in 0..=80u64 {
        let now = t0 + Duration::from_millis(tick * 100);
        for &at in &events {
            if at <= now && now < at + Duration::from_millis(100) {
                debouncer.record(at);
            }
        }
        if debouncer.take_due(now, QUIET) {
            rebuilds.push(now);
        }
    }

    assert_eq!(rebuilds.len(), 1);
    assert!(rebuilds[0] >= events[2] + QUIET);
}

#[test]
fn test_debouncer_event_during_rebuild_rearms() {
    let debouncer = ChangeDebouncer::new();
    let t0 = Instant::now();
    debouncer.record(t0);
    assert!(debouncer.take_due(t0 + QUIET, QUIET));

    // a change written while the rebuild runs is kept for the next cycle
    debouncer.record(t0 + QUIET + Duration::from_millis(50));
    assert!(debouncer.is_pending());
    assert!(debouncer.take_due(t0 + QUIET * 3, QUIET));
}

#[test]
fn test_debouncer_concurrent_writers_not_lost() {
    let debouncer = Arc::new(ChangeDebouncer::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let debouncer = Arc::clone(&debouncer);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    debouncer.record(Instant::now());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(debouncer.is_pending());
    assert!(debouncer.take_due(Instant::now() + QUIET, QUIET));
    assert!(!debouncer.is_pending());
}

// ----------------------------------------------------------------------------
// Watch roots
// ----------------------------------------------------------------------------

#[test]
fn test_watch_roots_all_present() {
    let site = make_site(&WATCH_DIRS);
    let roots = resolve_watch_roots(site.path()).unwrap();
    assert_eq!(roots.len(), 3);
    assert_eq!(roots[0], site.path().join("Sources"));
    assert_eq!(roots[2], site.path().join("Content"));
}

#[test]
fn test_watch_roots_missing_one_fails() {
    let site = make_site(&["Sources", "Content"]);
    let err = resolve_watch_roots(site.path()).unwrap_err();
    match err {
        RunError::MissingWatchRoot { name, path } => {
            assert_eq!(name, "Resources");
            assert_eq!(path, site.path().join("Resources"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_watch_site_missing_root_is_fatal() {
    let site = make_site(&["Sources"]);
    let result = watch_site(site.path(), Arc::new(ChangeDebouncer::new()));
    assert!(matches!(result, Err(RunError::MissingWatchRoot { .. })));
}

// ----------------------------------------------------------------------------
// NotifyWatcher
// ----------------------------------------------------------------------------

#[test]
fn test_watch_site_records_change() {
    let site = make_site(&WATCH_DIRS);
    let debouncer = Arc::new(ChangeDebouncer::new());
    let mut watcher = watch_site(site.path(), Arc::clone(&debouncer)).unwrap();
    assert!(watcher.is_running());
    assert_eq!(watcher.roots().len(), 3);

    std::fs::write(site.path().join("Content/index.md"), "# Hello").unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while !debouncer.is_pending() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(debouncer.is_pending());

    watcher.stop();
    assert!(!watcher.is_running());
    // stopping twice is harmless
    watcher.stop();
}
