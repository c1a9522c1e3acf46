//! Fakes shared by unit tests across modules.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::core::ShutdownCoordinator;
use crate::generator::Generator;
use crate::watch::DirectoryWatcher;

/// Coordinator whose exit action records codes instead of ending the process.
pub fn recording_coordinator() -> (Arc<ShutdownCoordinator>, Arc<Mutex<Vec<i32>>>) {
    let codes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&codes);
    let coordinator = ShutdownCoordinator::with_exit(move |code| sink.lock().push(code));
    (Arc::new(coordinator), codes)
}

/// Watcher that counts `stop` calls.
pub struct CountingWatcher(pub Arc<AtomicUsize>);

impl CountingWatcher {
    pub fn new() -> (Box<dyn DirectoryWatcher>, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        (Box::new(Self(Arc::clone(&stops))), stops)
    }
}

impl DirectoryWatcher for CountingWatcher {
    fn stop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Generator that counts calls and optionally fails.
pub struct FakeGenerator {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeGenerator {
    pub fn new(fail: bool) -> (Box<dyn Generator>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = Self {
            calls: Arc::clone(&calls),
            fail,
        };
        (Box::new(generator), calls)
    }
}

impl Generator for FakeGenerator {
    fn generate(&mut self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("error: expected expression in Site.swift");
        }
        Ok(())
    }
}
