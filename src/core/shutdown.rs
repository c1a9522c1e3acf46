//! Shutdown coordination.
//!
//! A single-fire latch (`Armed → TornDown`) guarding the teardown sequence:
//! stop the watcher, terminate the server, exit. Both the interrupt path and
//! the server supervisor's failure path go through [`ShutdownCoordinator::tear_down`],
//! so the sequence runs at most once however they race. The latch remembers
//! the winning [`ShutdownReason`]; the main thread ends the process with its
//! exit code, so a loser of the race can never exit with the wrong status.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::server::ServerHandle;
use crate::watch::DirectoryWatcher;

/// Why the session is ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// User pressed Ctrl+C.
    Interrupt,
    /// The preview server died unexpectedly.
    ServerFailed,
    /// The main loop returned on its own (startup error or test harness).
    LoopExited,
}

impl ShutdownReason {
    /// Process exit status for this reason, if teardown should end the process.
    pub const fn exit_code(self) -> Option<i32> {
        match self {
            Self::Interrupt => Some(0),
            Self::ServerFailed => Some(1),
            Self::LoopExited => None,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "interrupted",
            Self::ServerFailed => "server failed",
            Self::LoopExited => "loop exited",
        })
    }
}

type ExitFn = Box<dyn Fn(i32) + Send + Sync>;

/// Owns the teardown resources and the latch that guards them.
pub struct ShutdownCoordinator {
    /// Empty while armed; set once by the winning teardown
    reason: OnceLock<ShutdownReason>,
    watcher: Mutex<Option<Box<dyn DirectoryWatcher>>>,
    server: Mutex<Option<ServerHandle>>,
    /// Shutdown requests for the main loop (interrupts, wake-ups)
    request_tx: Sender<ShutdownReason>,
    request_rx: Receiver<ShutdownReason>,
    exit: ExitFn,
}

impl ShutdownCoordinator {
    /// Coordinator whose teardown ends the process.
    pub fn new() -> Self {
        Self::with_exit(|code| std::process::exit(code))
    }

    /// Coordinator with a custom exit action.
    pub fn with_exit(exit: impl Fn(i32) + Send + Sync + 'static) -> Self {
        let (request_tx, request_rx) = channel::unbounded();
        Self {
            reason: OnceLock::new(),
            watcher: Mutex::new(None),
            server: Mutex::new(None),
            request_tx,
            request_rx,
            exit: Box::new(exit),
        }
    }

    /// Hand the running watcher to the coordinator.
    ///
    /// If teardown already happened the watcher is stopped right away.
    pub fn attach_watcher(&self, mut watcher: Box<dyn DirectoryWatcher>) {
        let mut slot = self.watcher.lock();
        if self.is_torn_down() {
            watcher.stop();
        } else {
            *slot = Some(watcher);
        }
    }

    /// Hand the server handle to the coordinator.
    ///
    /// If teardown already happened the server is terminated right away.
    pub fn attach_server(&self, server: ServerHandle) {
        let mut slot = self.server.lock();
        if self.is_torn_down() {
            server.terminate();
        } else {
            *slot = Some(server);
        }
    }

    /// Install the Ctrl+C handler.
    ///
    /// It also fires on SIGTERM and SIGHUP (closed terminal), so the server
    /// is stopped however the session is asked to end. The handler only
    /// enqueues a request; the main loop picks it up and runs the teardown on
    /// the main thread.
    pub fn install_interrupt_handler(&self) -> Result<(), ctrlc::Error> {
        let tx = self.request_tx.clone();
        ctrlc::set_handler(move || {
            let _ = tx.send(ShutdownReason::Interrupt);
        })
    }

    /// Ask the main loop to shut down (non-blocking).
    pub fn request(&self, reason: ShutdownReason) {
        let _ = self.request_tx.send(reason);
    }

    /// Receiver the main loop waits on.
    pub fn requests(&self) -> Receiver<ShutdownReason> {
        self.request_rx.clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.reason.get().is_some()
    }

    /// Reason of the teardown that won the latch.
    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.get().copied()
    }

    /// Run the teardown sequence if nobody has yet.
    ///
    /// Returns `true` for the single caller that performed it. With the
    /// default exit action, reasons carrying an exit code never return.
    pub fn tear_down(&self, reason: ShutdownReason) -> bool {
        if self.reason.set(reason).is_err() {
            return false;
        }

        crate::debug!("shutdown"; "{}", reason);
        if reason == ShutdownReason::Interrupt {
            crate::log!("serve"; "shutting down...");
        }

        if let Some(mut watcher) = self.watcher.lock().take() {
            watcher.stop();
        }
        if let Some(server) = self.server.lock().take() {
            server.terminate();
        }

        if let Some(code) = reason.exit_code() {
            (self.exit)(code);
        }

        // Wake the main loop if teardown came from another thread. Only after
        // the exit action, so the main thread never returns ahead of it.
        let _ = self.request_tx.send(reason);
        true
    }

    /// Scope guard that tears down with [`ShutdownReason::LoopExited`] on drop.
    pub fn guard(self: &Arc<Self>) -> TeardownGuard {
        TeardownGuard {
            coordinator: Arc::clone(self),
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the teardown on every exit path of the scope holding it.
pub struct TeardownGuard {
    coordinator: Arc<ShutdownCoordinator>,
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        self.coordinator.tear_down(ShutdownReason::LoopExited);
    }
}

// =============================================================================
// Tests
// =============================================================================
