use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

/// Handle to the preview server child process.
///
/// Cheap to clone; every clone refers to the same process. `terminate` sends
/// at most one termination request for the lifetime of the process and is a
/// no-op once the child has exited or when it never started.
///
/// The watchdog marks the handle exited before it reaps the child, and
/// `terminate` signals while holding the same lock, so a signal never reaches
/// a pid the system may have handed to another process.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    inner: Arc<HandleState>,
}

#[derive(Debug)]
struct HandleState {
    pid: Option<u32>,
    terminate_requested: AtomicBool,
    exited: Mutex<bool>,
}

impl ServerHandle {
    pub(super) fn new(pid: Option<u32>) -> Self {
        Self {
            inner: Arc::new(HandleState {
                pid,
                terminate_requested: AtomicBool::new(false),
                exited: Mutex::new(pid.is_none()),
            }),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.inner.pid
    }

    pub fn is_running(&self) -> bool {
        !*self.inner.exited.lock()
    }

    /// Whether `terminate` has been called on any clone.
    pub fn terminate_requested(&self) -> bool {
        self.inner.terminate_requested.load(Ordering::SeqCst)
    }

    pub(super) fn mark_exited(&self) {
        *self.inner.exited.lock() = true;
    }

    /// Ask the server to stop.
    pub fn terminate(&self) {
        if self.inner.terminate_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(pid) = self.inner.pid else { return };
        let exited = self.inner.exited.lock();
        if *exited {
            return;
        }

        crate::debug!("server"; "terminating pid {}", pid);
        if let Err(e) = send_terminate(pid) {
            crate::debug!("server"; "terminate pid {} failed: {}", pid, e);
        }
    }
}

#[cfg(unix)]
fn send_terminate(pid: u32) -> std::io::Result<()> {
    let pid: libc::pid_t = pid.try_into().map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "PID out of range")
    })?;

    let result = unsafe { libc::kill(pid, libc::SIGTERM) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_terminate(pid: u32) -> std::io::Result<()> {
    let pid = pid.to_string();
    crate::utils::exec::Cmd::new("taskkill")
        .args(["/PID", pid.as_str(), "/T", "/F"])
        .probe()
        .map(|_| ())
}
