//! Preview server supervision.
//!
//! The server is an external HTTP file server run as a child process in the
//! site's `Output` folder. A dedicated watchdog thread waits for it, drains
//! its stderr, and classifies how it ended. An abnormal end escalates to the
//! [`ShutdownCoordinator`], which ends the whole session.

mod command;
mod exit;
mod handle;


pub use command::{HttpModule, PORT_PLACEHOLDER, ServerCommand, parse_major_version, probe_major_version};
pub use exit::ServerExit;
pub use handle::ServerHandle;

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStderr};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::core::{RunError, ShutdownCoordinator, ShutdownReason};
use crate::utils::exec::Cmd;

/// Generated site folder served by the preview server.
pub const OUTPUT_DIR: &str = "Output";

/// Lines of server stderr kept for exit classification.
const STDERR_TAIL_LINES: usize = 40;

/// Starts the preview server and watches it on a background thread.
pub struct ServerSupervisor {
    coordinator: Arc<ShutdownCoordinator>,
}

/// A launched server: its handle plus the watchdog thread waiting on it.
pub struct RunningServer {
    handle: ServerHandle,
    watchdog: JoinHandle<ServerExit>,
}

impl RunningServer {
    pub fn handle(&self) -> &ServerHandle {
        &self.handle
    }

    /// Block until the server has ended and return how it ended.
    pub fn wait(self) -> ServerExit {
        self.watchdog.join().unwrap_or_else(|_| ServerExit::Failed {
            message: "server watchdog panicked".to_string(),
        })
    }
}

impl ServerSupervisor {
    pub fn new(coordinator: Arc<ShutdownCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Serve `site_root/Output` on `port`.
    ///
    /// A missing `Output` folder is reported before anything is launched.
    pub fn start(
        &self,
        site_root: &Path,
        port: u16,
        command: &ServerCommand,
    ) -> Result<RunningServer, RunError> {
        let output_dir = site_root.join(OUTPUT_DIR);
        if !output_dir.is_dir() {
            return Err(RunError::MissingOutput(output_dir));
        }

        crate::log!("serve"; "http://localhost:{}", port);
        crate::log!("serve"; "press Ctrl+C to stop the server and exit");

        self.launch(command.to_cmd(&output_dir, port), port)
    }

    /// Spawn `cmd` as the server process and hand it to a watchdog thread.
    ///
    /// Spawn failures are not returned: they go through the same abnormal
    /// exit path as a server that dies later.
    pub fn launch(&self, cmd: Cmd, port: u16) -> Result<RunningServer, RunError> {
        let program = cmd.program_name();
        crate::debug!("server"; "{}", cmd.display());

        let child = cmd.spawn_captured();
        let handle = ServerHandle::new(child.as_ref().ok().map(Child::id));
        self.coordinator.attach_server(handle.clone());

        let coordinator = Arc::clone(&self.coordinator);
        let watched = handle.clone();
        let watchdog = thread::Builder::new()
            .name("server-watchdog".into())
            .spawn(move || {
                let exit = match child {
                    Ok(child) => wait_for_exit(child, &watched, port),
                    Err(e) => ServerExit::launch_failed(&program, &e),
                };
                escalate(&exit, &watched, &coordinator);
                exit
            })
            .map_err(RunError::Spawn)?;

        Ok(RunningServer { handle, watchdog })
    }
}

fn wait_for_exit(mut child: Child, handle: &ServerHandle, port: u16) -> ServerExit {
    let stderr = child
        .stderr
        .take()
        .map(|pipe| thread::spawn(move || drain_stderr(pipe)));

    // The pid stays reserved until reaped; close the handle first
    wait_until_exited(&child);
    handle.mark_exited();
    let status = child.wait();

    let tail = stderr
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();

    match status {
        Ok(status) => ServerExit::classify(status, &tail, handle.terminate_requested(), port),
        Err(e) => ServerExit::Failed {
            message: format!("lost track of server process: {e}"),
        },
    }
}

/// Block until `child` has exited without reaping it.
#[cfg(unix)]
fn wait_until_exited(child: &Child) {
    let pid = child.id() as libc::id_t;
    loop {
        // SAFETY: `info` is a valid out-parameter; WNOWAIT leaves the child waitable
        let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::waitid(libc::P_PID, pid, &mut info, libc::WEXITED | libc::WNOWAIT) };
        if rc == 0 || std::io::Error::last_os_error().kind() != std::io::ErrorKind::Interrupted {
            return;
        }
    }
}

/// The open process handle in `Child` already keeps the pid from being reused.
#[cfg(not(unix))]
fn wait_until_exited(_child: &Child) {}

/// Forward server output (request logs) to the debug log, keeping the tail.
///
/// Reading continuously keeps the server from blocking on a full pipe.
fn drain_stderr(pipe: ChildStderr) -> String {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    for line in BufReader::new(pipe).lines().map_while(Result::ok) {
        crate::debug!("server"; "{}", line);
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Vec::from(tail).join("\n")
}

/// Report an abnormal exit and end the session.
///
/// Exits during an ongoing teardown are expected and stay quiet.
fn escalate(exit: &ServerExit, handle: &ServerHandle, coordinator: &ShutdownCoordinator) {
    if !exit.is_abnormal() || coordinator.is_torn_down() {
        return;
    }

    crate::error!("{}", exit);
    handle.terminate();
    coordinator.tear_down(ShutdownReason::ServerFailed);
}
