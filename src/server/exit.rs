use std::fmt;
use std::process::ExitStatus;
use std::sync::OnceLock;

use regex::Regex;

/// How the preview server ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerExit {
    /// Stopped by a termination request. Expected, not reported.
    Terminated,
    /// The requested port was already bound.
    PortInUse { port: u16, message: String },
    /// The server reported an error or exited on its own.
    Failed { message: String },
    /// The server process could not be started at all.
    LaunchFailed { message: String },
}

impl ServerExit {
    /// Classify a finished server process.
    ///
    /// `stderr` is the tail of what the server wrote; `terminate_requested`
    /// is set when this process asked the server to stop.
    pub fn classify(status: ExitStatus, stderr: &str, terminate_requested: bool, port: u16) -> Self {
        if terminate_requested || terminated_by_sigterm(status) {
            return Self::Terminated;
        }

        let message = stderr.trim();
        if message.is_empty() {
            return Self::Failed {
                message: format!("server exited unexpectedly ({status})"),
            };
        }
        if is_port_conflict(message) {
            return Self::PortInUse {
                port,
                message: message.to_string(),
            };
        }
        Self::Failed {
            message: message.to_string(),
        }
    }

    /// Classify a spawn failure.
    pub fn launch_failed(program: &str, err: &std::io::Error) -> Self {
        let message = if err.kind() == std::io::ErrorKind::NotFound {
            format!("could not start server: `{program}` not found")
        } else {
            format!("could not start server `{program}`: {err}")
        };
        Self::LaunchFailed { message }
    }

    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Self::Terminated)
    }
}

impl fmt::Display for ServerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminated => f.write_str("server stopped"),
            Self::PortInUse { port, .. } => write!(
                f,
                "Failed to start server: port {port} is already in use (Address already in use). \
                 A previous session may still be running; find it with `lsof -i :{port}` and kill it, \
                 or pick another port with --port"
            ),
            Self::Failed { message } | Self::LaunchFailed { message } => f.write_str(message),
        }
    }
}

fn is_port_conflict(message: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i-u)address already in use").unwrap());
    re.is_match(message)
}

#[cfg(unix)]
fn terminated_by_sigterm(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(libc::SIGTERM)
}

#[cfg(not(unix))]
fn terminated_by_sigterm(_status: ExitStatus) -> bool {
    false
}
