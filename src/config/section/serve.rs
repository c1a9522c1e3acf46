//! `[serve]` section configuration.
//!
//! Contains preview server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! port = 8000                 # HTTP port number
//! watch = true                # Regenerate on source changes
//! python = "python"           # Interpreter running the http.server module
//! # command = ["miniserve", "--port", "{port}", "."]
//! ```
//!
//! `command` replaces the Python server entirely. It runs in `Output`, and
//! `{port}` in any argument is replaced by the port.

use serde::{Deserialize, Serialize};

use crate::config::error::Diagnostics;
use crate::server::ServerCommand;

/// Preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// HTTP port number.
    pub port: u16,

    /// Enable the source watcher.
    pub watch: bool,

    /// Python interpreter name or path.
    pub python: String,

    /// Custom server command, used instead of Python when set.
    pub command: Option<Vec<String>>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            watch: true,
            python: "python".into(),
            command: None,
        }
    }
}

impl ServeConfig {
    /// Server command line for this configuration.
    ///
    /// Probes the interpreter when no custom command is set.
    pub fn server_command(&self) -> ServerCommand {
        match &self.command {
            Some(command) => ServerCommand::Custom(command.clone()),
            None => ServerCommand::detect(&self.python),
        }
    }

    pub fn validate(&self, diag: &mut Diagnostics) {
        if self.port == 0 {
            diag.error("serve.port", "must be between 1 and 65535");
        }
        match &self.command {
            Some(command) if command.first().is_none_or(|p| p.trim().is_empty()) => {
                diag.error("serve.command", "must name a program to run");
            }
            None if self.python.trim().is_empty() => {
                diag.error("serve.python", "must name an interpreter");
            }
            _ => {}
        }
    }
}
