//! `[build]` section configuration.
//!
//! ```toml
//! [build]
//! command = ["swift", "run"]   # Generator command, run in the site root
//! ```

use serde::{Deserialize, Serialize};

use crate::config::error::Diagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Generator command line; the first element is the program.
    pub command: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: vec!["swift".into(), "run".into()],
        }
    }
}

impl BuildConfig {
    pub fn validate(&self, diag: &mut Diagnostics) {
        if self.command.first().is_none_or(|program| program.trim().is_empty()) {
            diag.error("build.command", "must name a program to run");
        }
    }
}
