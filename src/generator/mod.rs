//! Site generation.
//!
//! The generator itself is an external collaborator: anything implementing
//! [`Generator`]. The default [`CommandGenerator`] runs the configured build
//! command in the site root. [`BuildTrigger`] wraps a generator with the
//! reporting rules of the development loop.

mod trigger;

pub use trigger::{BuildError, BuildTrigger};

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::utils::exec::{Chatter, Cmd};

/// Produces the site's `Output` folder from its sources.
pub trait Generator: Send {
    /// Run a full generation. Blocking; no partial builds.
    fn generate(&mut self) -> Result<()>;
}

/// Build tool chatter that is not worth echoing on every rebuild.
static SWIFT_CHATTER: Chatter = Chatter::new(&[
    "Building for",
    "Build complete",
    "Compiling",
    "Fetching",
    "Computing version",
    "Fetched",
    "Emitting module",
    "Write swift-version",
]);

/// [`Generator`] that runs an external command in the site root.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    root: PathBuf,
    command: Vec<String>,
}

impl CommandGenerator {
    pub fn new(root: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            root: root.into(),
            command,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Generator for CommandGenerator {
    fn generate(&mut self) -> Result<()> {
        if self.command.is_empty() {
            bail!("no build command configured");
        }

        let output = Cmd::from_slice(&self.command)
            .cwd(&self.root)
            .quiet(&SWIFT_CHATTER)
            .run()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            crate::debug!("build"; "{}", line);
        }
        Ok(())
    }
}
