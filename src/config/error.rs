//! Configuration error types.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(Diagnostics),
}

/// Validation failures collected over all sections.
#[derive(Debug, Default)]
pub struct Diagnostics {
    /// `(field, message)` pairs, e.g. `("serve.port", "must not be 0")`
    errors: Vec<(&'static str, String)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.iter().map(|(field, _)| *field)
    }

    /// Err if anything was reported.
    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(self))
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "config validation failed:".red().bold())?;
        for (field, message) in &self.errors {
            write!(f, "\n{}{}{} {} {}", "[".dimmed(), field.cyan(), "]".dimmed(), "→".red(), message)?;
        }
        Ok(())
    }
}
