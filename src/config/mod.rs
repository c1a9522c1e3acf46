//! Configuration management for `devloop.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError, Diagnostics
//! ├── util           # find_config_file
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The file is optional: every field has a default, and CLI options
//! override whatever the file sets.

mod error;
pub mod section;
mod util;

pub use error::{ConfigError, Diagnostics};
pub use section::{BuildConfig, ServeConfig, WatchConfig};

use util::find_config_file;

use crate::cli::{Cli, Commands};
use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Config file name searched for when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "devloop.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing devloop.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Path to the config file, which may not exist (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site root: contains Sources, Resources, Content and Output (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Generator settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Preview server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Watch timing settings
    #[serde(default)]
    pub watch: WatchConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Without `--root`, searches upward from cwd for the config file; the
    /// site root is the config file's directory, or cwd if none is found.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(cli, &cwd)
    }

    fn load_from(cli: &Cli, cwd: &Path) -> Result<Self> {
        let (root, config_path) = Self::resolve_paths(cli, cwd);

        let mut config = if config_path.is_file() {
            crate::debug!("config"; "loading {}", config_path.display());
            Self::from_path(&config_path)?
        } else if cli.config != Path::new(DEFAULT_CONFIG) {
            // an explicitly named config file has to exist
            let err = std::io::Error::from(std::io::ErrorKind::NotFound);
            return Err(ConfigError::Io(config_path, err).into());
        } else {
            Self::default()
        };

        config.root = crate::utils::path::normalize_path(&root);
        config.config_path = config_path;

        let mut diag = Diagnostics::new();
        config.apply_command_options(cli, &mut diag);
        config.validate(&mut diag);
        diag.into_result()?;

        Ok(config)
    }

    /// Site root and config file location.
    fn resolve_paths(cli: &Cli, cwd: &Path) -> (PathBuf, PathBuf) {
        if let Some(root) = &cli.root {
            let root = cwd.join(root);
            let config_path = root.join(&cli.config);
            return (root, config_path);
        }

        match find_config_file(&cli.config, cwd) {
            Some(path) => {
                let root = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
                (root, path)
            }
            None => (cwd.to_path_buf(), cwd.join(&cli.config)),
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli, diag: &mut Diagnostics) {
        match &cli.command {
            Commands::Run {
                port,
                watch,
                quiet_period,
            } => {
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
                if let Some(secs) = quiet_period {
                    let millis = Duration::try_from_secs_f64(*secs)
                        .ok()
                        .and_then(|period| u64::try_from(period.as_millis()).ok());
                    match millis {
                        Some(millis) => self.watch.quiet_period_ms = millis,
                        None if secs.is_nan() || *secs < 0.0 => {
                            diag.error("--quiet-period", "must be a non-negative number of seconds")
                        }
                        None => diag.error("--quiet-period", format!("{secs} seconds is out of range")),
                    }
                }
            }
            Commands::Build => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, collecting all errors.
    pub fn validate(&self, diag: &mut Diagnostics) {
        self.build.validate(diag);
        self.serve.validate(diag);
        self.watch.validate(diag);
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
