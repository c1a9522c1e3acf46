//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Regenerate a static site on source changes and serve its output
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: devloop.toml)
    #[arg(short = 'C', long, global = true, default_value = "devloop.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Site root (default: directory of the config file, else the current directory)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build, serve `Output`, and regenerate on source changes
    #[command(visible_alias = "r")]
    Run {
        /// Port number for the preview server
        #[arg(short, long)]
        port: Option<u16>,

        /// Watch Sources, Resources and Content for changes
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,

        /// Seconds without changes before regenerating
        #[arg(short, long, value_name = "SECS")]
        quiet_period: Option<f64>,
    },

    /// Generate the site once and exit
    #[command(visible_alias = "b")]
    Build,
}

impl Cli {
    pub const fn is_run(&self) -> bool {
        matches!(self.command, Commands::Run { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["devloop", "run"]).unwrap();
        assert!(cli.is_run());
        assert_eq!(cli.config, PathBuf::from("devloop.toml"));
        assert!(cli.root.is_none());
        assert!(!cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Run {
                port: None,
                watch: None,
                quiet_period: None
            }
        ));
    }

    #[test]
    fn test_parse_run_options() {
        let cli =
            Cli::try_parse_from(["devloop", "r", "-p", "9000", "--watch", "false", "-q", "0.5", "-v"])
                .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                port,
                watch,
                quiet_period,
            } => {
                assert_eq!(port, Some(9000));
                assert_eq!(watch, Some(false));
                assert_eq!(quiet_period, Some(0.5));
            }
            Commands::Build => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_bare_watch_flag() {
        let cli = Cli::try_parse_from(["devloop", "run", "-w"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { watch: Some(true), .. }));
    }

    #[test]
    fn test_parse_build_with_root() {
        let cli = Cli::try_parse_from(["devloop", "--root", "/site", "build"]).unwrap();
        assert!(!cli.is_run());
        assert_eq!(cli.root, Some(PathBuf::from("/site")));
    }
}
