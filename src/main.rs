//! devloop - regenerate a static site on source changes and serve its output.

#![allow(dead_code)]

mod cli;
mod config;
mod core;
mod generator;
mod logger;
mod server;
mod utils;
mod watch;

#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Run { .. } => cli::run::run_dev_loop(&config),
        Commands::Build => cli::build::build_site(&config),
    }
}
