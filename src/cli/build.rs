//! One-shot site generation (`devloop build`).

use std::time::Instant;

use anyhow::Result;

use crate::config::SiteConfig;
use crate::generator::{BuildTrigger, CommandGenerator};
use crate::log;
use crate::logger::format_elapsed;

/// Generate the site once. A failed build is an error.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    let generator = CommandGenerator::new(config.get_root(), config.build.command.clone());
    let mut trigger = BuildTrigger::new(Box::new(generator));

    log!("build"; "generating {}", config.get_root().display());
    let started = Instant::now();
    trigger.build()?;
    log!("build"; "done in {}", format_elapsed(started.elapsed()));
    Ok(())
}
