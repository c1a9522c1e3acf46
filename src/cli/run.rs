//! The development session (`devloop run`).
//!
//! ```text
//! initial build ─► server ─► watcher ─► MainLoop ─┬─ tick: rebuild when due
//!      │ fails                                     └─ request: tear down
//!      └─► abort, server never started
//! ```
//!
//! Everything started after the initial build is owned by the
//! [`ShutdownCoordinator`]; a [`TeardownGuard`](crate::core::TeardownGuard)
//! releases it on any early return.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::SiteConfig;
use crate::core::{MainLoop, RunError, ShutdownCoordinator, ShutdownReason};
use crate::generator::{BuildTrigger, CommandGenerator, Generator};
use crate::log;
use crate::server::{ServerCommand, ServerSupervisor};
use crate::watch::{ChangeDebouncer, watch_site};

/// Settings of one development session.
#[derive(Debug, Clone)]
pub struct DevLoop {
    root: PathBuf,
    port: u16,
    watch: bool,
    quiet_period: Duration,
    tick: Duration,
    server: ServerCommand,
    /// Off in tests: the Ctrl+C handler can be installed once per process
    handle_interrupts: bool,
}

impl DevLoop {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            root: config.get_root().to_path_buf(),
            port: config.serve.port,
            watch: config.serve.watch,
            quiet_period: config.watch.quiet_period(),
            tick: config.watch.tick(),
            server: config.serve.server_command(),
            handle_interrupts: true,
        }
    }

    /// Run the session until shutdown and return why it ended.
    ///
    /// Returns an error for startup failures; once the loop is running the
    /// session ends through the coordinator.
    pub fn run(
        self,
        generator: Box<dyn Generator>,
        coordinator: Arc<ShutdownCoordinator>,
    ) -> Result<ShutdownReason, RunError> {
        let mut trigger = BuildTrigger::new(generator);

        log!("build"; "generating site...");
        trigger.build().map_err(RunError::InitialBuild)?;

        let _guard = coordinator.guard();
        if self.handle_interrupts {
            coordinator.install_interrupt_handler()?;
        }

        ServerSupervisor::new(Arc::clone(&coordinator)).start(&self.root, self.port, &self.server)?;

        let mut main_loop = MainLoop::new(trigger, Arc::clone(&coordinator)).with_tick(self.tick);
        if self.watch {
            let debouncer = Arc::new(ChangeDebouncer::new());
            let watcher = watch_site(&self.root, Arc::clone(&debouncer))?;
            coordinator.attach_watcher(Box::new(watcher));
            main_loop = main_loop.with_debouncer(debouncer, self.quiet_period);
        }

        Ok(main_loop.run())
    }
}

/// `devloop run` with the configured generator and a process-ending coordinator.
pub fn run_dev_loop(config: &SiteConfig) -> Result<()> {
    let generator = CommandGenerator::new(config.get_root(), config.build.command.clone());
    let coordinator = Arc::new(ShutdownCoordinator::new());
    let reason = DevLoop::from_config(config)
        .run(Box::new(generator), coordinator)
        .inspect_err(|e| {
            if e.is_fatal_precondition() {
                log!("hint"; "site root is {}; pass --root to use another", config.get_root().display());
            }
        })?;

    // teardown on the watchdog thread may still be inside its own exit call
    if let Some(code) = reason.exit_code() {
        std::process::exit(code);
    }
    Ok(())
}
