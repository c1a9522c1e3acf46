//! The development loop's main thread.
//!
//! Ticks every [`TICK`], asks the debouncer whether a quiet period has
//! elapsed and, if so, regenerates. Shutdown requests arrive on the
//! coordinator's channel and end the loop after running the teardown; the
//! loop hands back the reason that won, which decides the exit status.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::RecvTimeoutError;

use super::{ShutdownCoordinator, ShutdownReason};
use crate::generator::BuildTrigger;
use crate::watch::{ChangeDebouncer, DEFAULT_QUIET_PERIOD};

/// Poll interval of the main loop.
pub const TICK: Duration = Duration::from_millis(100);

pub struct MainLoop {
    trigger: BuildTrigger,
    /// `None` when watching is disabled
    debouncer: Option<Arc<ChangeDebouncer>>,
    coordinator: Arc<ShutdownCoordinator>,
    quiet_period: Duration,
    tick: Duration,
}

impl MainLoop {
    pub fn new(trigger: BuildTrigger, coordinator: Arc<ShutdownCoordinator>) -> Self {
        Self {
            trigger,
            debouncer: None,
            coordinator,
            quiet_period: DEFAULT_QUIET_PERIOD,
            tick: TICK,
        }
    }

    /// Rebuild on changes recorded in `debouncer` once `quiet_period` passes.
    pub fn with_debouncer(mut self, debouncer: Arc<ChangeDebouncer>, quiet_period: Duration) -> Self {
        self.debouncer = Some(debouncer);
        self.quiet_period = quiet_period;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Run until a shutdown request arrives, then return the reason the
    /// session ended with.
    ///
    /// Teardown on another thread wakes the loop only after its exit action
    /// ran. Without a debouncer there is nothing to poll, so the loop just
    /// waits for the request.
    pub fn run(&mut self) -> ShutdownReason {
        let requests = self.coordinator.requests();

        loop {
            let request = if self.debouncer.is_some() {
                match requests.recv_timeout(self.tick) {
                    Ok(reason) => Some(reason),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => Some(ShutdownReason::LoopExited),
                }
            } else {
                Some(requests.recv().unwrap_or(ShutdownReason::LoopExited))
            };

            if let Some(reason) = request {
                self.coordinator.tear_down(reason);
                return self.coordinator.reason().unwrap_or(reason);
            }
            self.poll(Instant::now());
        }
    }

    /// One tick: regenerate if a burst of changes has gone quiet.
    ///
    /// Returns whether a rebuild ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(debouncer) = &self.debouncer else {
            return false;
        };
        if !debouncer.take_due(now, self.quiet_period) {
            return false;
        }
        self.trigger.rebuild();
        true
    }
}
