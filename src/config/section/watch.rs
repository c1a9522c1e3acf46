//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! quiet_period_ms = 3000      # Wait this long after the last change
//! tick_ms = 100               # Main loop poll interval
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::Diagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub quiet_period_ms: u64,
    pub tick_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 3000,
            tick_ms: 100,
        }
    }
}

impl WatchConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn validate(&self, diag: &mut Diagnostics) {
        if self.tick_ms == 0 {
            diag.error("watch.tick_ms", "must be greater than 0");
        }
    }
}
