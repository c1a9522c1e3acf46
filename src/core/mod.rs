//! Session core: error taxonomy, shutdown coordination and the main loop.

mod error;
mod main_loop;
mod shutdown;

pub use error::RunError;
pub use main_loop::{MainLoop, TICK};
pub use shutdown::{ShutdownCoordinator, ShutdownReason, TeardownGuard};
