//! Configuration section definitions.
//!
//! Each module corresponds to a section in `devloop.toml`:
//!
//! | Module  | TOML Section | Purpose                                 |
//! |---------|--------------|-----------------------------------------|
//! | `build` | `[build]`    | Generator command                       |
//! | `serve` | `[serve]`    | Preview server (port, watch, python)    |
//! | `watch` | `[watch]`    | Quiet period and main loop tick         |

mod build;
mod serve;
mod watch;

pub use build::BuildConfig;
pub use serve::ServeConfig;
pub use watch::WatchConfig;
