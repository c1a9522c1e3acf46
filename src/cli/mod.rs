//! Command-line interface module.

mod args;
pub mod build;
pub mod run;

pub use args::{Cli, Commands};
