//! Shared helpers: external command execution and path normalization.

pub mod exec;
pub mod path;
