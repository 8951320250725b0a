//! Configuration for bloat-ci
//!
//! This module provides:
//! - .bloat-ci.toml config file support (what to measure, where to store)
//! - The CI environment read into a [`RunConfig`]

pub mod env;
pub mod file;
pub mod loader;

pub use env::{Repository, RunConfig, Trigger};
pub use file::{ConfigFile, MeasureSettings, CONFIG_FILE_NAME, DEFAULT_BOT_LOGIN};
pub use loader::ConfigLoader;
