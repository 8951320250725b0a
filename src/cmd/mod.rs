//! Command handlers for bloat-ci CLI
//!
//! This module contains all command implementations, organized by functionality.
//! Each submodule handles a specific CLI command.

pub mod compare;
pub mod completions;
pub mod key;
pub mod run;
pub mod workflow;

// Re-export command functions for convenient access
pub use compare::cmd_compare;
pub use completions::cmd_completions;
pub use key::cmd_key;
pub use run::cmd_run;
pub use workflow::{BloatWorkflow, RunOutcome};
