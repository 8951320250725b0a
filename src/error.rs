//! Error types with contextual suggestions
//!
//! Provides structured error types that include:
//! - Actionable error messages
//! - Suggested fixes
//! - Exit codes for CI runners
//!
//! # Examples
//!
//! ```
//! use bloat_ci::error::BloatCiError;
//!
//! let error = BloatCiError::UnsupportedEvent {
//!     event: "schedule".to_string(),
//!     allowed: vec!["pull_request".to_string(), "push".to_string()],
//! };
//!
//! assert_eq!(error.exit_code(), 78);
//! assert!(error.suggestion().unwrap().contains("pull_request"));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by bloat-ci
#[derive(Error, Debug)]
pub enum BloatCiError {
    /// The workflow was triggered by an event this tool does not handle
    #[error("This can only be used with the following events: {}", allowed.join(", "))]
    UnsupportedEvent {
        /// Event name that triggered the run
        event: String,
        /// Event names that are accepted
        allowed: Vec<String>,
    },

    /// A required environment variable is not set
    #[error("Required environment variable not set: {var}")]
    MissingEnv {
        /// Variable name
        var: String,
    },

    /// Configuration file could not be used
    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig {
        /// Path to the config file
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// cargo-bloat output carried neither crate nor function sizes
    #[error("Neither crates or functions are defined for package '{package}'")]
    MissingBreakdown {
        /// Package whose measurement is incomplete
        package: String,
    },

    /// Required tool is not installed
    #[error("Tool not installed: {tool}")]
    ToolMissing {
        /// Tool name
        tool: String,
        /// Installation command
        install_cmd: String,
    },

    /// External tool exited unsuccessfully
    #[error("Command failed: {command}")]
    ToolFailed {
        /// Command that failed
        command: String,
        /// Error output
        stderr: String,
    },

    /// Snapshot store rejected a request
    #[error("Snapshot store request for '{key}' failed: {message}")]
    Store {
        /// Store key involved
        key: String,
        /// Underlying failure
        message: String,
    },

    /// Hosting API rejected a request
    #[error("GitHub API {operation} failed: {message}")]
    Api {
        /// Operation that failed (e.g. "list comments")
        operation: String,
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Underlying failure
        message: String,
    },

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },
}

impl BloatCiError {
    /// Get actionable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::UnsupportedEvent { allowed, .. } => Some(format!(
                "Trigger the workflow with one of: {}",
                allowed.join(", ")
            )),
            Self::MissingEnv { var } => Some(format!(
                "Set {} in the workflow environment (or pass it as an action input)",
                var
            )),
            Self::InvalidConfig { .. } => {
                Some("Fix or remove .bloat-ci.toml to fall back to defaults".to_string())
            }
            Self::MissingBreakdown { .. } => Some(
                "cargo-bloat must be run with --message-format json and either --crates or function output"
                    .to_string(),
            ),
            Self::ToolMissing { install_cmd, .. } => Some(format!("Install with: {}", install_cmd)),
            Self::ToolFailed { stderr, .. } => {
                if stderr.contains("no bin target") || stderr.contains("binary target") {
                    Some("cargo-bloat only measures binaries; restrict `packages` in .bloat-ci.toml".to_string())
                } else {
                    Some("Check the tool output above and fix the build".to_string())
                }
            }
            Self::Store { .. } => {
                Some("Check the store URL and that the KV token is valid".to_string())
            }
            Self::Api { status, .. } => match status {
                Some(401) | Some(403) => Some(
                    "The token needs `issues: write` / `pull-requests: write` permission"
                        .to_string(),
                ),
                Some(404) => Some("Check GITHUB_REPOSITORY and the pull request number".to_string()),
                _ => None,
            },
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
        }
    }

    /// Get appropriate exit code for this error (sysexits.h conventions).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedEvent { .. } => 78, // EX_CONFIG
            Self::MissingEnv { .. } => 78,
            Self::InvalidConfig { .. } => 78,
            Self::MissingBreakdown { .. } => 65, // EX_DATAERR
            Self::ToolMissing { .. } => 127,
            Self::ToolFailed { .. } => 1,
            Self::Store { .. } => 1,
            Self::Api { .. } => 1,
            Self::Io { .. } => 74, // EX_IOERR
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with its cause chain and suggestion
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent),
                style("caused by:").yellow(),
                err
            ));
            source = err.source();
            indent += 1;
        }

        if let Some(suggestion) = Self::find(error).and_then(BloatCiError::suggestion) {
            output.push_str(&format!(
                "\n{} {}\n",
                style("help:").cyan().bold(),
                suggestion
            ));
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        Self::find(error).map_or(1, BloatCiError::exit_code)
    }

    /// Locate a `BloatCiError` anywhere in the chain, since callers wrap with context
    fn find(error: &anyhow::Error) -> Option<&BloatCiError> {
        error.chain().find_map(|e| e.downcast_ref::<BloatCiError>())
    }
}
