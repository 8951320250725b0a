//! Rust toolchain identification

use crate::error::BloatCiError;
use crate::infra::{CommandExecutor, RealCommandExecutor};
use crate::snapshot::Versions;
use anyhow::{Context, Result};
use log::{info, warn};

/// Placeholder for version strings that could not be probed
pub const UNKNOWN_VERSION: &str = "unknown";

/// Rust toolchain probe
pub struct ToolchainProbe<CE: CommandExecutor = RealCommandExecutor> {
    cargo: String,
    cmd_executor: CE,
}

impl ToolchainProbe<RealCommandExecutor> {
    /// Create a probe with real command execution
    pub fn new(cargo: impl Into<String>) -> Self {
        Self::with_executor(cargo, RealCommandExecutor)
    }
}

impl<CE: CommandExecutor> ToolchainProbe<CE> {
    /// Create a probe with a custom command executor (for testing)
    pub fn with_executor(cargo: impl Into<String>, cmd_executor: CE) -> Self {
        Self {
            cargo: cargo.into(),
            cmd_executor,
        }
    }

    /// Collect toolchain label, rustc version and cargo-bloat version
    ///
    /// The toolchain label is required because it is part of the store key.
    /// The other two are informational and fall back to `unknown`.
    pub fn versions(&self) -> Result<Versions> {
        let active = self
            .capture("rustup", &["show", "active-toolchain"])
            .context("Failed to determine the active toolchain")?;
        let toolchain = active
            .split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or_else(|| BloatCiError::ToolFailed {
                command: "rustup show active-toolchain".to_string(),
                stderr: "empty output".to_string(),
            })?;

        let rustc = self.capture_or_unknown("rustc", &["--version"]);
        let bloat = self.capture_or_unknown(&self.cargo, &["bloat", "--version"]);

        info!("Toolchain: {} | {} | {}", toolchain, rustc, bloat);

        Ok(Versions {
            toolchain,
            rustc,
            bloat,
        })
    }

    fn capture(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = self
            .cmd_executor
            .execute(|cmd| cmd.args(args), program)
            .map_err(|e| BloatCiError::Io {
                context: format!("running {}", program),
                source: e,
            })?;

        if !output.status.success() {
            return Err(BloatCiError::ToolFailed {
                command: format!("{} {}", program, args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn capture_or_unknown(&self, program: &str, args: &[&str]) -> String {
        match self.capture(program, args) {
            Ok(version) if !version.is_empty() => version,
            Ok(_) => UNKNOWN_VERSION.to_string(),
            Err(e) => {
                warn!("Could not read {} version: {:#}", program, e);
                UNKNOWN_VERSION.to_string()
            }
        }
    }
}
