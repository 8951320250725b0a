//! Measurement collection through cargo
//!
//! Discovers the workspace binaries with `cargo metadata`, then runs
//! `cargo bloat` and `cargo tree` once per package.

use super::bloat::{parse_bloat_json, BloatOutput};
use crate::config::MeasureSettings;
use crate::error::BloatCiError;
use crate::infra::{CommandExecutor, RealCommandExecutor};
use crate::snapshot::{Package, Versions};
use crate::toolchain::ToolchainProbe;
use anyhow::{Context, Result};
use cargo_metadata::MetadataCommand;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Source of per-package measurements
pub trait MeasurementSource {
    /// Make sure the analysis tools are usable
    fn prepare(&self) -> Result<()>;

    /// Toolchain identification for the snapshot
    fn versions(&self) -> Result<Versions>;

    /// Packages to measure, in order
    fn packages(&self) -> Result<Vec<String>>;

    /// Measure one package
    fn measure(&self, package: &str) -> Result<Package>;
}

/// Locate the `cargo` executable on PATH
pub fn locate_cargo() -> Result<PathBuf> {
    which::which("cargo").map_err(|_| {
        BloatCiError::ToolMissing {
            tool: "cargo".to_string(),
            install_cmd: "curl https://sh.rustup.rs -sSf | sh".to_string(),
        }
        .into()
    })
}

/// cargo-bloat based collector
pub struct BloatCollector<CE: CommandExecutor = RealCommandExecutor> {
    cargo: String,
    manifest_path: Option<PathBuf>,
    settings: MeasureSettings,
    cmd_executor: CE,
}

impl BloatCollector<RealCommandExecutor> {
    /// Create a collector using the real cargo
    pub fn new(cargo: &Path, manifest_path: Option<PathBuf>, settings: MeasureSettings) -> Self {
        Self::with_executor(
            cargo.to_string_lossy(),
            manifest_path,
            settings,
            RealCommandExecutor,
        )
    }
}

impl<CE: CommandExecutor> BloatCollector<CE> {
    /// Create a collector with a custom command executor
    pub fn with_executor(
        cargo: impl Into<String>,
        manifest_path: Option<PathBuf>,
        settings: MeasureSettings,
        cmd_executor: CE,
    ) -> Self {
        Self {
            cargo: cargo.into(),
            manifest_path,
            settings,
            cmd_executor,
        }
    }

    /// Run cargo with the given arguments and return stdout
    fn cargo(&self, args: &[String]) -> Result<String> {
        debug!("Running {} {}", self.cargo, args.join(" "));

        let output = self
            .cmd_executor
            .execute(
                |cmd| {
                    cmd.args(args);
                    if let Some(manifest) = &self.manifest_path {
                        cmd.arg("--manifest-path").arg(manifest);
                    }
                    cmd
                },
                &self.cargo,
            )
            .map_err(|e| BloatCiError::Io {
                context: format!("running cargo {}", args.first().map_or("", String::as_str)),
                source: e,
            })?;

        if !output.status.success() {
            return Err(BloatCiError::ToolFailed {
                command: format!("cargo {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        String::from_utf8(output.stdout).context("cargo output is not valid UTF-8")
    }

    fn bloat_installed(&self) -> bool {
        self.cmd_executor
            .execute(|cmd| cmd.arg("bloat").arg("--version"), &self.cargo)
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Arguments for `cargo bloat`, always requesting JSON output
    fn bloat_args(&self, package: &str) -> Vec<String> {
        let mut args = vec!["bloat".to_string()];
        args.extend(self.settings.bloat_args.iter().cloned());
        if !args.iter().any(|a| a == "--message-format") {
            args.push("--message-format".to_string());
            args.push("json".to_string());
        }
        args.push("-p".to_string());
        args.push(package.to_string());
        args
    }

    /// Run cargo-bloat for one package
    pub fn bloat(&self, package: &str) -> Result<BloatOutput> {
        let stdout = self.cargo(&self.bloat_args(package))?;
        parse_bloat_json(&stdout).with_context(|| format!("cargo bloat output for {}", package))
    }

    /// Capture `cargo tree` for one package
    pub fn tree(&self, package: &str) -> Result<String> {
        let mut args = vec!["tree".to_string(), "-p".to_string(), package.to_string()];
        args.extend(self.settings.tree_args.iter().cloned());
        self.cargo(&args)
    }
}

impl<CE: CommandExecutor> MeasurementSource for BloatCollector<CE> {
    fn prepare(&self) -> Result<()> {
        if self.bloat_installed() {
            return Ok(());
        }

        if !self.settings.install_missing {
            return Err(BloatCiError::ToolMissing {
                tool: "cargo-bloat".to_string(),
                install_cmd: "cargo install cargo-bloat".to_string(),
            }
            .into());
        }

        info!("cargo-bloat not found, installing it");
        let output = self
            .cmd_executor
            .execute(|cmd| cmd.args(["install", "cargo-bloat"]), &self.cargo)
            .map_err(|e| BloatCiError::Io {
                context: "running cargo install".to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(BloatCiError::ToolFailed {
                command: "cargo install cargo-bloat".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn versions(&self) -> Result<Versions> {
        ToolchainProbe::with_executor(self.cargo.clone(), &self.cmd_executor).versions()
    }

    fn packages(&self) -> Result<Vec<String>> {
        if !self.settings.packages.is_empty() {
            return Ok(self.settings.packages.clone());
        }

        let args: Vec<String> = ["metadata", "--format-version", "1", "--no-deps"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let stdout = self.cargo(&args)?;
        let metadata =
            MetadataCommand::parse(stdout).context("Failed to parse cargo metadata output")?;

        let packages: Vec<String> = metadata
            .workspace_packages()
            .into_iter()
            .filter(|p| p.targets.iter().any(|t| t.is_bin()))
            .map(|p| p.name.to_string())
            .collect();

        info!("Found {} binary package(s): {}", packages.len(), packages.join(", "));
        Ok(packages)
    }

    fn measure(&self, package: &str) -> Result<Package> {
        let bloat = self.bloat(package)?;
        let tree = self.tree(package)?;
        Ok(Package { bloat, tree })
    }
}
