//! Configuration file loading and validation

use super::file::{ConfigFile, CONFIG_FILE_NAME};
use crate::error::BloatCiError;
use crate::infra::{FileSystem, RealFileSystem};
use anyhow::Result;
use log::debug;
use std::path::Path;

/// Handles loading configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from .bloat-ci.toml in the given directory
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bloat_ci::config::ConfigLoader;
    /// use std::path::Path;
    ///
    /// let config = ConfigLoader::load(Path::new("."))?;
    /// println!("Trunk branches: {:?}", config.default_branches);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(project_root: &Path) -> Result<ConfigFile> {
        Self::load_with_fs(project_root, &RealFileSystem)
    }

    /// Load config with a custom filesystem implementation
    pub fn load_with_fs<FS: FileSystem>(project_root: &Path, fs: &FS) -> Result<ConfigFile> {
        let config_path = project_root.join(CONFIG_FILE_NAME);

        let contents = match fs.read_to_string(&config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                return Ok(ConfigFile::default());
            }
            Err(e) => {
                return Err(BloatCiError::Io {
                    context: format!("reading {}", config_path.display()),
                    source: e,
                }
                .into());
            }
        };

        let config: ConfigFile = toml_edit::de::from_str(&contents).map_err(|e| {
            BloatCiError::InvalidConfig {
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        Self::validate(&config).map_err(|reason| BloatCiError::InvalidConfig {
            path: config_path.clone(),
            reason,
        })?;

        debug!("Loaded {}", config_path.display());
        Ok(config)
    }

    /// Check values that parse but cannot work
    pub fn validate(config: &ConfigFile) -> std::result::Result<(), String> {
        if let Some(url) = &config.kv_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("kv_url must be an http(s) URL, got '{}'", url));
            }
        }

        if config.bot_login.trim().is_empty() {
            return Err("bot_login cannot be empty".to_string());
        }

        if config.default_branches.is_empty() {
            return Err("default_branches needs at least one branch name".to_string());
        }
        if config.default_branches.iter().any(|b| b.trim().is_empty()) {
            return Err("default_branches cannot contain empty names".to_string());
        }

        if config.measure.packages.iter().any(|p| p.trim().is_empty()) {
            return Err("packages cannot contain empty names".to_string());
        }

        let package_flag = config
            .measure
            .bloat_args
            .iter()
            .chain(&config.measure.tree_args)
            .find(|a| matches!(a.as_str(), "-p" | "--package"));
        if let Some(flag) = package_flag {
            return Err(format!(
                "'{}' is added per package; list packages under `packages` instead",
                flag
            ));
        }

        Ok(())
    }
}
