//! Configuration file data structures

use serde::{Deserialize, Serialize};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = ".bloat-ci.toml";

/// Login of the account that posts workflow comments
pub const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";

/// bloat-ci configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Base URL of the key-value snapshot store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kv_url: Option<String>,

    /// Author of the comments this tool owns
    #[serde(default = "default_bot_login")]
    pub bot_login: String,

    /// Branch names treated as the trunk
    #[serde(default = "default_branches")]
    pub default_branches: Vec<String>,

    /// What to measure and how
    #[serde(flatten)]
    pub measure: MeasureSettings,
}

fn default_bot_login() -> String {
    DEFAULT_BOT_LOGIN.to_string()
}

fn default_branches() -> Vec<String> {
    vec!["main".to_string(), "master".to_string()]
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            kv_url: None,
            bot_login: default_bot_login(),
            default_branches: default_branches(),
            measure: MeasureSettings::default(),
        }
    }
}

/// Settings for the build analysis step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureSettings {
    /// Packages to measure; empty means every binary in the workspace
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,

    /// Extra arguments for `cargo bloat` (`-p` is added per package)
    pub bloat_args: Vec<String>,

    /// Extra arguments for `cargo tree`
    pub tree_args: Vec<String>,

    /// Run `cargo install cargo-bloat` when it is missing
    pub install_missing: bool,
}

impl Default for MeasureSettings {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            bloat_args: ["--release", "--all-features", "--crates", "-n", "0"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tree_args: vec!["--edges".to_string(), "normal".to_string()],
            install_missing: true,
        }
    }
}
