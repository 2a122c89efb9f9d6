//! Process configuration.
//!
//! Values come from an optional YAML file named by `SHELF_CONFIG`, then the
//! `LISTEN` and `STATIC_ROOT` environment variables override individual keys.
//!
//! ```yaml
//! server:
//!   listen_addr: "0.0.0.0:8000"
//! static_files:
//!   root: "./static/"
//!   index: "index.html"
//!   redirect_directories: true
//!   dotfiles: ignore
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_ROOT: &str = "./static/";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

/// How the static file service maps request paths onto the root directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory every served file must live in.
    pub root: PathBuf,
    /// Document served for directory requests. Off when `None`.
    pub index: Option<String>,
    /// Answer `301` with a trailing slash for directory paths missing one.
    pub redirect_directories: bool,
    pub dotfiles: DotfilesPolicy,
}

/// Treatment of path segments starting with `.`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DotfilesPolicy {
    #[default]
    Allow,
    /// Answer 404 as if the file did not exist.
    Ignore,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            index: None,
            redirect_directories: false,
            dotfiles: DotfilesPolicy::Allow,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the process environment.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = match lookup("SHELF_CONFIG") {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {path}"))?;
                Self::from_yaml_str(&raw)
                    .with_context(|| format!("invalid config file {path}"))?
            }
            None => Self::default(),
        };

        if let Some(listen_addr) = lookup("LISTEN") {
            cfg.server.listen_addr = listen_addr;
        }
        if let Some(root) = lookup("STATIC_ROOT") {
            cfg.static_files.root = PathBuf::from(root);
        }

        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}
