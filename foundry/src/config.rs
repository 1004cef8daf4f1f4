//! Configuration loading

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ResponseOrdering;

/// Name of the config file searched for on disk
pub const CONFIG_FILE: &str = ".foundry.toml";

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. `start` and its parent directories (walking up to root)
/// 2. Global config at ~/.config/foundry/
///
/// Returns the path if found, None otherwise.
fn find_config_file(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("foundry").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

// ============================================================================
// Foundry Configuration (.foundry.toml)
// ============================================================================

/// Top-level configuration (from .foundry.toml)
#[derive(Debug, Default, Deserialize)]
pub struct FoundryFileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Workflow server section
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,
    /// What to do with responses that resolve out of order
    #[serde(default)]
    pub ordering: ResponseOrdering,
    /// Request timeout in seconds; 0 waits indefinitely
    #[serde(default)]
    pub timeout_secs: u64,
}

/// Terminal rendering section
#[derive(Debug, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub colors: bool,
}

// Default value functions
fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            ordering: ResponseOrdering::default(),
            timeout_secs: 0,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            colors: default_true(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl FoundryFileConfig {
    /// Load config from .foundry.toml
    ///
    /// Search order:
    /// 1. Walk up directory tree from cwd looking for .foundry.toml
    /// 2. Check ~/.config/foundry/.foundry.toml (global fallback)
    /// 3. Fall back to defaults
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::load_from_dir(&cwd)
    }

    /// Same as [`load`](Self::load), starting the search at `dir`
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        if let Some(config_path) = find_config_file(dir, CONFIG_FILE) {
            tracing::debug!("Loading config from: {}", config_path.display());
            return Self::load_from_path(&config_path);
        }

        tracing::debug!("No {} found, using defaults", CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FoundryFileConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
