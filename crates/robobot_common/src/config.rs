//! Configuration for robobotd.
//!
//! Loaded from a TOML file (`$ROBOBOT_CONFIG`, else `./robobot.toml`) when one
//! exists, then overridden by environment variables. Every field has a default.

use crate::conversation_log::DEFAULT_LOG_FILE;
use crate::error::{ChatError, Result};
use crate::knowledge::DEFAULT_KB_FILE;
use crate::matcher::{MatchOptions, DEFAULT_CUTOFF, DEFAULT_TOP_N};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Config file used when `$ROBOBOT_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "robobot.toml";

pub const ENV_CONFIG_PATH: &str = "ROBOBOT_CONFIG";
pub const ENV_USE_MOCK: &str = "USE_MOCK";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_KB_FILE: &str = "ROBOBOT_KB_FILE";
pub const ENV_LOG_FILE: &str = "ROBOBOT_LOG_FILE";
pub const ENV_BIND: &str = "ROBOBOT_BIND";

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Knowledge base and conversation log locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_kb_file")]
    pub kb_file: PathBuf,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_kb_file() -> PathBuf {
    PathBuf::from(DEFAULT_KB_FILE)
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kb_file: default_kb_file(),
            log_file: default_log_file(),
        }
    }
}

/// Reply mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Heuristic replies only (no external provider)
    #[serde(default = "default_use_mock")]
    pub use_mock: bool,

    /// Provider credential used when a request carries none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_use_mock() -> bool {
    true
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            use_mock: default_use_mock(),
            api_key: None,
        }
    }
}

/// Knowledge-base lookup tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_cutoff() -> f64 {
    DEFAULT_CUTOFF
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            cutoff: default_cutoff(),
        }
    }
}

impl MatcherConfig {
    pub fn options(&self) -> Result<MatchOptions> {
        MatchOptions::new(self.top_n, self.cutoff)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub mode: ModeConfig,

    #[serde(default)]
    pub matcher: MatcherConfig,
}

/// `1`, `true` and `yes` (any case) are true; anything else is false
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

impl ChatConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `env` as the variable lookup
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let explicit = env(ENV_CONFIG_PATH);
        let path = explicit
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            Self::load_from_path(&path)?
        } else if explicit.is_some() {
            return Err(ChatError::Config(format!(
                "config file {} not found",
                path.display()
            )));
        } else {
            info!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env(env);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ChatConfig = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env(ENV_USE_MOCK) {
            self.mode.use_mock = parse_flag(&v);
        }
        if let Some(v) = env(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.mode.api_key = Some(v);
        }
        if let Some(v) = env(ENV_KB_FILE) {
            self.storage.kb_file = PathBuf::from(v);
        }
        if let Some(v) = env(ENV_LOG_FILE) {
            self.storage.log_file = PathBuf::from(v);
        }
        if let Some(v) = env(ENV_BIND) {
            self.server.bind = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.matcher.options()?;
        if self.server.bind.trim().is_empty() {
            return Err(ChatError::Config("server.bind is empty".to_string()));
        }
        Ok(())
    }
}
