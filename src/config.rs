//! Configuration management for the ExpoCLI kernel.
//!
//! Handles loading configuration from a TOML file and environment variables.
//! Precedence (highest first): CLI flags, environment, config file, defaults.

use crate::error::{KernelError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit executable path.
pub const ENV_EXECUTABLE: &str = "EXPOCLI_PATH";

/// Environment variable overriding the query timeout in seconds.
pub const ENV_TIMEOUT: &str = "EXPOCLI_TIMEOUT";

/// Bare command name used when discovery finds nothing.
pub const DEFAULT_COMMAND: &str = "expocli";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// How to find and run the external query tool.
    #[serde(default)]
    pub executable: ExecutableConfig,

    /// Kernel behaviour settings.
    #[serde(default)]
    pub kernel: KernelConfig,
}

/// External executable settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutableConfig {
    /// Explicit executable path. Skips discovery when set.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Ordered discovery candidates. A leading `~/` expands to the home directory.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Timeout for each `--version` discovery probe.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Wall-clock limit for a single query.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Case-insensitive marker that identifies the tool in probe output.
    #[serde(default = "default_marker")]
    pub marker: String,
}

fn default_candidates() -> Vec<String> {
    vec![
        "/usr/local/bin/expocli".to_string(),
        "/usr/bin/expocli".to_string(),
        DEFAULT_COMMAND.to_string(),
        "~/.local/bin/expocli".to_string(),
    ]
}

fn default_probe_timeout_secs() -> u64 {
    2
}

fn default_query_timeout_secs() -> u64 {
    30
}

fn default_marker() -> String {
    DEFAULT_COMMAND.to_string()
}

impl Default for ExecutableConfig {
    fn default() -> Self {
        Self {
            path: None,
            candidates: default_candidates(),
            probe_timeout_secs: default_probe_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
            marker: default_marker(),
        }
    }
}

impl ExecutableConfig {
    /// Returns the query timeout as a Duration.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Returns the probe timeout as a Duration.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Returns the candidate list with `~/` expanded.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        self.candidates.iter().map(|c| expand_home(c)).collect()
    }
}

/// Kernel behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KernelConfig {
    /// Input prefix reserved for magic commands.
    #[serde(default = "default_magic_prefix")]
    pub magic_prefix: String,
}

fn default_magic_prefix() -> String {
    "%".to_string()
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            magic_prefix: default_magic_prefix(),
        }
    }
}

/// Expands a leading `~/` to the user's home directory.
fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("expocli-kernel")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| KernelError::config(format!("Failed to read config file: {e}")))?;

        let config = Self::parse_toml(&content, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            KernelError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies `EXPOCLI_PATH` and `EXPOCLI_TIMEOUT` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_EXECUTABLE).filter(|p| !p.trim().is_empty()) {
            self.executable.path = Some(PathBuf::from(path.trim()));
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                KernelError::config(format!(
                    "{ENV_TIMEOUT} must be a number of seconds, got '{raw}'"
                ))
            })?;
            self.executable.query_timeout_secs = secs;
        }

        self.validate()
    }

    /// Checks invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.executable.query_timeout_secs == 0 {
            return Err(KernelError::config("query_timeout_secs must be positive"));
        }
        if self.executable.probe_timeout_secs == 0 {
            return Err(KernelError::config("probe_timeout_secs must be positive"));
        }
        if self.kernel.magic_prefix.is_empty() {
            return Err(KernelError::config("magic_prefix must not be empty"));
        }
        Ok(())
    }
}
