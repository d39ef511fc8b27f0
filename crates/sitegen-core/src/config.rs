//! Client configuration
//!
//! Resolution order (later wins): built-in defaults, `config.toml` in the
//! sitegen config directory, `SITEGEN_*` environment variables, explicit
//! overrides from the command line.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const CONFIG_FILE: &str = "config.toml";

pub const ENV_API_URL: &str = "SITEGEN_API_URL";
pub const ENV_AUTH_URL: &str = "SITEGEN_AUTH_URL";
pub const ENV_REFRESH_SECS: &str = "SITEGEN_REFRESH_SECS";

/// Generation regularly takes 20-40s; leave generous headroom
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_REFRESH_SECS: u64 = 35;

/// Resolved client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the generation API (analyze, generate, website)
    pub api_url: String,
    /// Base URL of the auth server (sign-in, balance, purchase)
    pub auth_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Background balance refresh interval while a gated screen is open
    pub balance_refresh_interval: Duration,
    /// Where downloaded websites are written
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BACKEND_URL.to_string(),
            auth_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            balance_refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            download_dir: PathBuf::from("."),
        }
    }
}

/// On-disk shape of `config.toml`; every field optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub auth_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub balance_refresh_secs: Option<u64>,
    pub download_dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Load `<dir>/config.toml`. A missing file yields defaults.
    pub fn load(dir: &Path) -> Result<Self, CoreError> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| CoreError::InvalidConfig {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| CoreError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })
    }
}

/// Explicit overrides (command-line flags)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub auth_url: Option<String>,
    pub download_dir: Option<PathBuf>,
}

impl Config {
    /// Default config directory: `<config_dir>/sitegen`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sitegen"))
    }

    /// Resolve configuration from file, environment and overrides
    pub fn load(config_dir: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, CoreError> {
        let file = match config_dir {
            Some(dir) => ConfigFile::load(dir)?,
            None => ConfigFile::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Pure resolution step, environment injected for testability
    pub fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: ConfigOverrides,
    ) -> Result<Self, CoreError> {
        let mut config = Config::default();

        if let Some(url) = file.api_url {
            config.api_url = url;
        }
        if let Some(url) = file.auth_url {
            config.auth_url = url;
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = file.balance_refresh_secs {
            config.balance_refresh_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(dir) = file.download_dir {
            config.download_dir = dir;
        }

        if let Some(url) = env(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(url) = env(ENV_AUTH_URL) {
            config.auth_url = url;
        }
        if let Some(raw) = env(ENV_REFRESH_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.balance_refresh_interval = Duration::from_secs(secs.max(1)),
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_REFRESH_SECS),
            }
        }

        if let Some(url) = overrides.api_url {
            config.api_url = url;
        }
        if let Some(url) = overrides.auth_url {
            config.auth_url = url;
        }
        if let Some(dir) = overrides.download_dir {
            config.download_dir = dir;
        }

        config.api_url = normalize_base_url(&config.api_url)?;
        config.auth_url = normalize_base_url(&config.auth_url)?;

        Ok(config)
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme and host
pub fn normalize_base_url(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(CoreError::InvalidConfig {
            message: "base url must not be empty".to_string(),
        });
    }

    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(CoreError::InvalidConfig {
            message: format!("base url must use http:// or https:// and include a host: {}", raw),
        }),
    }
}
