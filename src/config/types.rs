//! Configuration types and structures.

use crate::guard::{BUILTIN_RESERVED_IDS, ReservedIdGuard};
use crate::report::OutputFormat;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retries after a failed request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Connection settings for the configuration API.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API host, with or without scheme (`https://` is assumed).
    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts on server errors and transport failures (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Verify TLS certificates (default: false, for self-signed deployments).
    #[serde(default)]
    pub ssl_verify: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            domain: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            ssl_verify: false,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("ssl_verify", &self.ssl_verify)
            .finish()
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that everything needed to reach the API is present.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if is_blank(&self.domain) {
            missing.push("domain (API_DOMAIN or --domain)");
        }
        if is_blank(&self.username) {
            missing.push("username (API_USERNAME or --username)");
        }
        if is_blank(&self.password) {
            missing.push("password (API_PASSWORD or --password)");
        }
        if !missing.is_empty() {
            bail!("Missing API settings: {}", missing.join(", "));
        }
        if self.timeout_secs == 0 {
            bail!("API timeout must be at least 1 second");
        }
        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Report output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Result record format: json (default) or markdown.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Pre-update backup settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Directory for configuration backups. No backup is taken when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    /// Configuration IDs that must never be modified.
    ///
    /// The built-in IDs are always enforced; entries here add to them.
    #[serde(default = "default_reserved_ids")]
    pub reserved_config_ids: Vec<String>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub backup: BackupConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            reserved_config_ids: default_reserved_ids(),
            output: OutputConfig::default(),
            backup: BackupConfig::default(),
        }
    }
}

fn default_reserved_ids() -> Vec<String> {
    BUILTIN_RESERVED_IDS.iter().map(|id| id.to_string()).collect()
}

impl AppConfig {
    /// Load configuration from a single YAML file.
    ///
    /// An empty or comment-only file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Option<AppConfig> = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config.unwrap_or_default())
    }

    /// Deny-list guard for this configuration.
    pub fn reserved_guard(&self) -> ReservedIdGuard {
        ReservedIdGuard::with_builtin(self.reserved_config_ids.iter().cloned())
    }
}
