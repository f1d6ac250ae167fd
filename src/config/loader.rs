//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::AppConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Explicit config file; replaces the project and user tiers.
pub const ENV_CONFIG_PATH: &str = "GLOSSARY_UPDATER_CONFIG_PATH";
pub const ENV_PROJECT_DIR: &str = "GLOSSARY_UPDATER_PROJECT_DIR";
pub const ENV_USER_DIR: &str = "GLOSSARY_UPDATER_USER_DIR";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    /// `./glossary-updater/config.yaml`, or an explicit file
    Project = 1,
    /// `~/.glossary-updater/config.yaml`
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where each tier is read from.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
    /// When set, this file is the only file tier.
    pub explicit_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from the environment and defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var(ENV_USER_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".glossary-updater")));

        let project_dir = std::env::var(ENV_PROJECT_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("glossary-updater")));

        Self {
            project_dir,
            user_dir,
            explicit_file: std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from),
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
            explicit_file: None,
        }
    }

    /// Use a single config file instead of the project and user tiers.
    pub fn with_explicit_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(file.into());
        self
    }

    /// Config files to read, lowest tier first.
    fn files(&self) -> Vec<(ConfigTier, PathBuf)> {
        if let Some(ref file) = self.explicit_file {
            return vec![(ConfigTier::Project, file.clone())];
        }
        let mut files = Vec::new();
        if let Some(ref dir) = self.project_dir {
            files.push((ConfigTier::Project, dir.join(CONFIG_FILE)));
        }
        if let Some(ref dir) = self.user_dir {
            files.push((ConfigTier::User, dir.join(CONFIG_FILE)));
        }
        files
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: AppConfig,
    /// Config files that contributed, lowest tier first
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers, reading overrides from the process
    /// environment.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load configuration with explicit paths and an environment lookup.
    pub fn load_with_env<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut tiers: Vec<Value> = vec![serde_json::to_value(AppConfig::default())?];
        let mut sources = Vec::new();

        for (tier, file) in paths.files() {
            let explicit = paths.explicit_file.is_some();
            if !file.exists() {
                if explicit {
                    anyhow::bail!("Config file not found: {}", file.display());
                }
                continue;
            }
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read config file {}", file.display()))?;
            let value: Value = serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid {tier} config file {}", file.display()))?;
            debug!(%tier, path = %file.display(), "Loaded config tier");
            tiers.push(value);
            sources.push(file);
        }

        let merged = deep_merge_all(tiers);
        let mut config: AppConfig =
            serde_json::from_value(merged).context("Invalid configuration values")?;

        Self::apply_env_overrides(&mut config, env);

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides<F>(config: &mut AppConfig, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = env("API_DOMAIN") {
            config.api.domain = Some(domain);
        }
        if let Some(username) = env("API_USERNAME") {
            config.api.username = Some(username);
        }
        if let Some(password) = env("API_PASSWORD") {
            config.api.password = Some(password);
        }
        if let Some(verify) = env("SSL_VERIFY") {
            config.api.ssl_verify = parse_flag(&verify);
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn user_dir(&self) -> Option<&Path> {
        self.paths.user_dir.as_deref()
    }
}

/// `true|1|yes|on`, case-insensitive; anything else is false.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();
        assert_eq!(loader.config().api.timeout_secs, 30);
        assert_eq!(loader.config().api.max_retries, 3);
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("glossary-updater");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join("config.yaml"),
            "api:\n  domain: project.example.com\n  timeout_secs: 60\n",
        )
        .unwrap();
        std::fs::write(user_dir.join("config.yaml"), "api:\n  domain: user.example.com\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir));
        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();
        let api = &loader.config().api;

        assert_eq!(api.domain.as_deref(), Some("user.example.com"));
        assert_eq!(api.timeout_secs, 60);
        assert_eq!(api.max_retries, 3);
        assert_eq!(loader.sources().len(), 2);
    }

    #[test]
    fn test_environment_overrides_files() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("glossary-updater");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(
            project_dir.join("config.yaml"),
            "api:\n  domain: file.example.com\n  username: file-user\n",
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("API_DOMAIN", "env.example.com"),
            ("API_PASSWORD", "s3cret"),
            ("SSL_VERIFY", "Yes"),
        ]);
        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader =
            ConfigLoader::load_with_env(paths, |k| env.get(k).map(|v| v.to_string())).unwrap();
        let api = &loader.config().api;

        assert_eq!(api.domain.as_deref(), Some("env.example.com"));
        assert_eq!(api.username.as_deref(), Some("file-user"));
        assert_eq!(api.password.as_deref(), Some("s3cret"));
        assert!(api.ssl_verify);
    }

    #[test]
    fn test_explicit_file_replaces_tiers() {
        let temp = TempDir::new().unwrap();
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&user_dir).unwrap();
        std::fs::write(user_dir.join("config.yaml"), "api:\n  max_retries: 9\n").unwrap();
        let explicit = temp.path().join("custom.yaml");
        std::fs::write(&explicit, "reserved_config_ids: [only-this]\n").unwrap();

        let paths = ConfigPaths::with_dirs(None, Some(user_dir)).with_explicit_file(&explicit);
        let loader = ConfigLoader::load_with_env(paths, no_env).unwrap();

        assert_eq!(loader.config().api.max_retries, 3);
        assert_eq!(loader.config().reserved_config_ids, vec!["only-this"]);
        // Built-in IDs still apply through the guard
        assert_eq!(loader.config().reserved_guard().len(), 5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::default().with_explicit_file(temp.path().join("absent.yaml"));
        assert!(ConfigLoader::load_with_env(paths, no_env).is_err());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("glossary-updater");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "api: [unclosed\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        assert!(ConfigLoader::load_with_env(paths, no_env).is_err());
    }

    #[test]
    fn test_parse_flag() {
        for yes in ["true", "1", "YES", " on "] {
            assert!(parse_flag(yes), "{yes}");
        }
        for no in ["false", "0", "off", "maybe", ""] {
            assert!(!parse_flag(no), "{no}");
        }
    }
}
