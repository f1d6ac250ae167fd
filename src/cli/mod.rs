//! CLI command definitions for glossary-updater
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod info;
pub mod update;

use crate::config::AppConfig;
use crate::error::EngineError;
use clap::{Parser, Subcommand};
use info::InfoArgs;
use std::path::PathBuf;
use update::UpdateArgs;

/// Merge glossary terms from CSV, JSON and YAML files into a remote configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API domain (overrides API_DOMAIN and config files)
    #[arg(long, global = true)]
    pub domain: Option<String>,

    /// API username (overrides API_USERNAME)
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// API password (overrides API_PASSWORD)
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Retries on server errors and connection failures (default: 3)
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Configuration file (replaces project and user config files)
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply connection flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(ref domain) = self.domain {
            config.api.domain = Some(domain.clone());
        }
        if let Some(ref username) = self.username {
            config.api.username = Some(username.clone());
        }
        if let Some(ref password) = self.password {
            config.api.password = Some(password.clone());
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_secs = timeout;
        }
        if let Some(max_retries) = self.max_retries {
            config.api.max_retries = max_retries;
        }
    }

    /// Checks that need no network, run before the client is built.
    ///
    /// A reserved update target is reported ahead of missing credentials.
    pub fn preflight(&self, config: &AppConfig) -> Result<(), EngineError> {
        if let Command::Update(ref args) = self.command {
            config.reserved_guard().assert_mutable(&args.config_id)?;
        }
        config
            .api
            .validate()
            .map_err(|e| EngineError::Config(format!("{e:#}")))
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge glossary files into a configuration
    Update(UpdateArgs),

    /// Show the glossary section of a configuration (read-only)
    Info(InfoArgs),

    /// Check that the API is reachable and the credentials work
    Check,
}
