//! Error taxonomy for update runs.
//!
//! Every fatal failure of a run is an [`EngineError`]. Its [`ErrorCode`] is
//! what ends up as `error_type` in the error record.

use crate::api::ApiError;
use crate::discovery::DiscoveryError;
use crate::formats::FormatError;
use crate::guard::ReservedConfigurationError;
use crate::merge::InvalidStrategy;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ErrorCode {
    // Input errors
    ParseError,
    MissingPhraseColumn,
    UnsupportedStructure,
    PathNotFound,
    NoFilesFound,

    // Pre-flight
    ReservedConfigurationError,
    InvalidStrategy,
    ConfigError,

    // Remote
    FetchError,
    UpdateError,

    // Local side effects
    BackupError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "ParseError",
            ErrorCode::MissingPhraseColumn => "MissingPhraseColumn",
            ErrorCode::UnsupportedStructure => "UnsupportedStructure",
            ErrorCode::PathNotFound => "PathNotFound",
            ErrorCode::NoFilesFound => "NoFilesFound",
            ErrorCode::ReservedConfigurationError => "ReservedConfigurationError",
            ErrorCode::InvalidStrategy => "InvalidStrategy",
            ErrorCode::ConfigError => "ConfigError",
            ErrorCode::FetchError => "FetchError",
            ErrorCode::UpdateError => "UpdateError",
            ErrorCode::BackupError => "BackupError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal error that aborted a run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("no supported glossary files found in the given paths")]
    NoFilesFound,

    #[error(transparent)]
    Reserved(#[from] ReservedConfigurationError),

    #[error(transparent)]
    InvalidStrategy(#[from] InvalidStrategy),

    #[error("failed to fetch configuration {config_id}: {source}")]
    Fetch {
        config_id: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to update configuration {config_id}: {source}")]
    Update {
        config_id: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to write backup {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Format(e) => match e {
                FormatError::MissingPhraseColumn { .. } => ErrorCode::MissingPhraseColumn,
                FormatError::UnsupportedStructure { .. } => ErrorCode::UnsupportedStructure,
                FormatError::Io { .. }
                | FormatError::Encoding { .. }
                | FormatError::Syntax { .. } => ErrorCode::ParseError,
            },
            EngineError::Discovery(_) => ErrorCode::PathNotFound,
            EngineError::NoFilesFound => ErrorCode::NoFilesFound,
            EngineError::Reserved(_) => ErrorCode::ReservedConfigurationError,
            EngineError::InvalidStrategy(_) => ErrorCode::InvalidStrategy,
            EngineError::Fetch { .. } => ErrorCode::FetchError,
            EngineError::Update { .. } => ErrorCode::UpdateError,
            EngineError::Backup { .. } => ErrorCode::BackupError,
            EngineError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// HTTP status reported by the remote, for fetch and update failures.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            EngineError::Fetch { source, .. } | EngineError::Update { source, .. } => {
                source.status()
            }
            _ => None,
        }
    }
}
