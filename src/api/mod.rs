//! Configuration API collaborator.
//!
//! The engine talks to the remote configuration service only through
//! [`ConfigurationApi`], so tests can swap in an in-memory implementation.
//! [`HttpApiClient`] is the production implementation.

mod client;

pub use client::HttpApiClient;

use crate::remote::RemoteConfiguration;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Bearer token returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Errors from the configuration API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("access forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// 400 and 422: the server refused the payload.
    #[error("request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed after {attempts} attempt(s): {reason}")]
    Transport { attempts: u32, reason: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status behind this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Rejected { status, .. } | ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Operations the engine needs from the remote configuration service.
#[async_trait]
pub trait ConfigurationApi: Send + Sync {
    /// Exchange the configured credentials for a bearer token.
    async fn authenticate(&self) -> Result<AuthToken, ApiError>;

    async fn fetch_configuration(
        &self,
        config_id: &str,
        token: &AuthToken,
    ) -> Result<RemoteConfiguration, ApiError>;

    /// Replace the configuration. The service applies it whole or not at all.
    async fn update_configuration(
        &self,
        config_id: &str,
        config: &RemoteConfiguration,
        token: &AuthToken,
    ) -> Result<(), ApiError>;

    /// Probe the configuration listing with an authenticated request.
    async fn test_connection(&self, token: &AuthToken) -> Result<(), ApiError>;
}
