//! HTTP implementation of [`ConfigurationApi`].

use super::{ApiError, AuthToken, ConfigurationApi};
use crate::config::ApiConfig;
use crate::remote::RemoteConfiguration;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

const LOGIN_PATH: &str = "/token/qts/login";
const CONFIGURATION_PATH: &str = "/analysis/v2/configuration";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    token: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Client for the configuration service REST API.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    max_retries: u32,
    retry_base: Duration,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let required = |value: &Option<String>, name: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .ok_or_else(|| ApiError::Config(format!("{name} is not set")))
        };
        let domain = required(&config.domain, "API domain")?;
        let username = required(&config.username, "API username")?;
        let password = config
            .password
            .clone()
            .ok_or_else(|| ApiError::Config("API password is not set".to_string()))?;

        if !config.ssl_verify {
            warn!("TLS certificate verification disabled");
        }
        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url(&domain),
            username,
            password,
            max_retries: config.max_retries,
            retry_base: Duration::from_secs(1),
        })
    }

    /// Override the first retry delay; later retries double it.
    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request, retrying server errors and transport failures.
    ///
    /// Returns the body of the first successful response.
    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&AuthToken>,
        body: Option<&Value>,
        subject: &str,
    ) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;
        loop {
            debug!(%method, %url, attempt = attempt + 1, "Sending request");
            let mut request = self.client.request(method.clone(), &url);
            if let Some(token) = token {
                request = request.bearer_auth(token.as_str());
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let retry_reason = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() && attempt < self.max_retries {
                        format!("server error {status}")
                    } else {
                        let text = response.text().await.map_err(|e| ApiError::Transport {
                            attempts: attempt + 1,
                            reason: format!("failed to read response body: {e}"),
                        })?;
                        if status.is_success() {
                            return Ok(text);
                        }
                        return Err(map_status(status, text, subject));
                    }
                }
                Err(e) if attempt < self.max_retries => e.to_string(),
                Err(e) => {
                    return Err(ApiError::Transport {
                        attempts: attempt + 1,
                        reason: e.to_string(),
                    });
                }
            };

            let delay = self.backoff(attempt);
            warn!(
                %url,
                reason = %retry_reason,
                delay_ms = delay.as_millis() as u64,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[async_trait]
impl ConfigurationApi for HttpApiClient {
    async fn authenticate(&self) -> Result<AuthToken, ApiError> {
        let body = serde_json::to_value(LoginRequest {
            username: &self.username,
            password: &self.password,
            token: "token",
        })
        .map_err(|e| ApiError::Config(e.to_string()))?;

        let text = self
            .send(Method::POST, LOGIN_PATH, None, Some(&body), "login")
            .await
            .map_err(|e| match e {
                ApiError::Auth(_) => ApiError::Auth("invalid username or password".to_string()),
                other => other,
            })?;
        let response: LoginResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("login response: {e}")))?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Auth("no token in authentication response".to_string()))?;

        info!("Authenticated");
        Ok(AuthToken::new(token))
    }

    async fn fetch_configuration(
        &self,
        config_id: &str,
        token: &AuthToken,
    ) -> Result<RemoteConfiguration, ApiError> {
        let path = configuration_path(config_id);
        let subject = format!("configuration {config_id}");
        let text = self.send(Method::GET, &path, Some(token), None, &subject).await?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{subject}: {e}")))?;
        let config = RemoteConfiguration::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("{subject}: {e}")))?;
        info!(config_id, "Retrieved configuration");
        Ok(config)
    }

    async fn update_configuration(
        &self,
        config_id: &str,
        config: &RemoteConfiguration,
        token: &AuthToken,
    ) -> Result<(), ApiError> {
        let path = configuration_path(config_id);
        let subject = format!("configuration {config_id}");
        let body = config.as_value();
        self.send(Method::PUT, &path, Some(token), Some(&body), &subject)
            .await?;
        info!(config_id, "Updated configuration");
        Ok(())
    }

    async fn test_connection(&self, token: &AuthToken) -> Result<(), ApiError> {
        self.send(
            Method::GET,
            CONFIGURATION_PATH,
            Some(token),
            None,
            "configuration listing",
        )
        .await?;
        info!("Connection test successful");
        Ok(())
    }
}

/// Endpoint for one configuration. The ID is a single path segment.
fn configuration_path(config_id: &str) -> String {
    format!("{CONFIGURATION_PATH}/{}", urlencoding::encode(config_id))
}

/// Prefix `https://` when the domain has no scheme; drop trailing slashes.
fn base_url(domain: &str) -> String {
    let domain = domain.trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

fn map_status(status: StatusCode, body: String, subject: &str) -> ApiError {
    match status.as_u16() {
        401 => ApiError::Auth(format!("unauthorized for {subject}")),
        403 => ApiError::Forbidden(format!("access denied to {subject}")),
        404 => ApiError::NotFound(subject.to_string()),
        400 | 422 => ApiError::Rejected {
            status: status.as_u16(),
            body,
        },
        code => ApiError::Status { status: code, body },
    }
}
