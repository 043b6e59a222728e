//! HTTP transport for the forum API.
//!
//! The client is constructed once per run and passed by reference into the
//! fetcher; there is no process-wide singleton.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;
use url::Url;

use crate::config::Config;
use crate::constants::{REPLIES_FILTER, USER_AGENT};
use crate::models::UserActionsResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed with status {0}")]
    Status(StatusCode),
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Forum API client scoped to one analysis run.
pub struct ApiClient {
    http: reqwest::Client,
    actions_url: Url,
    cookie: Option<String>,
    retry_max_attempts: u32,
    retry_backoff: Duration,
}

impl ApiClient {
    /// Build a client from the run configuration and an optional cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed or the
    /// endpoint URL is invalid.
    pub fn new(config: &Config, cookie: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            actions_url: config.base_url.join("user_actions.json")?,
            cookie,
            retry_max_attempts: config.retry_max_attempts.max(1),
            retry_backoff: config.retry_backoff,
        })
    }

    /// Fetch one page of a user's reply actions.
    ///
    /// Transient statuses (429 and the 5xx gateway family) are retried with
    /// exponential backoff up to the configured attempt cap; everything else
    /// fails immediately.
    ///
    /// # Errors
    ///
    /// Returns the final error once retries are exhausted, with a remediation
    /// hint logged.
    pub async fn get_user_actions(
        &self,
        username: &str,
        offset: u32,
    ) -> Result<UserActionsResponse, ClientError> {
        let mut attempt = 1u32;
        loop {
            match self.get_once(username, offset).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry_max_attempts && is_retryable(&e) => {
                    let delay = self.retry_backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        %username,
                        offset,
                        attempt,
                        "Transient API failure, retrying in {delay:?}: {e}"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    log_remediation(&e);
                    return Err(e);
                }
            }
        }
    }

    async fn get_once(
        &self,
        username: &str,
        offset: u32,
    ) -> Result<UserActionsResponse, ClientError> {
        let mut request = self.http.get(self.actions_url.clone()).query(&[
            ("username", username.to_string()),
            ("filter", REPLIES_FILTER.to_string()),
            ("offset", offset.to_string()),
        ]);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        Ok(response.json().await?)
    }
}

fn is_retryable(error: &ClientError) -> bool {
    match error {
        ClientError::Status(status) => matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504),
        ClientError::Transport(_) | ClientError::InvalidUrl(_) => false,
    }
}

fn log_remediation(error: &ClientError) {
    match error {
        ClientError::Transport(e) if e.is_timeout() => {
            warn!("Request timed out - check your network connection and retry later");
        }
        ClientError::Transport(e) if e.is_connect() => {
            warn!("Connection failed - check your network, or disable any proxy or VPN");
        }
        ClientError::Transport(_) => warn!("Request failed - check your network connection"),
        ClientError::Status(status) => warn!(%status, "Forum API refused the request"),
        ClientError::InvalidUrl(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        for code in [429u16, 500, 502, 503, 504] {
            let error = ClientError::Status(StatusCode::from_u16(code).unwrap());
            assert!(is_retryable(&error), "{code} should be retryable");
        }
        for code in [400u16, 401, 403, 404, 410] {
            let error = ClientError::Status(StatusCode::from_u16(code).unwrap());
            assert!(!is_retryable(&error), "{code} should not be retryable");
        }
    }

    #[test]
    fn test_client_builds_endpoint_from_base() {
        let config = Config::for_testing();
        let client = ApiClient::new(&config, None).unwrap();
        assert_eq!(client.actions_url.as_str(), "http://localhost/user_actions.json");
    }
}
