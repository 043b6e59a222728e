use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Forum root URL; the user actions endpoint is `user_actions.json` under it.
    pub base_url: Url,
    /// File holding the forum cookie string.
    pub cookie_file: PathBuf,
    /// Directory report artifacts are written to.
    pub output_dir: PathBuf,
    /// Records per page of the user actions endpoint.
    pub page_size: u32,
    pub request_timeout: Duration,
    /// Total attempts per request, transient-status retries included.
    pub retry_max_attempts: u32,
    /// Base delay for exponential retry backoff.
    pub retry_backoff: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(&env_or_default(
                "EMOJI_STATS_BASE_URL",
                "https://shuiyuan.sjtu.edu.cn/",
            ))?,
            cookie_file: PathBuf::from(env_or_default("COOKIE_FILE", "./cookies.txt")),
            output_dir: PathBuf::from(env_or_default("OUTPUT_DIR", "./emoji_stats_output")),
            page_size: parse_env_u32("PAGE_SIZE", 30)?,
            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),
            retry_max_attempts: parse_env_u32("RETRY_MAX_ATTEMPTS", 3)?,
            retry_backoff: Duration::from_millis(parse_env_u64("RETRY_BACKOFF_MS", 500)?),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PAGE_SIZE".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "RETRY_MAX_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration for tests: localhost endpoint, short timeouts, one retry.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            base_url: Url::parse("http://localhost/").expect("valid test URL"),
            cookie_file: PathBuf::from("./cookies.txt"),
            output_dir: PathBuf::from("./emoji_stats_output"),
            page_size: 30,
            request_timeout: Duration::from_secs(5),
            retry_max_attempts: 1,
            retry_backoff: Duration::from_millis(10),
        }
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    // A trailing slash is required for Url::join to treat the root as a
    // directory rather than a file.
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    Url::parse(&normalized).map_err(|e| ConfigError::InvalidValue {
        name: "EMOJI_STATS_BASE_URL".to_string(),
        message: e.to_string(),
    })
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
