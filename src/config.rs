//! Client configuration from the environment

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default word inside the answer-reveal sentinel, `<<domain>>:answer`
pub const DEFAULT_ANSWER_DOMAIN: &str = "turtle-soup";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PUZZLE_API_BASE_URL is not set")]
    MissingBaseUrl,
    #[error("Invalid PUZZLE_REQUEST_TIMEOUT_SECS: {0}")]
    InvalidTimeout(String),
}

/// Configuration for the puzzle client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL the `/history` and `/chat` paths are appended to
    pub api_base_url: String,
    /// Where the session token is persisted
    pub session_path: PathBuf,
    /// Where JSON logs are written (the terminal belongs to the UI)
    pub log_path: PathBuf,
    pub answer_domain: String,
    /// `None` means requests may take as long as the server does
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup("PUZZLE_API_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let data_dir = PathBuf::from(lookup("HOME").unwrap_or_else(|| "/tmp".to_string()))
            .join(".puzzle-chat");

        let session_path = lookup("PUZZLE_SESSION_PATH")
            .map_or_else(|| data_dir.join("session.json"), PathBuf::from);
        let log_path = lookup("PUZZLE_LOG_PATH")
            .map_or_else(|| data_dir.join("client.log"), PathBuf::from);

        let answer_domain = lookup("PUZZLE_ANSWER_DOMAIN")
            .filter(|domain| !domain.is_empty())
            .unwrap_or_else(|| DEFAULT_ANSWER_DOMAIN.to_string());

        let request_timeout = match lookup("PUZZLE_REQUEST_TIMEOUT_SECS") {
            None => None,
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
        };

        Ok(Self {
            api_base_url: api_base_url.trim().to_string(),
            session_path,
            log_path,
            answer_domain,
            request_timeout,
        })
    }

    /// Minimal configuration pointing at `base`, for tests
    #[cfg(test)]
    pub fn for_base_url(base: &str) -> Self {
        Self {
            api_base_url: base.to_string(),
            session_path: PathBuf::from("/tmp/puzzle-chat-test/session.json"),
            log_path: PathBuf::from("/tmp/puzzle-chat-test/client.log"),
            answer_domain: DEFAULT_ANSWER_DOMAIN.to_string(),
            request_timeout: None,
        }
    }
}
