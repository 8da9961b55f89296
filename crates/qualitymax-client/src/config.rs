//! Static client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ExecutionError, ExecutionResult};

/// Default service base URL.
pub const DEFAULT_API_URL: &str = "https://app.qualitymax.ai/api";

/// Fixed delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Execution client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for the API (no trailing slash needed).
    #[serde(default = "default_api_url")]
    pub url: String,

    /// API key sent as `X-API-Key` on every request.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Per-request transport timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Delay between status polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `QUALITYMAX_API_URL` | API base URL |
    /// | `QUALITYMAX_API_KEY` | API key |
    /// | `QUALITYMAX_REQUEST_TIMEOUT` | Request timeout in seconds (default: 30) |
    /// | `QUALITYMAX_POLL_INTERVAL_MS` | Poll interval in milliseconds (default: 5000) |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            url: non_empty("QUALITYMAX_API_URL").unwrap_or_else(default_api_url),
            api_key: non_empty("QUALITYMAX_API_KEY").unwrap_or_default(),
            timeout_secs: non_empty("QUALITYMAX_REQUEST_TIMEOUT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or_else(default_timeout),
            poll_interval_ms: non_empty("QUALITYMAX_POLL_INTERVAL_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or_else(default_poll_interval_ms),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Reject configurations that cannot produce a working client.
    pub fn validate(&self) -> ExecutionResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ExecutionError::Config {
                message: "API key is required".to_string(),
            });
        }

        let parsed = url::Url::parse(self.base_url()).map_err(|e| ExecutionError::Config {
            message: format!("invalid API URL {:?}: {}", self.url, e),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ExecutionError::Config {
                message: format!("unsupported API URL scheme: {}", parsed.scheme()),
            });
        }

        if self.poll_interval_ms == 0 {
            return Err(ExecutionError::Config {
                message: "poll interval must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config.url, "https://app.qualitymax.ai/api");
        assert!(config.api_key.is_empty());
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("QUALITYMAX_API_URL", "http://localhost:8000/api/"),
            ("QUALITYMAX_API_KEY", "qm_test"),
            ("QUALITYMAX_POLL_INTERVAL_MS", "250"),
            ("QUALITYMAX_REQUEST_TIMEOUT", "not-a-number"),
        ]));
        assert_eq!(config.base_url(), "http://localhost:8000/api");
        assert_eq!(config.api_key, "qm_test");
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::default()
            .with_url("https://staging.qualitymax.ai/api")
            .with_api_key("qm_key")
            .with_poll_interval(Duration::from_millis(10));

        assert_eq!(config.url, "https://staging.qualitymax.ai/api");
        assert_eq!(config.api_key, "qm_key");
        assert_eq!(config.poll_interval_ms, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_key_and_bad_url() {
        let err = ClientConfig::default().validate().unwrap_err();
        assert!(matches!(err, ExecutionError::Config { .. }));

        let err = ClientConfig::default()
            .with_api_key("qm_key")
            .with_url("ftp://example.com")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("scheme"));

        let err = ClientConfig::default()
            .with_api_key("qm_key")
            .with_url("not a url")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("invalid API URL"));
    }

    #[test]
    fn test_api_key_never_serialized() {
        let config = ClientConfig::default().with_api_key("qm_secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("qm_secret"));
    }
}
