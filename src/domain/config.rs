use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default backend address of the local recognition service.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Environment variable that overrides `backend.base_url` for one process.
pub const BACKEND_URL_ENV: &str = "SPEECHDECK_BACKEND_URL";

/// What to do with a poll response that is older than the text already shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    /// Drop responses from a tick older than the last one applied to the field.
    #[default]
    Discard,
    /// Last response wins, whatever tick issued it.
    Apply,
}

/// Backend connection and polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the recognition service.
    pub base_url: String,
    /// Transcript polling period in milliseconds.
    pub poll_interval_ms: u64,
    /// Per-request timeout in milliseconds. None means requests may hang forever.
    pub request_timeout_ms: Option<u64>,
    /// Ordering policy for out-of-order poll responses.
    pub stale_responses: StaleResponsePolicy,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval_ms: 100,
            request_timeout_ms: None,
            stale_responses: StaleResponsePolicy::Discard,
        }
    }
}

impl BackendConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic.
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// Privacy-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// When true, only loopback hosts may be contacted (default: true).
    pub local_only: bool,
    /// Allowed hosts when local_only is false.
    pub allowed_hosts: Vec<String>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            local_only: true,
            allowed_hosts: Self::default_allowed_hosts(),
        }
    }
}

impl PrivacyConfig {
    pub fn default_allowed_hosts() -> Vec<String> {
        vec!["127.0.0.1".to_string(), "localhost".to_string()]
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Enable file logging with rotation.
    pub file_logging: bool,
    /// Maximum number of log files to keep.
    pub max_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
            max_files: 7,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub privacy: PrivacyConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply process-level overrides that are never written back to disk.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend.base_url = url.trim().to_string();
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_backend_contract() {
        let config = AppConfig::new();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.backend.poll_interval(), Duration::from_millis(100));
        assert!(config.backend.request_timeout().is_none());
        assert_eq!(config.backend.stale_responses, StaleResponsePolicy::Discard);
        assert!(config.privacy.local_only);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [backend]
            stale_responses = "apply"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.stale_responses, StaleResponsePolicy::Apply);
        assert_eq!(config.backend.poll_interval_ms, 100);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let backend = BackendConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(backend.poll_interval(), Duration::from_millis(1));
    }
}
