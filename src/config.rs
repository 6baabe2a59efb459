//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Search client configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base URL of the tour backend.
    pub base_url: String,
    /// Retries after the first failed poll attempt.
    pub poll_retries: u32,
    /// HTTP request timeout.
    pub request_timeout: Duration,
    /// Capacity of the flow event channel.
    pub event_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            poll_retries: 2,
            request_timeout: Duration::from_secs(30),
            event_capacity: 16,
        }
    }
}

impl SearchConfig {
    /// Build a config from the environment. `TOUR_API_BASE_URL` is required;
    /// `TOUR_POLL_RETRIES` and `TOUR_REQUEST_TIMEOUT_SECS` override defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("TOUR_API_BASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("TOUR_API_BASE_URL".to_string()))?;

        let mut config = Self {
            base_url,
            ..Self::default()
        };

        if let Ok(raw) = std::env::var("TOUR_POLL_RETRIES") {
            config.poll_retries = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TOUR_POLL_RETRIES".to_string(),
                message: format!("expected a number, got {raw:?}"),
            })?;
        }

        if let Ok(raw) = std::env::var("TOUR_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TOUR_REQUEST_TIMEOUT_SECS".to_string(),
                message: format!("expected a number of seconds, got {raw:?}"),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
