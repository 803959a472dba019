//! Configuration for the geocoder client
//!
//! Built from the `[geocoder]` section of the configuration file, with
//! environment overrides on top.

use crate::error::{GeocoderError, GeocoderResult};
use nextfinish_core::config::GeocoderSettings;
use nextfinish_core::rate_limit::RateLimitConfig;
use nextfinish_core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Overrides `base_url`
pub const ENV_GEOCODER_URL: &str = "NEXTFINISH_GEOCODER_URL";

/// Overrides `user_agent`
pub const ENV_USER_AGENT: &str = "NEXTFINISH_USER_AGENT";

/// Overrides `timeout` (whole seconds)
pub const ENV_TIMEOUT_SECS: &str = "NEXTFINISH_GEOCODER_TIMEOUT_SECS";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim-compatible service
    pub base_url: String,
    /// Application identifier sent as `User-Agent`
    pub user_agent: String,
    /// Value of the `accept-language` query parameter
    pub language: String,
    /// Per-request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Rate limit configuration, applied per host
    pub rate_limit: RateLimitConfig,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self::from_settings(&GeocoderSettings::default())
    }
}

impl GeocoderConfig {
    /// Create configuration from the `[geocoder]` file section
    ///
    /// Interactive resolution never retries, so the retry policy starts as
    /// [`RetryConfig::none`].
    #[must_use]
    pub fn from_settings(settings: &GeocoderSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            user_agent: settings.user_agent.clone(),
            language: settings.language.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            retry: RetryConfig::none(),
            rate_limit: RateLimitConfig::per_second(settings.requests_per_second),
        }
    }

    /// Create configuration from defaults plus environment variables
    ///
    /// Reads the following environment variables:
    /// - `NEXTFINISH_GEOCODER_URL`: Base URL of the geocoder
    /// - `NEXTFINISH_USER_AGENT`: Application identifier
    /// - `NEXTFINISH_GEOCODER_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> GeocoderResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this configuration
    pub fn with_env_overrides(mut self) -> GeocoderResult<Self> {
        if let Ok(url) = env::var(ENV_GEOCODER_URL) {
            self.base_url = url;
        }
        if let Ok(agent) = env::var(ENV_USER_AGENT) {
            self.user_agent = agent;
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| GeocoderError::config(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got '{raw}'")))?;
            self.timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set the application identifier
    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Builder-style method to set the result language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to set rate limit config
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> GeocoderResult<()> {
        if self.base_url.is_empty() {
            return Err(GeocoderError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(GeocoderError::config("base_url must start with http:// or https://"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(GeocoderError::config("user_agent cannot be empty"));
        }

        if self.timeout.is_zero() {
            return Err(GeocoderError::config("timeout cannot be zero"));
        }

        if self.rate_limit.max_requests == 0 {
            return Err(GeocoderError::config("rate limit must allow at least one request"));
        }

        if self.retry.max_attempts == 0 {
            return Err(GeocoderError::config("retry policy needs at least one attempt"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeocoderConfig::default();
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.user_agent, "nextfinish-app/1.0");
        assert_eq!(config.language, "de");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.rate_limit.max_requests, 1);
    }

    #[test]
    fn test_from_settings() {
        let settings = GeocoderSettings {
            base_url: "http://localhost:8080".to_string(),
            requests_per_second: 5,
            timeout_secs: 3,
            ..GeocoderSettings::default()
        };
        let config = GeocoderConfig::from_settings(&settings);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_builder_pattern() {
        let config = GeocoderConfig::default()
            .with_base_url("https://geocode.example.org")
            .with_user_agent("nextfinish-tests/0.1")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.base_url, "https://geocode.example.org");
        assert_eq!(config.user_agent, "nextfinish-tests/0.1");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_validation() {
        assert!(GeocoderConfig::default().validate().is_ok());
        assert!(GeocoderConfig::default().with_base_url("").validate().is_err());
        assert!(GeocoderConfig::default().with_base_url("ftp://x").validate().is_err());
        assert!(GeocoderConfig::default().with_user_agent(" ").validate().is_err());
        assert!(GeocoderConfig::default().with_timeout(Duration::ZERO).validate().is_err());
        assert!(GeocoderConfig::default()
            .with_rate_limit(RateLimitConfig::per_second(0))
            .validate()
            .is_err());
    }
}
