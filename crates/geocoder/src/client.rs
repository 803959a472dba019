//! HTTP client for Nominatim-compatible geocoders

use crate::config::GeocoderConfig;
use crate::endpoints::{SearchApi, StatusApi};
use crate::error::{GeocoderError, GeocoderResult};
use nextfinish_core::rate_limit::{RateLimitStatus, RateLimiter};
use nextfinish_core::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Correlation header sent with every request
const X_REQUEST_ID: &str = "X-Request-ID";

/// Client for a Nominatim-compatible geocoder
///
/// Every request passes the circuit breaker, then waits for a slot from the
/// per-host rate limiter. Failed attempts are repeated according to the
/// configured [`RetryConfig`](nextfinish_core::retry::RetryConfig), which
/// defaults to a single attempt. Cloning is cheap and clones share the
/// breaker and limiter.
#[derive(Clone)]
pub struct NominatimClient {
    http: Client,
    config: Arc<GeocoderConfig>,
    breaker: Arc<CircuitBreaker>,
    limiter: Arc<RateLimiter>,
}

impl NominatimClient {
    /// Client from defaults plus environment overrides
    pub fn new() -> GeocoderResult<Self> {
        Self::with_config(GeocoderConfig::from_env()?)
    }

    /// Client from an explicit configuration
    pub fn with_config(config: GeocoderConfig) -> GeocoderResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|_| GeocoderError::config("user_agent contains characters not allowed in a header"))?,
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(GeocoderError::Request)?;

        Ok(Self {
            http,
            breaker: Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default())),
            limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
            config: Arc::new(config),
        })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    /// Service base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Circuit breaker state
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Rate limiter bucket for the service host
    #[must_use]
    pub fn rate_limit_status(&self) -> RateLimitStatus {
        self.limiter.status(&host_key(&self.config.base_url))
    }

    /// Forward geocoding
    #[must_use]
    pub fn search(&self) -> SearchApi {
        SearchApi::new(self.clone())
    }

    /// Health probe
    #[must_use]
    pub fn status(&self) -> StatusApi {
        StatusApi::new(self.clone())
    }

    /// GET `path` below the base URL and decode the JSON body
    #[instrument(skip(self, query), fields(request_id))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> GeocoderResult<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path.trim_start_matches('/'));
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let mut pauses = self.config.retry.backoffs();
        let mut attempt = 1u32;
        loop {
            let err = match self.attempt(&request_id, &url, query).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            match pauses.next() {
                Some(pause) if err.is_retryable() => {
                    debug!(%request_id, attempt, error = %err, pause_ms = pause.as_millis(), "Retrying");
                    tokio::time::sleep(pause).await;
                    attempt += 1;
                }
                None if attempt > 1 && err.is_retryable() => {
                    warn!(%request_id, attempts = attempt, error = %err, "Giving up");
                    return Err(GeocoderError::RetriesExhausted {
                        attempts: attempt,
                        last_error: err.to_string(),
                    });
                }
                _ => {
                    warn!(%request_id, attempt, error = %err, "Request failed");
                    return Err(err);
                }
            }
        }
    }

    /// One request: breaker check, rate limit slot, send, decode
    async fn attempt<T: DeserializeOwned>(
        &self,
        request_id: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> GeocoderResult<T> {
        if !self.breaker.can_execute() {
            warn!(%request_id, cooldown = ?self.breaker.remaining_cooldown(), "Circuit open, not calling geocoder");
            return Err(GeocoderError::CircuitOpen);
        }

        let host = host_key(url);
        while let Some(wait) = self.limiter.reserve(&host) {
            debug!(%request_id, %host, wait_ms = wait.as_millis(), "Waiting for rate limit slot");
            tokio::time::sleep(wait).await;
        }

        let started = Instant::now();
        let result = match self.http.get(url).query(query).header(X_REQUEST_ID, request_id).send().await {
            Ok(response) => self.decode(response).await,
            Err(err) => Err(self.classify(err)),
        };

        match &result {
            Ok(_) => {
                self.breaker.record_success();
                debug!(%request_id, elapsed_ms = started.elapsed().as_millis(), "Geocoder answered");
            }
            // Client-side mistakes say nothing about the service's health
            Err(err) if err.is_retryable() => self.breaker.record_failure(),
            Err(_) => {}
        }
        result
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> GeocoderResult<T> {
        let status = response.status();
        let body = response.bytes().await.map_err(|err| self.classify(err))?;

        if status.is_success() {
            serde_json::from_slice(&body).map_err(GeocoderError::Json)
        } else {
            Err(GeocoderError::api_response(
                status.as_u16(),
                String::from_utf8_lossy(&body).trim().to_string(),
            ))
        }
    }

    fn classify(&self, err: reqwest::Error) -> GeocoderError {
        if err.is_timeout() {
            GeocoderError::Timeout(self.config.timeout)
        } else {
            GeocoderError::Request(err)
        }
    }
}

/// Host and port of a URL; rate limits apply per host
fn host_key(url: &str) -> String {
    url.split_once("://")
        .and_then(|(_, rest)| rest.split(['/', '?']).next())
        .filter(|host| !host.is_empty())
        .unwrap_or("default")
        .to_string()
}
