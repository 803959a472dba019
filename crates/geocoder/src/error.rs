//! Error types for the geocoder client and place resolution

use thiserror::Error;

/// Result type alias for geocoder operations
pub type GeocoderResult<T> = Result<T, GeocoderError>;

/// Geocoder client errors
#[derive(Error, Debug)]
pub enum GeocoderError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Geocoder returned an error response
    #[error("Geocoder error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Circuit breaker is open
    #[error("Circuit breaker is open - geocoder temporarily unavailable")]
    CircuitOpen,

    /// Request timeout
    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// All retry attempts exhausted
    #[error("All {attempts} attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },

    /// Upstream data could not be interpreted
    #[error("Malformed geocoder response: {0}")]
    Malformed(String),
}

impl GeocoderError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::ApiResponse { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout(_) => true,
            Self::CircuitOpen
            | Self::Config(_)
            | Self::Json(_)
            | Self::Malformed(_)
            | Self::RetriesExhausted { .. } => false,
        }
    }
}

/// Message shown when a lookup fails for any reason other than "not found".
pub const TRANSPORT_MESSAGE: &str = "Fehler bei der Suche. Bitte versuche es erneut.";

/// Message shown when a resolution is requested without a place name.
pub const INPUT_INVALID_MESSAGE: &str = "Bitte gib einen Ort ein.";

/// Why a place name could not be turned into a coordinate.
///
/// Every variant is terminal for the request that produced it; callers decide
/// whether to resubmit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Empty or whitespace-only input, rejected before any network call
    #[error("place name is empty")]
    InputInvalid,

    /// The geocoder answered but had no candidate for the name
    #[error("place not found: {0}")]
    NotFound(String),

    /// Network, protocol or upstream data failure
    #[error("place lookup failed: {0}")]
    Transport(String),
}

impl ResolutionError {
    /// German user-facing message.
    ///
    /// "Not found" names the searched place; transport failures ask the user to retry.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InputInvalid => INPUT_INVALID_MESSAGE.to_string(),
            Self::NotFound(place) => format!("Ort \"{place}\" nicht gefunden."),
            Self::Transport(_) => TRANSPORT_MESSAGE.to_string(),
        }
    }

    /// Returns true for [`ResolutionError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<GeocoderError> for ResolutionError {
    fn from(err: GeocoderError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<ResolutionError> for nextfinish_core::Error {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::InputInvalid => nextfinish_core::Error::validation("Place name must not be empty")
                .with_suggestion("Pass a city or address, e.g. \"Leipzig\""),
            ResolutionError::NotFound(place) => nextfinish_core::Error::place_not_found(&place),
            ResolutionError::Transport(reason) => nextfinish_core::Error::geocoding(reason)
                .with_suggestion("Check your network connection and try again"),
        }
    }
}
