//! Structured errors for the command-line surface
//!
//! Library crates keep their own `thiserror` enums. Before reporting, the CLI
//! converts them into [`Error`], which carries a stable code, an optional
//! context line and an optional hint for the user. Codes are grouped by
//! [`ErrorCategory`], and the category decides the process exit code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Exit codes for CLI commands
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const CATALOG_ERROR: i32 = 4;
    pub const GEOCODING_ERROR: i32 = 5;
    pub const TIMEOUT: i32 = 124;
}

/// Broad class of an [`ErrorCode`]; the thousands digit of the code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// 1xxx
    General,
    /// 2xxx
    Io,
    /// 3xxx
    Configuration,
    /// 4xxx
    Catalog,
    /// 6xxx
    Validation,
    /// 9xxx
    Geocoding,
}

impl ErrorCategory {
    /// Process exit code for failures in this category
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::General | Self::Io => exit_codes::FAILURE,
            Self::Configuration => exit_codes::CONFIG_ERROR,
            Self::Catalog => exit_codes::CATALOG_ERROR,
            Self::Validation => exit_codes::VALIDATION_ERROR,
            Self::Geocoding => exit_codes::GEOCODING_ERROR,
        }
    }
}

/// Stable error codes, displayed as `E` plus four digits
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Internal = 1001,
    Timeout = 1003,

    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,

    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    ConfigValidationError = 3003,

    CatalogError = 4000,
    EventNotFound = 4002,

    ValidationError = 6000,

    GeocodingError = 9000,
    PlaceNotFound = 9001,
}

impl ErrorCode {
    /// Numeric value
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Category the code belongs to
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::Internal | Self::Timeout => ErrorCategory::General,
            Self::IoError | Self::FileNotFound | Self::PermissionDenied => ErrorCategory::Io,
            Self::ConfigError | Self::ConfigNotFound | Self::ConfigParseError | Self::ConfigValidationError => {
                ErrorCategory::Configuration
            }
            Self::CatalogError | Self::EventNotFound => ErrorCategory::Catalog,
            Self::ValidationError => ErrorCategory::Validation,
            Self::GeocodingError | Self::PlaceNotFound => ErrorCategory::Geocoding,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// An error ready to show to the user
#[derive(Error, Debug)]
#[error("[{code}] {message}")]
pub struct Error {
    /// Stable code
    pub code: ErrorCode,
    /// What went wrong
    pub message: String,
    /// Where it went wrong, e.g. the file being read
    pub context: Option<String>,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Underlying cause
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// An error with a code and message only
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Replace the context line
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Replace the hint
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Process exit code
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.code == ErrorCode::Timeout {
            exit_codes::TIMEOUT
        } else {
            self.code.category().exit_code()
        }
    }

    /// Serializable form for `--format json`
    #[must_use]
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code.to_string(),
            category: self.code.category(),
            exit_code: self.exit_code(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            cause: self.source.as_ref().map(ToString::to_string),
        }
    }

    /// A file that should exist does not
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(ErrorCode::FileNotFound, format!("File not found: {}", path.as_ref().display()))
            .with_suggestion("Check the path and that the file is readable")
    }

    /// Configuration failure without a more specific code
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// An explicitly requested configuration file is missing
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create nextfinish.toml or pass --config with an existing file")
    }

    /// Configuration parsed but holds inconsistent values
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigValidationError, message)
    }

    /// The event catalog could not be read or parsed
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CatalogError, message)
    }

    /// No event carries the requested id
    pub fn event_not_found(id: &str) -> Self {
        Self::new(ErrorCode::EventNotFound, format!("Event not found: {id}"))
            .with_suggestion("List events with `nextfinish search` to find valid ids")
    }

    /// Invalid user input
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Geocoder lookup failed
    pub fn geocoding(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GeocodingError, message)
    }

    /// Geocoder answered without candidates
    pub fn place_not_found(place: &str) -> Self {
        Self::new(ErrorCode::PlaceNotFound, format!("Place not found: {place}"))
            .with_suggestion("Check the spelling or try a larger nearby town")
    }
}

/// What `--format json` prints for a failed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Code as displayed, e.g. `E9001`
    pub code: String,
    /// Category of the code
    pub category: ErrorCategory,
    /// Exit code the process ends with
    pub exit_code: i32,
    /// What went wrong
    pub message: String,
    /// Where it went wrong
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// What to do about it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Underlying cause, rendered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Self::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorCode::ConfigParseError, format!("Invalid TOML: {}", err.message())).with_source(err)
    }
}

/// Adds context or a hint to the error of a [`Result`]
pub trait ResultExt<T> {
    /// Set the context line on failure
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Set the hint on failure
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}
