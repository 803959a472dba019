//! Error types for the search crate.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while loading or querying the event catalog.
///
/// Filtering itself is total and never produces these.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The catalog file could not be read
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog is not a JSON array of events
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two catalog entries share an id
    #[error("Duplicate event id: {0}")]
    DuplicateId(String),

    /// No event with the requested id
    #[error("Event not found: {0}")]
    EventNotFound(String),
}
