//! The immutable, ordered event catalog.

use crate::{Event, Result, SearchError};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// A fixed, ordered sequence of events supplied once per session.
///
/// Event ids are unique within a catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    events: Vec<Event>,
}

impl Catalog {
    /// Builds a catalog, preserving the given order.
    ///
    /// # Errors
    /// Returns [`SearchError::DuplicateId`] if two events share an id.
    pub fn new(events: Vec<Event>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if !seen.insert(event.id.as_str()) {
                return Err(SearchError::DuplicateId(event.id.clone()));
            }
        }
        Ok(Self { events })
    }

    /// Parses a catalog from a JSON array of events.
    ///
    /// # Errors
    /// Returns [`SearchError::Parse`] for malformed JSON and
    /// [`SearchError::DuplicateId`] for repeated ids.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let events: Vec<Event> = serde_json::from_str(json)?;
        Self::new(events)
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    /// Returns [`SearchError::Io`] if the file cannot be read, otherwise as
    /// [`Catalog::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        debug!(path = %path.display(), events = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// Serializes the catalog back to pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`SearchError::Parse`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.events)?)
    }

    /// All events in catalog order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterates over events in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the catalog has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Looks up an event by id.
    ///
    /// # Errors
    /// Returns [`SearchError::EventNotFound`] for an unknown id.
    pub fn get(&self, id: &str) -> Result<&Event> {
        self.events
            .iter()
            .find(|event| event.id == id)
            .ok_or_else(|| SearchError::EventNotFound(id.to_string()))
    }

    /// Distinct, non-blank categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.events
            .iter()
            .filter_map(|event| event.category.as_deref())
            .filter(|category| !category.trim().is_empty())
            .filter(|category| seen.insert(*category))
            .collect()
    }

    /// Number of events that can take part in geospatial filtering.
    pub fn located_count(&self) -> usize {
        self.events.iter().filter(|event| event.coordinates().is_some()).count()
    }

    /// Consumes the catalog, returning its events.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
