//! Place resolution: place name → coordinate.

use crate::client::NominatimClient;
use crate::endpoints::PlaceCandidate;
use crate::error::ResolutionError;
use nextfinish_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};

/// A successfully resolved place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    /// Coordinate of the best match
    pub coordinate: Coordinate,
    /// Full name of the match as reported by the geocoder
    pub display_name: String,
    /// City, town, village or state of the match
    pub city: Option<String>,
}

/// Turns a place name into a coordinate.
///
/// Implementations make a single lookup, take the best candidate, and impose no
/// timeout of their own. Empty or whitespace-only names are rejected with
/// [`ResolutionError::InputInvalid`] before any lookup happens.
pub trait PlaceResolver: Send + Sync {
    /// Resolve a place name, keeping the matched name and locality.
    fn lookup(&self, place_name: &str) -> impl Future<Output = Result<ResolvedPlace, ResolutionError>> + Send;

    /// Resolve a place name to its coordinate.
    fn resolve(&self, place_name: &str) -> impl Future<Output = Result<Coordinate, ResolutionError>> + Send {
        async move { self.lookup(place_name).await.map(|place| place.coordinate) }
    }
}

impl PlaceResolver for NominatimClient {
    async fn lookup(&self, place_name: &str) -> Result<ResolvedPlace, ResolutionError> {
        let place_name = place_name.trim();
        if place_name.is_empty() {
            return Err(ResolutionError::InputInvalid);
        }

        let candidates = self.search().query(place_name, 1).await.map_err(|e| {
            warn!(place = %place_name, error = %e, "Place lookup failed");
            ResolutionError::from(e)
        })?;

        place_from_candidates(place_name, candidates)
    }
}

/// Pick the geocoder's best candidate for `place_name`.
///
/// The first candidate wins. No candidates is [`ResolutionError::NotFound`];
/// a best candidate without usable coordinates is [`ResolutionError::Transport`].
pub fn place_from_candidates(
    place_name: &str,
    candidates: Vec<PlaceCandidate>,
) -> Result<ResolvedPlace, ResolutionError> {
    let Some(candidate) = candidates.into_iter().next() else {
        debug!(place = %place_name, "No candidates");
        return Err(ResolutionError::NotFound(place_name.to_string()));
    };

    let coordinate = candidate.coordinate().map_err(|e| {
        warn!(place = %place_name, error = %e, "Geocoder returned unusable coordinates");
        ResolutionError::Transport(e.to_string())
    })?;

    debug!(
        place = %place_name,
        lat = coordinate.latitude,
        lng = coordinate.longitude,
        "Resolved place"
    );

    Ok(ResolvedPlace {
        coordinate,
        city: candidate.locality().map(str::to_string),
        display_name: candidate.display_name,
    })
}

/// In-memory resolver over a fixed table of places.
///
/// Names match case-insensitively after trimming. Useful offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    places: HashMap<String, ResolvedPlace>,
}

impl StaticResolver {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a place with its coordinate (builder form)
    #[must_use]
    pub fn with_place(mut self, name: &str, coordinate: Coordinate) -> Self {
        self.insert(
            name,
            ResolvedPlace {
                coordinate,
                display_name: name.to_string(),
                city: Some(name.to_string()),
            },
        );
        self
    }

    /// Add or replace a place
    pub fn insert(&mut self, name: &str, place: ResolvedPlace) {
        self.places.insert(normalize(name), place);
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl PlaceResolver for StaticResolver {
    async fn lookup(&self, place_name: &str) -> Result<ResolvedPlace, ResolutionError> {
        let key = normalize(place_name);
        if key.is_empty() {
            return Err(ResolutionError::InputInvalid);
        }
        self.places
            .get(&key)
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound(place_name.trim().to_string()))
    }
}
