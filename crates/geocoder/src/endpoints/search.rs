//! Forward geocoding (`/search`)

use crate::client::NominatimClient;
use crate::error::GeocoderResult;
use nextfinish_geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Search API interface
#[derive(Clone)]
pub struct SearchApi {
    client: NominatimClient,
}

impl SearchApi {
    /// Create a new search API interface
    pub(crate) fn new(client: NominatimClient) -> Self {
        Self { client }
    }

    /// Look up a free-form place name, returning at most `limit` ranked candidates
    pub async fn query(&self, place: &str, limit: u8) -> GeocoderResult<Vec<PlaceCandidate>> {
        let limit = limit.max(1).to_string();
        let params = [
            ("format", "json"),
            ("q", place),
            ("limit", limit.as_str()),
            ("addressdetails", "1"),
            ("accept-language", self.client.config().language.as_str()),
        ];
        self.client.get("search", &params).await
    }
}

/// One ranked result of a place search
///
/// Nominatim encodes latitude and longitude as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceCandidate {
    /// Latitude as returned by the service
    pub lat: String,
    /// Longitude as returned by the service
    pub lon: String,
    /// Full human-readable name of the match
    #[serde(default)]
    pub display_name: String,
    /// Structured address, present with `addressdetails=1`
    #[serde(default)]
    pub address: Option<Address>,
    /// Service-specific ranking score
    #[serde(default)]
    pub importance: Option<f64>,
}

impl PlaceCandidate {
    /// Parse the candidate's coordinate
    ///
    /// # Errors
    /// Returns an error if either half is not a finite, in-range number.
    pub fn coordinate(&self) -> nextfinish_geo::Result<Coordinate> {
        Coordinate::parse(&self.lat, &self.lon)
    }

    /// Most specific settlement name in the address
    #[must_use]
    pub fn locality(&self) -> Option<&str> {
        self.address.as_ref().and_then(Address::locality)
    }
}

/// Address breakdown of a candidate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Town
    #[serde(default)]
    pub town: Option<String>,
    /// Village
    #[serde(default)]
    pub village: Option<String>,
    /// Federal state
    #[serde(default)]
    pub state: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
}

impl Address {
    /// City, else town, else state, else village
    #[must_use]
    pub fn locality(&self) -> Option<&str> {
        self.city
            .as_deref()
            .or(self.town.as_deref())
            .or(self.state.as_deref())
            .or(self.village.as_deref())
    }
}
