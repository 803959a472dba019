//! Configuration schema definitions
//!
//! Every section is optional in the file; missing keys fall back to the
//! defaults below.

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Place resolution service
    #[serde(default)]
    pub geocoder: GeocoderSettings,

    /// Search session defaults
    #[serde(default)]
    pub search: SearchSettings,

    /// Default map framing
    #[serde(default)]
    pub map: MapSettings,

    /// Log output
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Geocoder (Nominatim-compatible) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderSettings {
    /// Base URL of the search service
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,

    /// Application identifier sent as `User-Agent`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Preferred result language
    #[serde(default = "default_language")]
    pub language: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,

    /// Requests allowed per second against one host
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_url(),
            user_agent: default_user_agent(),
            language: default_language(),
            timeout_secs: default_geocoder_timeout(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    "nextfinish-app/1.0".to_string()
}

fn default_language() -> String {
    "de".to_string()
}

fn default_geocoder_timeout() -> u64 {
    10
}

fn default_requests_per_second() -> u32 {
    1
}

/// Radius slider and resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Radius applied when the user has not moved the slider
    #[serde(default = "default_radius")]
    pub default_radius_km: f64,

    /// Slider lower bound
    #[serde(default = "default_min_radius")]
    pub min_radius_km: f64,

    /// Slider upper bound
    #[serde(default = "default_max_radius")]
    pub max_radius_km: f64,

    /// Upper bound for one place resolution, after which it counts as a transport failure
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius(),
            min_radius_km: default_min_radius(),
            max_radius_km: default_max_radius(),
            resolve_timeout_secs: default_resolve_timeout(),
        }
    }
}

impl SearchSettings {
    /// The radius a search uses for a requested value
    ///
    /// Any finite, non-negative value is taken as given. Anything else falls
    /// back to the default radius.
    #[must_use]
    pub fn effective_radius(&self, radius_km: f64) -> f64 {
        if radius_km.is_finite() && radius_km >= 0.0 {
            radius_km
        } else {
            self.default_radius_km
        }
    }

    /// Whether a radius lies within the slider bounds
    #[must_use]
    pub fn radius_in_range(&self, radius_km: f64) -> bool {
        (self.min_radius_km..=self.max_radius_km).contains(&radius_km)
    }
}

fn default_radius() -> f64 {
    50.0
}

fn default_min_radius() -> f64 {
    10.0
}

fn default_max_radius() -> f64 {
    200.0
}

fn default_resolve_timeout() -> u64 {
    15
}

/// Map framing used when no anchor is resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSettings {
    /// Latitude of the default center
    #[serde(default = "default_center_lat")]
    pub default_latitude: f64,

    /// Longitude of the default center
    #[serde(default = "default_center_lng")]
    pub default_longitude: f64,

    /// Zoom level of the default framing
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_latitude: default_center_lat(),
            default_longitude: default_center_lng(),
            default_zoom: default_zoom(),
        }
    }
}

// Geographic center of Germany
fn default_center_lat() -> f64 {
    51.1657
}

fn default_center_lng() -> f64 {
    10.4515
}

fn default_zoom() -> u8 {
    6
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Fallback filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of the compact format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
