//! The search session state machine.
//!
//! ```text
//! Idle ──submit──▶ Resolving ──complete(ok)──▶ Resolved ──adjust_radius──▶ Resolved
//!   ▲                 │    ╲                      │
//!   │                 │     complete(err)──▶ Failed
//!   └──── clear ──────┴───────────────────────────┘
//! ```
//!
//! Every submit and clear bumps a monotonic sequence number. A completion is
//! applied only if it carries the current number; anything else is stale and
//! dropped without touching the session.

use nextfinish_core::config::SearchSettings;
use nextfinish_geo::Coordinate;
use nextfinish_geocoder::{ResolutionError, ResolvedPlace};
use nextfinish_search::GeoFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Lifecycle state of the place search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No place search active
    #[default]
    Idle,
    /// Waiting for the place resolver
    Resolving,
    /// Anchor resolved; the radius filter is active
    Resolved,
    /// The most recent search failed
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A resolution the caller must perform, tagged with the sequence it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Sequence number to hand back to [`SearchSession::complete`]
    pub sequence: u64,
    /// Trimmed place name
    pub place_name: String,
}

/// What happened to a completion handed to [`SearchSession::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The completion changed the session
    Applied,
    /// A newer submit or clear superseded it; the session is unchanged
    Stale,
}

/// Place search state for one discovery view.
#[derive(Debug, Clone)]
pub struct SearchSession {
    settings: SearchSettings,
    status: SessionStatus,
    place_name: String,
    anchor: Option<Coordinate>,
    resolved_place: Option<ResolvedPlace>,
    requested_radius_km: f64,
    active_radius_km: Option<f64>,
    pending_radius_km: f64,
    error_message: Option<String>,
    last_error: Option<ResolutionError>,
    sequence: u64,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(SearchSettings::default())
    }
}

impl SearchSession {
    /// Creates an idle session whose slider starts at the default radius.
    pub fn new(settings: SearchSettings) -> Self {
        let radius = settings.default_radius_km;
        Self {
            settings,
            status: SessionStatus::Idle,
            place_name: String::new(),
            anchor: None,
            resolved_place: None,
            requested_radius_km: radius,
            active_radius_km: None,
            pending_radius_km: radius,
            error_message: None,
            last_error: None,
            sequence: 0,
        }
    }

    /// Starts a place search.
    ///
    /// A blank place name behaves as [`SearchSession::clear`] and returns `None`.
    /// Otherwise the session enters `Resolving` and the returned request must be
    /// resolved and passed back to [`SearchSession::complete`].
    pub fn submit(&mut self, place_name: &str, radius_km: f64) -> Option<ResolveRequest> {
        let place_name = place_name.trim();
        if place_name.is_empty() {
            debug!("Blank place name submitted, clearing search");
            self.clear();
            return None;
        }

        let radius = self.settings.effective_radius(radius_km);
        self.sequence += 1;
        self.status = SessionStatus::Resolving;
        self.place_name = place_name.to_string();
        self.anchor = None;
        self.resolved_place = None;
        self.active_radius_km = None;
        self.error_message = None;
        self.last_error = None;
        self.requested_radius_km = radius;
        self.pending_radius_km = radius;

        debug!(sequence = self.sequence, place = %place_name, radius_km = radius, "Resolving place");

        Some(ResolveRequest {
            sequence: self.sequence,
            place_name: self.place_name.clone(),
        })
    }

    /// Applies the outcome of a resolution, unless it is stale.
    pub fn complete(&mut self, sequence: u64, outcome: Result<ResolvedPlace, ResolutionError>) -> Completion {
        if sequence != self.sequence || self.status != SessionStatus::Resolving {
            debug!(
                completion = sequence,
                current = self.sequence,
                status = %self.status,
                "Discarding stale resolution"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(place) => {
                debug!(
                    sequence,
                    place = %self.place_name,
                    lat = place.coordinate.latitude,
                    lng = place.coordinate.longitude,
                    radius_km = self.requested_radius_km,
                    "Place resolved"
                );
                self.status = SessionStatus::Resolved;
                self.anchor = Some(place.coordinate);
                self.resolved_place = Some(place);
                self.active_radius_km = Some(self.requested_radius_km);
            }
            Err(err) => {
                warn!(sequence, place = %self.place_name, error = %err, "Place resolution failed");
                self.status = SessionStatus::Failed;
                self.anchor = None;
                self.resolved_place = None;
                self.active_radius_km = None;
                self.error_message = Some(err.user_message());
                self.last_error = Some(err);
            }
        }
        Completion::Applied
    }

    /// Moves the radius slider.
    ///
    /// The radius is used as given; only a negative or non-finite value falls
    /// back to the default. While resolved the new radius applies immediately;
    /// returns true in that case.
    pub fn adjust_radius(&mut self, radius_km: f64) -> bool {
        let radius = self.settings.effective_radius(radius_km);
        self.pending_radius_km = radius;
        if self.status == SessionStatus::Resolved {
            debug!(radius_km = radius, "Radius changed on resolved anchor");
            self.active_radius_km = Some(radius);
            true
        } else {
            false
        }
    }

    /// Drops the place search and invalidates any resolution in flight.
    pub fn clear(&mut self) {
        self.sequence += 1;
        self.status = SessionStatus::Idle;
        self.place_name.clear();
        self.anchor = None;
        self.resolved_place = None;
        self.active_radius_km = None;
        self.error_message = None;
        self.last_error = None;
        debug!(sequence = self.sequence, "Search cleared");
    }

    /// The geospatial filter to apply, present only while resolved.
    pub fn geo_filter(&self) -> Option<GeoFilter> {
        match (self.status, self.anchor, self.active_radius_km) {
            (SessionStatus::Resolved, Some(anchor), Some(radius)) => Some(GeoFilter::new(anchor, radius)),
            _ => None,
        }
    }

    /// Informational notice for an empty result set around a resolved anchor.
    pub fn empty_result_notice(&self, result_count: usize) -> Option<String> {
        if result_count > 0 {
            return None;
        }
        self.geo_filter()
            .map(|geo| format!("Keine Events im Umkreis von {} km gefunden.", geo.radius_km))
    }

    /// Current state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// True while a resolution is outstanding.
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Resolving
    }

    /// The place name of the current search, if any.
    pub fn place_name(&self) -> Option<&str> {
        (!self.place_name.is_empty()).then_some(self.place_name.as_str())
    }

    /// Resolved anchor.
    pub fn anchor(&self) -> Option<Coordinate> {
        self.anchor
    }

    /// The geocoder's match for the current anchor.
    pub fn resolved_place(&self) -> Option<&ResolvedPlace> {
        self.resolved_place.as_ref()
    }

    /// Radius in effect for the geospatial filter.
    pub fn active_radius_km(&self) -> Option<f64> {
        self.active_radius_km
    }

    /// Current slider value.
    pub fn pending_radius_km(&self) -> f64 {
        self.pending_radius_km
    }

    /// User-facing error of the last failed search.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Why the last search failed.
    pub fn last_error(&self) -> Option<&ResolutionError> {
        self.last_error.as_ref()
    }

    /// Current sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Radius bounds and defaults.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }
}
