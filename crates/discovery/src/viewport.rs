//! Map framing derived from the search session.

use crate::session::{SearchSession, SessionStatus};
use nextfinish_core::config::MapSettings;
use nextfinish_geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Map center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Map center
    pub center: Coordinate,
    /// Tile zoom level; higher shows less area
    pub zoom: u8,
}

/// Zoom level for a search radius: wider radius, lower zoom.
pub fn zoom_for_radius(radius_km: f64) -> u8 {
    if radius_km > 100.0 {
        7
    } else if radius_km > 50.0 {
        8
    } else {
        9
    }
}

/// Derives the viewport from session state. Holds only the default framing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSync {
    default: Viewport,
}

impl Default for ViewportSync {
    fn default() -> Self {
        Self::new(&MapSettings::default())
    }
}

impl ViewportSync {
    /// Uses the configured default framing.
    pub fn new(settings: &MapSettings) -> Self {
        Self {
            default: Viewport {
                center: Coordinate::new(settings.default_latitude, settings.default_longitude),
                zoom: settings.default_zoom,
            },
        }
    }

    /// Framing shown when no anchor is resolved.
    pub fn default_viewport(&self) -> Viewport {
        self.default
    }

    /// Centered on the anchor while resolved, default framing otherwise.
    pub fn derive(&self, session: &SearchSession) -> Viewport {
        match (session.status(), session.anchor(), session.active_radius_km()) {
            (SessionStatus::Resolved, Some(center), Some(radius)) => Viewport {
                center,
                zoom: zoom_for_radius(radius),
            },
            _ => self.default,
        }
    }
}
