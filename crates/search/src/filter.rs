//! Mutable filter inputs, changed only through named transitions.

use crate::{DistanceBucket, Event};
use nextfinish_geo::{haversine_distance, Coordinate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Date sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Earliest first
    #[default]
    DateAscending,
    /// Latest first
    DateDescending,
}

impl SortOrder {
    /// Stable identifier used on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DateAscending => "asc",
            Self::DateDescending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "date_ascending" | "date-asc" => Ok(Self::DateAscending),
            "desc" | "date_descending" | "date-desc" => Ok(Self::DateDescending),
            other => Err(format!("Unknown sort order '{other}' (expected asc or desc)")),
        }
    }
}

/// The user's filter inputs.
///
/// An empty text query and an empty category set both mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    text_query: String,
    bucket: DistanceBucket,
    categories: BTreeSet<String>,
    sort_order: SortOrder,
}

impl FilterState {
    /// Creates an unfiltered state sorted by ascending date.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text query (builder form).
    #[must_use]
    pub fn with_text_query(mut self, query: impl Into<String>) -> Self {
        self.set_text_query(query);
        self
    }

    /// Sets the distance bucket (builder form).
    #[must_use]
    pub fn with_bucket(mut self, bucket: DistanceBucket) -> Self {
        self.bucket = bucket;
        self
    }

    /// Selects categories (builder form).
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    /// Sets the sort order (builder form).
    #[must_use]
    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Current text query as entered.
    pub fn text_query(&self) -> &str {
        &self.text_query
    }

    /// Replaces the text query.
    pub fn set_text_query(&mut self, query: impl Into<String>) {
        self.text_query = query.into();
    }

    /// Current distance bucket.
    pub fn bucket(&self) -> DistanceBucket {
        self.bucket
    }

    /// Replaces the distance bucket.
    pub fn set_bucket(&mut self, bucket: DistanceBucket) {
        self.bucket = bucket;
    }

    /// Selected categories.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Toggles a category; returns true if it is now selected.
    pub fn toggle_category(&mut self, category: &str) -> bool {
        if self.categories.remove(category) {
            false
        } else {
            self.categories.insert(category.to_string());
            true
        }
    }

    /// Selects a category; returns false if it was already selected.
    pub fn select_category(&mut self, category: &str) -> bool {
        self.categories.insert(category.to_string())
    }

    /// Removes every category selection.
    pub fn clear_categories(&mut self) {
        self.categories.clear();
    }

    /// Current sort order.
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Replaces the sort order.
    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    /// Resets text, bucket and categories; keeps the sort order.
    pub fn reset(&mut self) {
        self.text_query.clear();
        self.bucket = DistanceBucket::All;
        self.categories.clear();
    }

    /// Returns true if no predicate is active.
    pub fn is_unfiltered(&self) -> bool {
        self.text_query.trim().is_empty() && self.bucket == DistanceBucket::All && self.categories.is_empty()
    }

    pub(crate) fn matches_category(&self, event: &Event) -> bool {
        self.categories.is_empty()
            || event
                .category
                .as_deref()
                .is_some_and(|category| self.categories.contains(category))
    }
}

/// An active geospatial filter: a resolved anchor and a radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFilter {
    /// Resolved search center
    pub anchor: Coordinate,
    /// Inclusive radius in kilometers
    pub radius_km: f64,
}

impl GeoFilter {
    /// Creates a geospatial filter.
    pub const fn new(anchor: Coordinate, radius_km: f64) -> Self {
        Self { anchor, radius_km }
    }

    /// Distance from the anchor to the event, if the event has coordinates.
    pub fn distance_to(&self, event: &Event) -> Option<f64> {
        event
            .coordinates()
            .map(|coordinate| haversine_distance(&self.anchor, &coordinate))
    }

    /// Returns true if the event has coordinates within the radius.
    pub fn admits(&self, event: &Event) -> bool {
        self.distance_to(event).is_some_and(|d| d <= self.radius_km)
    }
}
