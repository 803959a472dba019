//! Event records as supplied by the catalog provider.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use nextfinish_geo::Coordinate;
use serde::{Deserialize, Deserializer, Serialize};

/// Display name used when an event has neither a name nor a title.
pub const UNTITLED_EVENT: &str = "Unbenanntes Event";

/// Shown in place of a missing or unreadable date.
pub const UNKNOWN_DATE: &str = "Datum unbekannt";

const MONTHS_DE: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// A single event (race, ride, march) from the catalog.
///
/// Events are read-only for the lifetime of a discovery session. Every field but
/// `id` is optional; numeric fields that arrive as strings are parsed, and values
/// that are not finite numbers are treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque unique identifier (string or integer in the source data)
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Event name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Alternative title, used when `name` is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form category label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Event type (e.g. "Lauf", "Radrennen")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Free-form place text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// City, may duplicate `location`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// ISO timestamp or date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Race distance in kilometers
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Entry fee
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Participant limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// Teaser image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// External registration or info page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Latitude in decimal degrees
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Raw geocoder answer stored alongside backfilled coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_location_data: Option<serde_json::Value>,
    /// Row creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Event {
    /// Creates an event with only an id set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            title: None,
            description: None,
            category: None,
            event_type: None,
            location: None,
            city: None,
            date: None,
            distance: None,
            price: None,
            capacity: None,
            image_url: None,
            link: None,
            lat: None,
            lng: None,
            raw_location_data: None,
            created_at: None,
        }
    }

    /// Name, else title, else [`UNTITLED_EVENT`]. Blank strings count as absent.
    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref())
            .or_else(|| non_blank(self.title.as_deref()))
            .unwrap_or(UNTITLED_EVENT)
    }

    /// Place text for display: `location`, else `city`.
    pub fn place(&self) -> Option<&str> {
        non_blank(self.location.as_deref()).or_else(|| non_blank(self.city.as_deref()))
    }

    /// The event's coordinate, if both halves are present and valid.
    pub fn coordinates(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.lat, self.lng)
    }

    /// Race distance, if present and a non-negative finite number.
    pub fn distance_km(&self) -> Option<f64> {
        self.distance.filter(|d| d.is_finite() && *d >= 0.0)
    }

    /// Sort key for the date: milliseconds since the Unix epoch (UTC).
    ///
    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS±TZ`, naive date-times (read as UTC)
    /// and plain `YYYY-MM-DD` dates. Returns `None` for absent or unparseable dates.
    pub fn date_key(&self) -> Option<i64> {
        self.date.as_deref().and_then(parse_date).map(|(key, _)| key)
    }

    /// Calendar day of the event as written in the source timestamp.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date).map(|(_, day)| day)
    }

    /// German long-form date such as `12. April 2026`, or [`UNKNOWN_DATE`].
    pub fn formatted_date(&self) -> String {
        match self.calendar_date() {
            Some(day) => format!("{}. {} {}", day.day(), MONTHS_DE[day.month0() as usize], day.year()),
            None => UNKNOWN_DATE.to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_date(raw: &str) -> Option<(i64, NaiveDate)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some((dt.timestamp_millis(), dt.date_naive()));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some((dt.timestamp_millis(), dt.date_naive()));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some((naive.and_utc().timestamp_millis(), naive.date()));
        }
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some((day.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis(), day))
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumber {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    let value = match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Number(n)) => Some(n),
        Some(RawNumber::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(RawNumber::Other(_)) | None => None,
    };
    Ok(value.filter(|n| n.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_from(json: &str) -> Event {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut event = Event::new("1");
        assert_eq!(event.display_name(), UNTITLED_EVENT);

        event.title = Some("Stadtlauf".into());
        assert_eq!(event.display_name(), "Stadtlauf");

        event.name = Some("Leipzig Marathon".into());
        assert_eq!(event.display_name(), "Leipzig Marathon");

        event.name = Some("   ".into());
        assert_eq!(event.display_name(), "Stadtlauf");
    }

    #[test]
    fn test_deserialize_minimal_and_numeric_id() {
        let event = event_from(r#"{"id": 42}"#);
        assert_eq!(event.id, "42");
        assert!(event.name.is_none());
        assert!(event.coordinates().is_none());
    }

    #[test]
    fn test_deserialize_full_row() {
        let event = event_from(
            r#"{
                "id": "a1",
                "name": "Leipzig Marathon",
                "category": "Laufen",
                "type": "Marathon",
                "location": "Leipzig",
                "date": "2026-04-12T09:00:00+02:00",
                "distance": 42.195,
                "lat": 51.3397,
                "lng": "12.3731",
                "link": "https://example.org"
            }"#,
        );
        assert_eq!(event.event_type.as_deref(), Some("Marathon"));
        assert_eq!(event.distance_km(), Some(42.195));
        assert_eq!(event.coordinates(), Some(Coordinate::new(51.3397, 12.3731)));
    }

    #[test]
    fn test_half_present_or_garbage_coordinates_are_absent() {
        assert!(event_from(r#"{"id": "1", "lat": 51.3}"#).coordinates().is_none());
        assert!(event_from(r#"{"id": "1", "lat": 51.3, "lng": null}"#).coordinates().is_none());
        assert!(event_from(r#"{"id": "1", "lat": "abc", "lng": 12.0}"#).coordinates().is_none());
        assert!(event_from(r#"{"id": "1", "lat": true, "lng": 12.0}"#).coordinates().is_none());
    }

    #[test]
    fn test_negative_distance_is_absent() {
        let mut event = Event::new("1");
        event.distance = Some(-3.0);
        assert_eq!(event.distance_km(), None);
    }

    #[test]
    fn test_date_key_formats() {
        let mut event = Event::new("1");

        event.date = Some("2026-04-12".into());
        let plain = event.date_key().unwrap();

        event.date = Some("2026-04-12T00:00:00Z".into());
        assert_eq!(event.date_key(), Some(plain));

        event.date = Some("2026-04-12T00:00:00".into());
        assert_eq!(event.date_key(), Some(plain));

        event.date = Some("2026-04-12 02:00:00+02".into());
        assert_eq!(event.date_key(), Some(plain));

        event.date = Some("2026-04-12 00:00:00.250".into());
        assert_eq!(event.date_key(), Some(plain + 250));
    }

    #[test]
    fn test_unparseable_date_is_undated() {
        let mut event = Event::new("1");
        event.date = Some("irgendwann im Mai".into());
        assert_eq!(event.date_key(), None);
        assert_eq!(event.formatted_date(), UNKNOWN_DATE);

        event.date = None;
        assert_eq!(event.formatted_date(), UNKNOWN_DATE);
    }

    #[test]
    fn test_formatted_date_is_german() {
        let mut event = Event::new("1");
        event.date = Some("2026-04-12T09:00:00+02:00".into());
        assert_eq!(event.formatted_date(), "12. April 2026");

        event.date = Some("2026-03-01".into());
        assert_eq!(event.formatted_date(), "1. März 2026");
    }

    #[test]
    fn test_place_prefers_location() {
        let mut event = Event::new("1");
        assert_eq!(event.place(), None);
        event.city = Some("Leipzig".into());
        assert_eq!(event.place(), Some("Leipzig"));
        event.location = Some("Augustusplatz, Leipzig".into());
        assert_eq!(event.place(), Some("Augustusplatz, Leipzig"));
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let mut event = Event::new("7");
        event.event_type = Some("Lauf".into());
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"id":"7","type":"Lauf"}"#);
    }
}
