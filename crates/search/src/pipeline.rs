//! The filter pipeline: `(events, filters, geo filter) → ordered results`.
//!
//! Stages are pure predicates combined with logical AND, followed by a stable
//! date sort. The pipeline never fails and never copies or mutates events.

use crate::{Event, FilterState, GeoFilter, SortOrder};
/// Sort key of an event without a usable date: the Unix epoch.
pub const UNDATED_SORT_KEY: i64 = 0;

/// Runs the pipeline over `events` and returns the matching events in order.
///
/// Undated events (absent or unparseable `date`) sort as if dated at the Unix
/// epoch: first when ascending, last when descending. Ties keep their input order.
///
/// # Example
/// ```
/// use nextfinish_search::{pipeline, Catalog, DistanceBucket, FilterState};
///
/// let catalog = Catalog::from_json_str(r#"[
///     {"id": "1", "name": "Stadtlauf", "distance": 10, "date": "2026-05-01"},
///     {"id": "2", "name": "Leipzig Marathon", "distance": 42.195, "date": "2026-04-12"}
/// ]"#).unwrap();
///
/// let filters = FilterState::new().with_bucket(DistanceBucket::Marathon);
/// let results = pipeline::run(&catalog, &filters, None);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].id, "2");
/// ```
pub fn run<'a, I>(events: I, filters: &FilterState, geo: Option<&GeoFilter>) -> Vec<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    let text = TextMatcher::new(filters.text_query());
    let bucket = filters.bucket();

    let mut keyed: Vec<(i64, &'a Event)> = events
        .into_iter()
        .filter(|event| text.matches(event))
        .filter(|event| filters.matches_category(event))
        .filter(|event| bucket.matches(event.distance_km()))
        .filter(|event| geo.is_none_or(|g| g.admits(event)))
        .map(|event| (event.date_key().unwrap_or(UNDATED_SORT_KEY), event))
        .collect();

    let order = filters.sort_order();
    keyed.sort_by(|(a, _), (b, _)| match order {
        SortOrder::DateAscending => a.cmp(b),
        SortOrder::DateDescending => b.cmp(a),
    });
    keyed.into_iter().map(|(_, event)| event).collect()
}

/// Case-insensitive substring match over name, title, description and location.
struct TextMatcher {
    needle: Option<String>,
}

impl TextMatcher {
    fn new(query: &str) -> Self {
        let query = query.trim();
        Self {
            needle: (!query.is_empty()).then(|| query.to_lowercase()),
        }
    }

    fn matches(&self, event: &Event) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };
        [&event.name, &event.title, &event.description, &event.location]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catalog, DistanceBucket};
    use nextfinish_geo::{haversine_distance, Coordinate};
    use proptest::prelude::*;

    const LEIPZIG: Coordinate = Coordinate::new(51.3397, 12.3731);

    fn event(id: &str) -> Event {
        Event::new(id)
    }

    fn ids<'a>(events: &[&'a Event]) -> Vec<&'a str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    fn located(id: &str, lat: f64, lng: f64, date: Option<&str>) -> Event {
        let mut e = event(id);
        e.lat = Some(lat);
        e.lng = Some(lng);
        e.date = date.map(String::from);
        e
    }

    #[test]
    fn test_unfiltered_keeps_everything() {
        let events = vec![event("a"), event("b"), event("c")];
        let results = run(&events, &FilterState::new(), None);
        assert_eq!(ids(&results), ["a", "b", "c"]);
    }

    #[test]
    fn test_text_match_is_case_insensitive_over_all_text_fields() {
        let mut by_name = event("name");
        by_name.name = Some("Leipziger Nachtlauf".into());
        let mut by_title = event("title");
        by_title.title = Some("NACHTLAUF Dresden".into());
        let mut by_description = event("description");
        by_description.description = Some("Ein Nachtlauf durch die Altstadt".into());
        let mut by_location = event("location");
        by_location.location = Some("Nachtlaufstraße 1".into());
        let mut unrelated = event("other");
        unrelated.name = Some("Radtour".into());
        unrelated.category = Some("nachtlauf".into());

        let events = vec![by_name, by_title, by_description, by_location, unrelated, event("empty")];
        let filters = FilterState::new().with_text_query("nachtLauf");
        let results = run(&events, &filters, None);
        assert_eq!(ids(&results), ["name", "title", "description", "location"]);
    }

    #[test]
    fn test_category_filter() {
        let mut run_event = event("run");
        run_event.category = Some("Laufen".into());
        let mut ride = event("ride");
        ride.category = Some("Radfahren".into());
        let events = vec![run_event, ride, event("none")];

        let filters = FilterState::new().with_categories(["Laufen", "Wandern"]);
        assert_eq!(ids(&run(&events, &filters, None)), ["run"]);
    }

    #[test]
    fn test_bucket_excludes_events_without_distance() {
        let mut marathon = event("m");
        marathon.distance = Some(42.2);
        let events = vec![marathon, event("unknown")];

        let filters = FilterState::new().with_bucket(DistanceBucket::Marathon);
        assert_eq!(ids(&run(&events, &filters, None)), ["m"]);
        assert_eq!(run(&events, &FilterState::new(), None).len(), 2);
    }

    #[test]
    fn test_radius_scenario_keeps_catalog_order_on_date_ties() {
        // Roughly 3, 8 and 25 km north of the anchor
        let events = vec![
            located("near", LEIPZIG.latitude + 0.027, LEIPZIG.longitude, Some("2026-06-01")),
            located("mid", LEIPZIG.latitude + 0.072, LEIPZIG.longitude, Some("2026-06-01")),
            located("far", LEIPZIG.latitude + 0.225, LEIPZIG.longitude, Some("2026-06-01")),
        ];
        let geo = GeoFilter::new(LEIPZIG, 10.0);
        let results = run(&events, &FilterState::new(), Some(&geo));
        assert_eq!(ids(&results), ["near", "mid"]);
    }

    #[test]
    fn test_radius_scenario_orders_by_date() {
        let events = vec![
            located("near", LEIPZIG.latitude + 0.027, LEIPZIG.longitude, Some("2026-07-01")),
            located("mid", LEIPZIG.latitude + 0.072, LEIPZIG.longitude, Some("2026-06-01")),
            located("far", LEIPZIG.latitude + 0.225, LEIPZIG.longitude, Some("2026-05-01")),
        ];
        let geo = GeoFilter::new(LEIPZIG, 10.0);
        let results = run(&events, &FilterState::new(), Some(&geo));
        assert_eq!(ids(&results), ["mid", "near"]);
    }

    #[test]
    fn test_geo_filter_excludes_unlocated_and_half_located() {
        let mut half = event("half");
        half.lat = Some(LEIPZIG.latitude);
        let events = vec![half, event("none"), located("here", LEIPZIG.latitude, LEIPZIG.longitude, None)];

        let geo = GeoFilter::new(LEIPZIG, 200.0);
        assert_eq!(ids(&run(&events, &FilterState::new(), Some(&geo))), ["here"]);
    }

    #[test]
    fn test_radius_and_bucket_compose() {
        let mut near_marathon = located("near-m", LEIPZIG.latitude, LEIPZIG.longitude, None);
        near_marathon.distance = Some(42.195);
        let mut near_short = located("near-5", LEIPZIG.latitude, LEIPZIG.longitude, None);
        near_short.distance = Some(5.0);
        let mut far_marathon = located("far-m", 52.52, 13.405, None);
        far_marathon.distance = Some(42.195);
        let events = vec![near_marathon, near_short, far_marathon];

        let filters = FilterState::new().with_bucket(DistanceBucket::Marathon);
        let geo = GeoFilter::new(LEIPZIG, 50.0);
        assert_eq!(ids(&run(&events, &filters, Some(&geo))), ["near-m"]);
    }

    #[test]
    fn test_undated_sorts_as_epoch() {
        let dated = |id: &str, date: &str| {
            let mut e = event(id);
            e.date = Some(date.into());
            e
        };
        let mut garbled = event("garbled");
        garbled.date = Some("bald".into());
        let events = vec![
            dated("may", "2026-05-01"),
            event("undated"),
            dated("april", "2026-04-12T09:00:00+02:00"),
            garbled,
        ];

        let asc = run(&events, &FilterState::new(), None);
        assert_eq!(ids(&asc), ["undated", "garbled", "april", "may"]);

        let desc_filters = FilterState::new().with_sort_order(SortOrder::DateDescending);
        let desc = run(&events, &desc_filters, None);
        assert_eq!(ids(&desc), ["may", "april", "undated", "garbled"]);
    }

    #[test]
    fn test_runs_over_catalog() {
        let catalog = Catalog::from_json_str(r#"[{"id": "1", "name": "Lauf"}, {"id": "2", "name": "Tour"}]"#).unwrap();
        let filters = FilterState::new().with_text_query("lauf");
        assert_eq!(ids(&run(&catalog, &filters, None)), ["1"]);
    }

    fn arb_event() -> impl Strategy<Value = Event> {
        (
            proptest::option::of(prop_oneof![Just("Lauf"), Just("Radtour"), Just("Marsch")]),
            proptest::option::of(prop_oneof![Just("Laufen"), Just("Radfahren")]),
            proptest::option::of(0.0f64..60.0),
            proptest::option::of(0u32..5),
            proptest::option::of((50.0f64..53.0, 11.0f64..14.0)),
        )
            .prop_map(|(name, category, distance, day, coords)| Event {
                name: name.map(String::from),
                category: category.map(String::from),
                distance,
                date: day.map(|d| format!("2026-05-0{}", d + 1)),
                lat: coords.map(|(lat, _)| lat),
                lng: coords.map(|(_, lng)| lng),
                ..Event::new("")
            })
    }

    fn arb_catalog() -> impl Strategy<Value = Vec<Event>> {
        proptest::collection::vec(arb_event(), 0..40).prop_map(|events| {
            events
                .into_iter()
                .enumerate()
                .map(|(i, e)| Event { id: i.to_string(), ..e })
                .collect()
        })
    }

    fn arb_filters() -> impl Strategy<Value = FilterState> {
        (
            prop_oneof![Just(""), Just("lauf"), Just("TOUR")],
            proptest::sample::select(DistanceBucket::ALL.to_vec()),
            proptest::option::of(prop_oneof![Just("Laufen"), Just("Radfahren")]),
            prop_oneof![Just(SortOrder::DateAscending), Just(SortOrder::DateDescending)],
        )
            .prop_map(|(query, bucket, category, order)| {
                FilterState::new()
                    .with_text_query(query)
                    .with_bucket(bucket)
                    .with_categories(category)
                    .with_sort_order(order)
            })
    }

    proptest! {
        #[test]
        fn prop_pipeline_is_idempotent(
            events in arb_catalog(),
            filters in arb_filters(),
            radius in proptest::option::of(1.0f64..300.0),
        ) {
            let geo = radius.map(|r| GeoFilter::new(LEIPZIG, r));
            let first = run(&events, &filters, geo.as_ref());
            let second = run(first.iter().copied(), &filters, geo.as_ref());
            prop_assert_eq!(ids(&first), ids(&second));
        }

        #[test]
        fn prop_nothing_outside_radius(events in arb_catalog(), radius in 1.0f64..300.0) {
            let geo = GeoFilter::new(LEIPZIG, radius);
            for event in run(&events, &FilterState::new(), Some(&geo)) {
                let coordinate = event.coordinates();
                prop_assert!(coordinate.is_some());
                prop_assert!(haversine_distance(&LEIPZIG, &coordinate.unwrap()) <= radius);
            }
        }

        #[test]
        fn prop_results_never_exceed_input(events in arb_catalog(), filters in arb_filters()) {
            let results = run(&events, &filters, None);
            prop_assert!(results.len() <= events.len());
        }
    }
}
