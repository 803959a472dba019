//! Engine behavior under concurrent resolutions, driven with paused tokio time.

use nextfinish_core::config::ConfigSchema;
use nextfinish_discovery::{Completion, DiscoveryEngine, SessionStatus};
use nextfinish_geo::Coordinate;
use nextfinish_geocoder::error::TRANSPORT_MESSAGE;
use nextfinish_geocoder::{PlaceResolver, ResolutionError, ResolvedPlace};
use nextfinish_search::Catalog;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const LEIPZIG: Coordinate = Coordinate::new(51.3397, 12.3731);
const BERLIN: Coordinate = Coordinate::new(52.5200, 13.4050);

/// Answers after a fixed delay per place; unknown places are not found.
#[derive(Default)]
struct ScriptedResolver {
    script: HashMap<String, (Duration, Result<ResolvedPlace, ResolutionError>)>,
    calls: AtomicUsize,
}

impl ScriptedResolver {
    fn place(mut self, name: &str, coordinate: Coordinate, delay_ms: u64) -> Self {
        let place = ResolvedPlace {
            coordinate,
            display_name: name.to_string(),
            city: Some(name.to_string()),
        };
        self.script
            .insert(name.to_string(), (Duration::from_millis(delay_ms), Ok(place)));
        self
    }

    fn failing(mut self, name: &str, delay_ms: u64) -> Self {
        self.script.insert(
            name.to_string(),
            (
                Duration::from_millis(delay_ms),
                Err(ResolutionError::Transport("503 Service Unavailable".into())),
            ),
        );
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PlaceResolver for ScriptedResolver {
    async fn lookup(&self, place_name: &str) -> Result<ResolvedPlace, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.get(place_name) {
            Some((delay, outcome)) => {
                tokio::time::sleep(*delay).await;
                outcome.clone()
            }
            None => Err(ResolutionError::NotFound(place_name.to_string())),
        }
    }
}

fn catalog() -> Catalog {
    // Distances from Leipzig: ~3 km, ~8 km, ~25 km, ~150 km (Berlin), unlocated
    Catalog::from_json_str(
        r#"[
            {"id": "near", "name": "Auensee Lauf", "distance": 5, "date": "2026-06-01",
             "lat": 51.3667, "lng": 12.3731},
            {"id": "mid", "name": "Cospudener See Run", "distance": 10, "date": "2026-05-01",
             "lat": 51.4117, "lng": 12.3731},
            {"id": "far", "name": "Grimma Halbmarathon", "distance": 21.1, "date": "2026-04-01",
             "lat": 51.5645, "lng": 12.3731},
            {"id": "berlin", "name": "Berlin Marathon", "distance": 42.195, "date": "2026-09-27",
             "lat": 52.5200, "lng": 13.4050},
            {"id": "nowhere", "name": "Virtueller Lauf", "distance": 5}
        ]"#,
    )
    .expect("valid catalog")
}

fn engine(resolver: ScriptedResolver) -> DiscoveryEngine<ScriptedResolver> {
    DiscoveryEngine::new(catalog(), resolver, &ConfigSchema::default())
}

fn ids(engine: &DiscoveryEngine<ScriptedResolver>) -> Vec<String> {
    engine.results().iter().map(|e| e.id.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn last_submission_wins_when_earlier_answer_arrives_last() {
    let resolver = ScriptedResolver::default()
        .place("Leipzig", LEIPZIG, 500)
        .place("Berlin", BERLIN, 100);
    let mut engine = engine(resolver);

    engine.submit("Leipzig", 50.0);
    engine.submit("Berlin", 50.0);
    assert_eq!(engine.in_flight(), 2);

    assert_eq!(engine.next_completion().await, Some(Completion::Applied));
    assert_eq!(engine.session().anchor(), Some(BERLIN));

    assert_eq!(engine.next_completion().await, Some(Completion::Stale));
    assert_eq!(engine.session().anchor(), Some(BERLIN));
    assert_eq!(engine.session().place_name(), Some("Berlin"));
    assert_eq!(ids(&engine), ["berlin"]);
}

#[tokio::test(start_paused = true)]
async fn last_submission_wins_when_earlier_answer_arrives_first() {
    let resolver = ScriptedResolver::default()
        .place("Leipzig", LEIPZIG, 100)
        .place("Berlin", BERLIN, 500);
    let mut engine = engine(resolver);

    engine.submit("Leipzig", 50.0);
    engine.submit("Berlin", 50.0);

    assert_eq!(engine.next_completion().await, Some(Completion::Stale));
    assert_eq!(engine.session().status(), SessionStatus::Resolving);
    assert_eq!(engine.session().anchor(), None);

    assert_eq!(engine.next_completion().await, Some(Completion::Applied));
    assert_eq!(engine.session().anchor(), Some(BERLIN));
}

#[tokio::test(start_paused = true)]
async fn radius_filter_keeps_near_events_in_date_order() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 50);
    let mut engine = engine(resolver);

    engine.submit("Leipzig", 10.0);
    engine.settle().await;

    assert_eq!(ids(&engine), ["mid", "near"]);
    let view = engine.view();
    assert_eq!(view.count, 2);
    assert!(view.distances_km.iter().all(|d| d.is_some_and(|km| km <= 10.0)));
    assert_eq!(view.viewport.center, LEIPZIG);
    assert_eq!(view.viewport.zoom, 9);
}

#[tokio::test(start_paused = true)]
async fn radius_below_slider_minimum_is_applied_as_given() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 50);
    let mut engine = engine(resolver);

    engine.submit("Leipzig", 5.0);
    engine.settle().await;

    assert_eq!(engine.session().active_radius_km(), Some(5.0));
    assert_eq!(ids(&engine), ["near"]);

    engine.adjust_radius(500.0);
    assert_eq!(engine.session().active_radius_km(), Some(500.0));
    assert_eq!(ids(&engine), ["far", "mid", "near", "berlin"]);
}

#[tokio::test(start_paused = true)]
async fn not_found_fails_with_place_name() {
    let mut engine = engine(ScriptedResolver::default().place("Leipzig", LEIPZIG, 10));

    engine.submit("Leipzig", 50.0);
    engine.settle().await;
    assert_eq!(engine.session().status(), SessionStatus::Resolved);

    engine.submit("Qxzzy-nonexistent-place", 50.0);
    engine.settle().await;

    let view = engine.view();
    assert_eq!(view.status, SessionStatus::Failed);
    assert!(view.error_message.is_some_and(|m| m.contains("Qxzzy-nonexistent-place")));
    assert_eq!(engine.session().anchor(), None);
    assert_eq!(
        engine.session().last_error(),
        Some(&ResolutionError::NotFound("Qxzzy-nonexistent-place".into()))
    );
    assert_eq!(view.count, 5);
    assert_eq!(view.viewport, engine_default_viewport());
}

fn engine_default_viewport() -> nextfinish_discovery::Viewport {
    nextfinish_discovery::ViewportSync::default().default_viewport()
}

#[tokio::test(start_paused = true)]
async fn transport_failure_uses_retry_message() {
    let mut engine = engine(ScriptedResolver::default().failing("Leipzig", 10));

    engine.submit("Leipzig", 50.0);
    engine.settle().await;

    assert_eq!(engine.session().status(), SessionStatus::Failed);
    assert_eq!(engine.session().error_message(), Some(TRANSPORT_MESSAGE));
}

#[tokio::test(start_paused = true)]
async fn slow_resolver_times_out_as_transport_failure() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 60_000);
    let mut engine = engine(resolver).with_resolve_timeout(Duration::from_secs(15));

    engine.submit("Leipzig", 50.0);
    engine.settle().await;

    assert_eq!(engine.session().status(), SessionStatus::Failed);
    assert_eq!(engine.session().error_message(), Some(TRANSPORT_MESSAGE));
    assert_eq!(engine.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn radius_adjustment_on_resolved_anchor_is_synchronous() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 50);
    let mut engine = engine(resolver);

    engine.submit("Leipzig", 10.0);
    engine.settle().await;
    assert_eq!(engine.resolver().calls(), 1);
    assert_eq!(ids(&engine), ["mid", "near"]);

    assert!(engine.adjust_radius(30.0));
    assert_eq!(engine.session().active_radius_km(), Some(30.0));
    assert_eq!(engine.in_flight(), 0);
    assert_eq!(engine.resolver().calls(), 1);
    assert_eq!(ids(&engine), ["far", "mid", "near"]);

    assert!(engine.adjust_radius(200.0));
    assert_eq!(engine.view().viewport.zoom, 7);
    assert_eq!(engine.view().count, 4);
}

#[tokio::test(start_paused = true)]
async fn radius_change_while_resolving_waits_for_resubmit() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 100);
    let mut engine = engine(resolver);

    engine.submit("Leipzig", 10.0);
    assert!(!engine.adjust_radius(100.0));
    assert_eq!(engine.session().pending_radius_km(), 100.0);

    engine.settle().await;
    assert_eq!(engine.session().active_radius_km(), Some(10.0));
}

#[tokio::test(start_paused = true)]
async fn clear_discards_in_flight_resolution() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 100);
    let mut engine = engine(resolver);
    engine.set_bucket(nextfinish_search::DistanceBucket::UpTo5);

    engine.submit("Leipzig", 50.0);
    engine.clear();
    assert_eq!(engine.next_completion().await, Some(Completion::Stale));

    let view = engine.view();
    assert_eq!(view.status, SessionStatus::Idle);
    assert_eq!(view.viewport, engine_default_viewport());
    // Bucket filter still applies without the radius
    assert_eq!(view.count, 2);
}

#[tokio::test(start_paused = true)]
async fn clear_after_resolved_restores_unfiltered_catalog() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 10);
    let mut engine = engine(resolver);

    engine.submit("Leipzig", 10.0);
    engine.settle().await;
    assert_eq!(engine.view().count, 2);

    engine.clear();
    let view = engine.view();
    assert_eq!(view.count, 5);
    assert_eq!(view.viewport, engine_default_viewport());
    assert!(view.distances_km.iter().all(Option::is_none));
}

#[tokio::test(start_paused = true)]
async fn empty_radius_result_is_a_notice_not_a_failure() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 10);
    let mut engine = engine(resolver);
    engine.set_text_query("marathon");

    engine.submit("Leipzig", 10.0);
    engine.settle().await;

    let view = engine.view();
    assert_eq!(view.status, SessionStatus::Resolved);
    assert_eq!(view.count, 0);
    assert_eq!(view.notice.as_deref(), Some("Keine Events im Umkreis von 10 km gefunden."));
}

#[tokio::test(start_paused = true)]
async fn blank_submit_clears_instead_of_resolving() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 10);
    let mut engine = engine(resolver);

    engine.submit("Leipzig", 50.0);
    engine.settle().await;

    assert!(!engine.submit("   ", 50.0));
    assert_eq!(engine.session().status(), SessionStatus::Idle);
    assert!(engine.session().error_message().is_none());
    assert_eq!(engine.resolver().calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn drain_ready_applies_only_finished_resolutions() {
    let resolver = ScriptedResolver::default().place("Leipzig", LEIPZIG, 100);
    let mut engine = engine(resolver);

    engine.submit("Leipzig", 50.0);
    assert_eq!(engine.drain_ready(), 0);
    assert!(engine.view().is_loading());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(engine.drain_ready(), 1);
    assert_eq!(engine.session().status(), SessionStatus::Resolved);
}

struct PanickingResolver;

impl PlaceResolver for PanickingResolver {
    async fn lookup(&self, place_name: &str) -> Result<ResolvedPlace, ResolutionError> {
        panic!("resolver bug while looking up {place_name}");
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_resolver_fails_the_search_instead_of_hanging() {
    let mut engine = DiscoveryEngine::new(catalog(), PanickingResolver, &ConfigSchema::default());

    engine.submit("Leipzig", 50.0);
    engine.settle().await;

    assert_eq!(engine.in_flight(), 0);
    assert_eq!(engine.session().status(), SessionStatus::Failed);
    assert_eq!(engine.session().error_message(), Some(TRANSPORT_MESSAGE));
    assert_eq!(engine.results().len(), 5);
}
