//! The discovery engine: catalog, filters, session and resolver in one place.
//!
//! Place resolutions run as tokio tasks. Each task carries the sequence number
//! of the submit that started it and reports back over a channel; the engine
//! applies completions on its own task, so session state has a single writer.

use crate::session::{Completion, ResolveRequest, SearchSession, SessionStatus};
use crate::viewport::{Viewport, ViewportSync};
use nextfinish_core::config::ConfigSchema;
use nextfinish_geo::{calculate_distances, Coordinate};
use nextfinish_geocoder::{PlaceResolver, ResolutionError, ResolvedPlace};
use nextfinish_search::{pipeline, Catalog, DistanceBucket, Event, FilterState, SortOrder};
use nextfinish_telemetry::{metrics, names, Timer};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

struct Resolution {
    sequence: u64,
    outcome: Result<ResolvedPlace, ResolutionError>,
}

/// Everything a rendering surface needs, computed from the current state.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryView<'a> {
    /// Matching events in display order
    pub events: Vec<&'a Event>,
    /// Distance of each event from the anchor, parallel to `events`
    pub distances_km: Vec<Option<f64>>,
    /// Number of matching events
    pub count: usize,
    /// Map framing
    pub viewport: Viewport,
    /// Place search state
    pub status: SessionStatus,
    /// Error of the last failed place search
    pub error_message: Option<&'a str>,
    /// Informational message, e.g. for an empty radius search
    pub notice: Option<String>,
    /// Place name of the current search
    pub place_name: Option<&'a str>,
    /// Radius in effect, while resolved
    pub radius_km: Option<f64>,
}

impl DiscoveryView<'_> {
    /// True while a place resolution is outstanding.
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Resolving
    }
}

/// Owns a discovery session over one catalog.
///
/// Submitting a place search spawns the resolution onto the current tokio
/// runtime; call [`DiscoveryEngine::drain_ready`], [`DiscoveryEngine::next_completion`]
/// or [`DiscoveryEngine::settle`] to fold finished resolutions into the session.
///
/// # Panics
/// [`DiscoveryEngine::submit`] panics when called outside a tokio runtime.
pub struct DiscoveryEngine<R> {
    catalog: Catalog,
    filters: FilterState,
    session: SearchSession,
    viewport: ViewportSync,
    resolver: Arc<R>,
    resolve_timeout: Duration,
    tx: mpsc::UnboundedSender<Resolution>,
    rx: mpsc::UnboundedReceiver<Resolution>,
    in_flight: usize,
}

impl<R: PlaceResolver + 'static> DiscoveryEngine<R> {
    /// Creates an engine with settings from the configuration.
    pub fn new(catalog: Catalog, resolver: R, config: &ConfigSchema) -> Self {
        Self::with_shared_resolver(catalog, Arc::new(resolver), config)
    }

    /// Creates an engine around a resolver shared with other owners.
    pub fn with_shared_resolver(catalog: Catalog, resolver: Arc<R>, config: &ConfigSchema) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            catalog,
            filters: FilterState::new(),
            session: SearchSession::new(config.search.clone()),
            viewport: ViewportSync::new(&config.map),
            resolver,
            resolve_timeout: Duration::from_secs(config.search.resolve_timeout_secs),
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Overrides the resolution timeout.
    #[must_use]
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Starts a place search; a blank name clears instead.
    ///
    /// Returns true if a resolution was started.
    pub fn submit(&mut self, place_name: &str, radius_km: f64) -> bool {
        match self.session.submit(place_name, radius_km) {
            Some(request) => {
                self.spawn_resolution(request);
                true
            }
            None => false,
        }
    }

    /// Moves the radius slider; applies immediately while resolved.
    pub fn adjust_radius(&mut self, radius_km: f64) -> bool {
        self.session.adjust_radius(radius_km)
    }

    /// Drops the place search. In-flight resolutions will be discarded.
    pub fn clear(&mut self) {
        self.session.clear();
    }

    /// Replaces the text query.
    pub fn set_text_query(&mut self, query: impl Into<String>) {
        self.filters.set_text_query(query);
    }

    /// Replaces the distance bucket.
    pub fn set_bucket(&mut self, bucket: DistanceBucket) {
        self.filters.set_bucket(bucket);
    }

    /// Toggles a category; returns true if it is now selected.
    pub fn toggle_category(&mut self, category: &str) -> bool {
        self.filters.toggle_category(category)
    }

    /// Selects a category without toggling; returns false if already selected.
    pub fn select_category(&mut self, category: &str) -> bool {
        self.filters.select_category(category)
    }

    /// Removes every category selection.
    pub fn clear_categories(&mut self) {
        self.filters.clear_categories();
    }

    /// Replaces the sort order.
    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.filters.set_sort_order(order);
    }

    /// Resets text, bucket and categories.
    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }

    fn spawn_resolution(&mut self, request: ResolveRequest) {
        let resolver = Arc::clone(&self.resolver);
        let tx = self.tx.clone();
        let limit = self.resolve_timeout;

        self.in_flight += 1;
        metrics().increment(names::SUBMISSIONS);

        tokio::spawn(async move {
            let timer = Timer::start(names::RESOLVE_MS);
            let place_name = request.place_name.clone();
            // The lookup runs in its own task so a panicking resolver still produces a completion
            let mut lookup = tokio::spawn(async move { resolver.lookup(&place_name).await });
            let outcome = match tokio::time::timeout(limit, &mut lookup).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(join_error)) => Err(ResolutionError::Transport(format!("resolver task failed: {join_error}"))),
                Err(_) => {
                    lookup.abort();
                    Err(ResolutionError::Transport(format!("no answer within {}s", limit.as_secs())))
                }
            };
            timer.stop();

            let resolution = Resolution {
                sequence: request.sequence,
                outcome,
            };
            if tx.send(resolution).is_err() {
                debug!(sequence = request.sequence, "Engine dropped before resolution finished");
            }
        });
    }

    fn apply(&mut self, resolution: Resolution) -> Completion {
        self.in_flight = self.in_flight.saturating_sub(1);
        let completion = self.session.complete(resolution.sequence, resolution.outcome);
        let metric = match (completion, self.session.status()) {
            (Completion::Stale, _) => names::STALE,
            (Completion::Applied, SessionStatus::Failed) => names::FAILED,
            (Completion::Applied, _) => names::APPLIED,
        };
        metrics().increment(metric);
        completion
    }

    /// Applies every resolution that has already finished, without waiting.
    ///
    /// Returns how many changed the session.
    pub fn drain_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(resolution) = self.rx.try_recv() {
            if self.apply(resolution) == Completion::Applied {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next resolution to finish and applies it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.in_flight == 0 {
            return None;
        }
        let resolution = self.rx.recv().await?;
        Some(self.apply(resolution))
    }

    /// Waits until every in-flight resolution has been applied or discarded.
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    /// Number of resolutions started but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// The catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current filter inputs.
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Current place search state.
    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// The resolver used for place searches.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Matching events in display order.
    pub fn results(&self) -> Vec<&Event> {
        let geo = self.session.geo_filter();
        pipeline::run(&self.catalog, &self.filters, geo.as_ref())
    }

    /// Computes the full rendering state.
    pub fn view(&self) -> DiscoveryView<'_> {
        let geo = self.session.geo_filter();
        let events = pipeline::run(&self.catalog, &self.filters, geo.as_ref());

        let distances_km = match &geo {
            Some(geo) => {
                let points: Vec<Option<Coordinate>> = events.iter().map(|event| event.coordinates()).collect();
                calculate_distances(&geo.anchor, &points)
                    .into_iter()
                    .map(|result| result.distance_km)
                    .collect()
            }
            None => vec![None; events.len()],
        };

        let count = events.len();
        metrics().gauge(names::RESULT_COUNT, count as u64);

        DiscoveryView {
            notice: self.session.empty_result_notice(count),
            events,
            distances_km,
            count,
            viewport: self.viewport.derive(&self.session),
            status: self.session.status(),
            error_message: self.session.error_message(),
            place_name: self.session.place_name(),
            radius_km: self.session.active_radius_km(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextfinish_geocoder::StaticResolver;

    const LEIPZIG: Coordinate = Coordinate::new(51.3397, 12.3731);

    fn catalog() -> Catalog {
        Catalog::from_json_str(
            r#"[
                {"id": "1", "name": "Leipzig Marathon", "category": "Laufen", "distance": 42.195,
                 "date": "2026-04-12", "lat": 51.34, "lng": 12.37},
                {"id": "2", "name": "Berlin Halbmarathon", "category": "Laufen", "distance": 21.1,
                 "date": "2026-04-05", "lat": 52.52, "lng": 13.40},
                {"id": "3", "name": "Elbe Radtour", "category": "Radfahren", "date": "2026-05-01"}
            ]"#,
        )
        .unwrap()
    }

    fn engine() -> DiscoveryEngine<StaticResolver> {
        let resolver = StaticResolver::new().with_place("Leipzig", LEIPZIG);
        DiscoveryEngine::new(catalog(), resolver, &ConfigSchema::default())
    }

    fn ids(view: &DiscoveryView<'_>) -> Vec<String> {
        view.events.iter().map(|e| e.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_initial_view_is_unfiltered() {
        let engine = engine();
        let view = engine.view();
        assert_eq!(ids(&view), ["2", "1", "3"]);
        assert_eq!(view.status, SessionStatus::Idle);
        assert_eq!(view.viewport.zoom, 6);
        assert!(view.distances_km.iter().all(Option::is_none));
        assert!(view.notice.is_none());
    }

    #[tokio::test]
    async fn test_submit_then_settle_applies_radius() {
        let mut engine = engine();
        assert!(engine.submit("Leipzig", 50.0));
        assert!(engine.view().is_loading());

        engine.settle().await;
        assert_eq!(engine.in_flight(), 0);

        let view = engine.view();
        assert_eq!(view.status, SessionStatus::Resolved);
        assert_eq!(ids(&view), ["1"]);
        assert_eq!(view.viewport.center, LEIPZIG);
        assert!(view.distances_km[0].unwrap() < 1.0);
        assert_eq!(view.radius_km, Some(50.0));
    }

    #[tokio::test]
    async fn test_filters_apply_alongside_radius() {
        let mut engine = engine();
        engine.set_bucket(DistanceBucket::HalfMarathon);
        engine.submit("Leipzig", 200.0);
        engine.settle().await;

        let view = engine.view();
        assert_eq!(ids(&view), ["2"]);

        engine.set_bucket(DistanceBucket::All);
        engine.toggle_category("Radfahren");
        let view = engine.view();
        assert!(view.events.is_empty());
        assert_eq!(view.notice.as_deref(), Some("Keine Events im Umkreis von 200 km gefunden."));
    }

    #[tokio::test]
    async fn test_not_found_surfaces_message() {
        let mut engine = engine();
        engine.submit("Qxzzy-nonexistent-place", 50.0);
        assert_eq!(engine.next_completion().await, Some(Completion::Applied));

        let view = engine.view();
        assert_eq!(view.status, SessionStatus::Failed);
        assert!(view.error_message.unwrap().contains("Qxzzy-nonexistent-place"));
        assert_eq!(view.count, 3);
    }

    #[tokio::test]
    async fn test_blank_submit_starts_nothing() {
        let mut engine = engine();
        assert!(!engine.submit("  ", 50.0));
        assert_eq!(engine.in_flight(), 0);
        assert_eq!(engine.next_completion().await, None);
    }

    #[tokio::test]
    async fn test_text_query_and_sort() {
        let mut engine = engine();
        engine.set_text_query("marathon");
        engine.set_sort_order(SortOrder::DateDescending);
        assert_eq!(ids(&engine.view()), ["1", "2"]);

        engine.reset_filters();
        assert_eq!(engine.view().count, 3);
    }
}
