//! Coordinate backfill for catalog events that have no location yet.
//!
//! Each event name is turned into a short list of candidate place queries
//! (full name, name without race vocabulary, last word, first word). The
//! first query the resolver can place wins.

use nextfinish_geocoder::{PlaceResolver, ResolutionError, ResolvedPlace};
use nextfinish_search::{Catalog, Event};
use nextfinish_telemetry::{metrics, names};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Words in event names that never name a place.
pub const IGNORE_TERMS: [&str; 28] = [
    "marathon",
    "halbmarathon",
    "lauf",
    "triathlon",
    "ultra",
    "run",
    "city",
    "firma",
    "firmenlauf",
    "nachtlauf",
    "silvesterlauf",
    "neujahrslauf",
    "ev",
    "e.v.",
    "gmbh",
    "international",
    "internationaler",
    "den",
    "der",
    "die",
    "das",
    "winter",
    "sommer",
    "frühling",
    "herbst",
    "cross",
    "trail",
    "cup",
];

const MIN_QUERY_CHARS: usize = 3;

fn is_place_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    !IGNORE_TERMS.contains(&lower.as_str())
        && !word.chars().all(|c| c.is_ascii_digit())
        && word.chars().count() > 2
}

/// Candidate place queries for an event name, most specific first.
///
/// Duplicates and queries shorter than three characters are dropped.
pub fn candidate_queries(name: &str) -> Vec<String> {
    let name = name.trim();
    let parts: Vec<&str> = name
        .split(|c: char| c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();

    let mut queries = vec![name.to_string()];

    let places: Vec<&str> = parts.iter().copied().filter(|part| is_place_word(part)).collect();
    if !places.is_empty() {
        let cleaned = places.join(" ");
        if cleaned != name {
            queries.push(cleaned);
        }
    }

    if let [first, .., last] = parts.as_slice() {
        queries.push((*last).to_string());
        queries.push((*first).to_string());
    }

    let mut unique: Vec<String> = Vec::with_capacity(queries.len());
    for query in queries {
        if query.chars().count() >= MIN_QUERY_CHARS && !unique.contains(&query) {
            unique.push(query);
        }
    }
    unique
}

/// Result of backfilling one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BackfillOutcome {
    /// A query resolved; the event now carries coordinates
    Updated {
        /// The query that matched
        query: String,
        /// The match
        place: ResolvedPlace,
    },
    /// Every query came back without a match
    Unresolved {
        /// Queries tried, in order
        tried: Vec<String>,
    },
    /// No match, and at least one query failed in transport
    Failed {
        /// Queries tried, in order
        tried: Vec<String>,
        /// Last transport error
        error: String,
    },
}

/// One processed event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackfillEntry {
    /// Event id
    pub id: String,
    /// Name the queries were built from
    pub name: String,
    /// What happened
    #[serde(flatten)]
    pub outcome: BackfillOutcome,
}

/// Summary of a backfill run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillReport {
    /// Events without coordinates at the start
    pub candidates: usize,
    /// Events that received coordinates
    pub updated: usize,
    /// Events no query could place
    pub unresolved: usize,
    /// Events that hit transport errors and stayed unplaced
    pub failed: usize,
    /// Per-event detail, in catalog order
    pub entries: Vec<BackfillEntry>,
}

impl BackfillReport {
    fn record(&mut self, entry: BackfillEntry) {
        match entry.outcome {
            BackfillOutcome::Updated { .. } => self.updated += 1,
            BackfillOutcome::Unresolved { .. } => self.unresolved += 1,
            BackfillOutcome::Failed { .. } => self.failed += 1,
        }
        self.entries.push(entry);
    }
}

fn apply_place(event: &mut Event, place: &ResolvedPlace) {
    event.lat = Some(place.coordinate.latitude);
    event.lng = Some(place.coordinate.longitude);
    if let Some(city) = &place.city {
        event.city = Some(city.clone());
    }
    event.location = Some(place.display_name.clone());
    event.raw_location_data = serde_json::to_value(place).ok();
}

async fn locate<R: PlaceResolver>(resolver: &R, name: &str) -> BackfillOutcome {
    let queries = candidate_queries(name);
    let mut tried = Vec::with_capacity(queries.len());
    let mut last_error = None;

    for query in queries {
        tried.push(query.clone());
        match resolver.lookup(&query).await {
            Ok(place) => {
                return BackfillOutcome::Updated { query, place };
            }
            Err(ResolutionError::Transport(error)) => {
                warn!(query = %query, error = %error, "Backfill query failed");
                last_error = Some(error);
            }
            Err(err) => {
                debug!(query = %query, error = %err, "Backfill query found nothing");
            }
        }
    }

    match last_error {
        Some(error) => BackfillOutcome::Failed { tried, error },
        None => BackfillOutcome::Unresolved { tried },
    }
}

/// Resolves coordinates for every event that has none.
///
/// Events that already carry coordinates are left untouched. `on_entry` is
/// called after each processed event, e.g. to drive a progress bar.
///
/// # Errors
/// Only if rebuilding the catalog fails, which cannot happen for a catalog
/// whose ids were already unique.
pub async fn backfill_coordinates<R, F>(
    catalog: Catalog,
    resolver: &R,
    mut on_entry: F,
) -> nextfinish_search::Result<(Catalog, BackfillReport)>
where
    R: PlaceResolver,
    F: FnMut(&BackfillEntry),
{
    let mut report = BackfillReport {
        candidates: catalog.len() - catalog.located_count(),
        ..BackfillReport::default()
    };
    info!(candidates = report.candidates, "Starting coordinate backfill");

    let mut events = catalog.into_events();
    for event in events.iter_mut().filter(|event| event.coordinates().is_none()) {
        let name = event
            .name
            .as_deref()
            .or(event.title.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string();

        let outcome = locate(resolver, &name).await;
        if let BackfillOutcome::Updated { query, place } = &outcome {
            info!(id = %event.id, query = %query, place = %place.display_name, "Event located");
            apply_place(event, place);
        }

        let entry = BackfillEntry {
            id: event.id.clone(),
            name,
            outcome,
        };
        on_entry(&entry);
        report.record(entry);
    }

    metrics().increment_by(names::BACKFILL_UPDATED, report.updated as u64);
    info!(
        updated = report.updated,
        unresolved = report.unresolved,
        failed = report.failed,
        "Coordinate backfill finished"
    );

    Ok((Catalog::new(events)?, report))
}
