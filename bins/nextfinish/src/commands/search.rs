//! Event search: filters plus an optional radius around a place

use super::{geocoder, load_catalog};
use anyhow::Result;
use nextfinish_cli::output::{format_coordinate, format_count, format_distance};
use nextfinish_cli::{progress, OutputFormat, Status};
use nextfinish_core::config::ConfigSchema;
use nextfinish_core::Error;
use nextfinish_discovery::{DiscoveryEngine, DiscoveryView, SessionStatus};
use nextfinish_search::{DistanceBucket, SortOrder};
use owo_colors::OwoColorize;
use std::path::Path;

/// Filter inputs collected from the command line
pub struct SearchArgs {
    pub query: Option<String>,
    pub categories: Vec<String>,
    pub bucket: DistanceBucket,
    pub sort: SortOrder,
    pub place: Option<String>,
    pub radius: Option<f64>,
}

/// Run a search and print the resulting view
pub async fn run(catalog: &Path, args: SearchArgs, schema: &ConfigSchema, format: OutputFormat) -> Result<()> {
    let radius = args.radius.unwrap_or(schema.search.default_radius_km);
    check_radius(radius, schema)?;

    let events = load_catalog(catalog)?;
    let mut engine = DiscoveryEngine::new(events, geocoder(schema)?, schema);

    if let Some(query) = args.query {
        engine.set_text_query(query);
    }
    for category in &args.categories {
        engine.select_category(category);
    }
    engine.set_bucket(args.bucket);
    engine.set_sort_order(args.sort);

    if let Some(place) = &args.place {
        if engine.submit(place, radius) {
            let pb = progress::spinner(&format!("Suche {place}..."));
            engine.settle().await;
            if engine.session().status() == SessionStatus::Resolved {
                progress::finish_success(&pb, place);
            } else {
                progress::finish_error(&pb, place);
            }
        }
    }

    let view = engine.view();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => print_view(&view, engine.session().resolved_place().map(|p| p.display_name.as_str())),
    }

    if let Some(err) = engine.session().last_error() {
        let place = view.place_name.unwrap_or_default();
        return Err(Error::from(err.clone())
            .with_context(format!("Place search for \"{place}\""))
            .into());
    }
    Ok(())
}

/// Reject radii outside the configured slider bounds instead of adjusting them
fn check_radius(radius: f64, schema: &ConfigSchema) -> Result<(), Error> {
    let search = &schema.search;
    if search.radius_in_range(radius) {
        Ok(())
    } else {
        Err(Error::validation(format!("Radius {radius} km is outside the allowed range"))
            .with_suggestion(format!(
                "Pick a radius between {} and {} km",
                search.min_radius_km, search.max_radius_km
            )))
    }
}

fn print_view(view: &DiscoveryView<'_>, anchor_name: Option<&str>) {
    if let (Some(name), Some(radius)) = (anchor_name, view.radius_km) {
        Status::info(&format!("{radius} km um {name}"));
    }
    if let Some(notice) = &view.notice {
        Status::warning(notice);
    }

    Status::header(&format_count(view.count, "Event", "Events"));
    for (event, away) in view.events.iter().zip(&view.distances_km) {
        let mut line = format!("{}  {}", event.formatted_date().dimmed(), event.display_name().bold());
        if let Some(km) = event.distance_km() {
            line.push_str(&format!("  {}", format_distance(km).cyan()));
        }
        if let Some(place) = event.place() {
            line.push_str(&format!("  {place}"));
        }
        if let Some(away) = away {
            line.push_str(&format!("  {}", format!("({} entfernt)", format_distance(*away)).dimmed()));
        }
        println!("  {line}");
    }

    println!();
    let map = format!("{} (Zoom {})", format_coordinate(&view.viewport.center), view.viewport.zoom);
    Status::field("Karte", Some(&map));
}
