//! Event detail

use super::{catalog_error, load_catalog};
use anyhow::Result;
use nextfinish_cli::output::{format_coordinate, format_distance};
use nextfinish_cli::{OutputFormat, Status};
use nextfinish_search::Event;
use std::path::Path;

/// Print one event by id
pub fn run(catalog: &Path, id: &str, format: OutputFormat) -> Result<()> {
    let events = load_catalog(catalog)?;
    let event = events.get(id).map_err(|err| catalog_error(err, catalog))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(event)?),
        OutputFormat::Text => print_event(event),
    }
    Ok(())
}

fn print_event(event: &Event) {
    Status::header(event.display_name());
    Status::field("Datum", Some(&event.formatted_date()));
    Status::field("Distanz", event.distance_km().map(format_distance).as_deref());
    Status::field("Ort", event.place());
    Status::field("Kategorie", event.category.as_deref());
    Status::field("Preis", event.price.map(|p| format!("{p:.2} €")).as_deref());
    Status::field("Link", event.link.as_deref());
    Status::field("Koordinate", event.coordinates().map(|c| format_coordinate(&c)).as_deref());

    if let Some(description) = event.description.as_deref() {
        println!();
        println!("{description}");
    }
}
