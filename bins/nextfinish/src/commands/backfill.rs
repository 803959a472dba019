//! Coordinate backfill for a catalog file

use super::{catalog_error, geocoder_with_retry, load_catalog};
use anyhow::Result;
use nextfinish_cli::output::format_count;
use nextfinish_cli::{progress, OutputFormat, Status};
use nextfinish_core::config::ConfigSchema;
use nextfinish_core::retry::RetryConfig;
use nextfinish_core::Error;
use nextfinish_discovery::{backfill_coordinates, BackfillOutcome, BackfillReport};
use std::path::Path;

/// Geocode events without coordinates and optionally write the result
pub async fn run(
    catalog: &Path,
    output: Option<&Path>,
    dry_run: bool,
    schema: &ConfigSchema,
    format: OutputFormat,
) -> Result<()> {
    let events = load_catalog(catalog)?;
    let client = geocoder_with_retry(schema, RetryConfig::patient())?;
    let pending = events.len() - events.located_count();

    if pending == 0 {
        Status::success("Alle Events haben bereits Koordinaten.");
    }

    let pb = progress::progress_bar(pending as u64, "Geocoding");
    let (updated, report) = backfill_coordinates(events, &client, |entry| {
        pb.set_message(entry.name.clone());
        pb.inc(1);
    })
    .await
    .map_err(|err| catalog_error(err, catalog))?;
    progress::finish_success(&pb, &format_count(report.updated, "Event verortet", "Events verortet"));

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    match output {
        Some(path) if !dry_run => {
            let json = updated.to_json_pretty().map_err(|err| catalog_error(err, path))?;
            std::fs::write(path, json)
                .map_err(|err| Error::from(err).with_context(format!("Writing {}", path.display())))?;
            Status::success(&format!("Katalog geschrieben: {}", path.display()));
        }
        _ => Status::info("Probelauf, nichts geschrieben"),
    }
    Ok(())
}

fn print_report(report: &BackfillReport) {
    for entry in &report.entries {
        match &entry.outcome {
            BackfillOutcome::Updated { query, place } => {
                Status::success(&format!("{} → {} (via \"{query}\")", entry.name, place.display_name));
            }
            BackfillOutcome::Unresolved { tried } => {
                Status::warning(&format!("{}: kein Ort gefunden ({} Versuche)", entry.name, tried.len()));
            }
            BackfillOutcome::Failed { error, .. } => {
                Status::error(&format!("{}: {error}", entry.name));
            }
        }
    }

    Status::header("Zusammenfassung");
    Status::field("Ohne Ort", Some(&report.candidates.to_string()));
    Status::field("Verortet", Some(&report.updated.to_string()));
    Status::field("Nicht gefunden", Some(&report.unresolved.to_string()));
    Status::field("Fehler", Some(&report.failed.to_string()));
}
