//! Place name lookup

use super::geocoder;
use anyhow::Result;
use nextfinish_cli::output::format_coordinate;
use nextfinish_cli::{progress, OutputFormat, Status};
use nextfinish_core::config::ConfigSchema;
use nextfinish_core::Error;
use nextfinish_geocoder::PlaceResolver;

/// Resolve a place name and print the best match
pub async fn run(place: &str, schema: &ConfigSchema, format: OutputFormat) -> Result<()> {
    let client = geocoder(schema)?;
    let pb = progress::spinner(&format!("Suche {place}..."));

    let resolved = match client.lookup(place).await {
        Ok(resolved) => {
            progress::finish_success(&pb, &resolved.display_name);
            resolved
        }
        Err(err) => {
            progress::finish_error(&pb, &err.user_message());
            return Err(Error::from(err).into());
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolved)?),
        OutputFormat::Text => {
            Status::header(&resolved.display_name);
            Status::field("Koordinate", Some(&format_coordinate(&resolved.coordinate)));
            Status::field("Stadt", resolved.city.as_deref());
        }
    }
    Ok(())
}
