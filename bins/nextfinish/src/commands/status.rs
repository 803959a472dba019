//! Geocoder health probe

use super::geocoder;
use anyhow::Result;
use nextfinish_cli::output::format_duration;
use nextfinish_cli::{OutputFormat, Status};
use nextfinish_core::config::ConfigSchema;
use nextfinish_core::Error;

/// Query the status endpoint and fail unless the service is healthy
pub async fn run(schema: &ConfigSchema, format: OutputFormat) -> Result<()> {
    let client = geocoder(schema)?;
    let (status, elapsed) = client
        .status()
        .check_timed()
        .await
        .map_err(|err| Error::geocoding(err.to_string()).with_context(client.base_url().to_string()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text => {
            if status.is_healthy() {
                Status::success(&format!("{} ({})", client.base_url(), format_duration(elapsed)));
            } else {
                Status::warning(&format!("{}: {}", client.base_url(), status.message));
            }
            Status::field("Daten", status.data_updated.as_deref());
            Status::field("Version", status.software_version.as_deref());
            Status::field("Datenbank", status.database_version.as_deref());

            let limit = client.rate_limit_status();
            Status::field("Anfragen", Some(&format!("{}/{} frei", limit.available, limit.max)));
            Status::field("Circuit", Some(&format!("{:?}", client.circuit_state())));
        }
    }

    if !status.is_healthy() {
        return Err(Error::geocoding(status.message).into());
    }
    Ok(())
}
