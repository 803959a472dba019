//! CLI command implementations

pub mod backfill;
pub mod resolve;
pub mod search;
pub mod show;
pub mod status;

use anyhow::Result;
use nextfinish_core::config::ConfigSchema;
use nextfinish_core::retry::RetryConfig;
use nextfinish_core::Error;
use nextfinish_geocoder::{GeocoderConfig, NominatimClient};
use nextfinish_search::{Catalog, SearchError};
use std::path::Path;
use tracing::debug;

/// Geocoder client from the `[geocoder]` section plus environment overrides
fn geocoder(schema: &ConfigSchema) -> Result<NominatimClient> {
    geocoder_with_retry(schema, RetryConfig::none())
}

fn geocoder_with_retry(schema: &ConfigSchema, retry: RetryConfig) -> Result<NominatimClient> {
    let config = GeocoderConfig::from_settings(&schema.geocoder)
        .with_retry(retry)
        .with_env_overrides()
        .map_err(|err| Error::config_invalid(err.to_string()))?;
    let client = NominatimClient::with_config(config).map_err(|err| Error::config_invalid(err.to_string()))?;
    Ok(client)
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let catalog = Catalog::load(path).map_err(|err| catalog_error(err, path))?;
    debug!(events = catalog.len(), located = catalog.located_count(), "Catalog loaded");
    Ok(catalog)
}

fn catalog_error(err: SearchError, path: &Path) -> Error {
    match err {
        SearchError::EventNotFound(id) => Error::event_not_found(&id),
        SearchError::Io(io) => Error::from(io).with_context(format!("Reading {}", path.display())),
        other => Error::catalog(other.to_string()).with_context(path.display().to_string()),
    }
}
