//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Loaded configuration together with the file it came from
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// Source file, `None` when running on defaults
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, a discovered file, or defaults.
    ///
    /// An explicit path that does not exist is an error; a missing discovered
    /// file silently falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        let config = Self {
            schema,
            path: config_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        let geocoder = &self.schema.geocoder;
        if !geocoder.base_url.starts_with("http://") && !geocoder.base_url.starts_with("https://")
        {
            return Err(Error::config_invalid(
                "geocoder.base_url must start with http:// or https://",
            ));
        }
        if geocoder.user_agent.trim().is_empty() {
            return Err(Error::config_invalid("geocoder.user_agent cannot be empty"));
        }
        if geocoder.timeout_secs == 0 {
            return Err(Error::config_invalid("geocoder.timeout_secs cannot be zero"));
        }
        if geocoder.requests_per_second == 0 {
            return Err(Error::config_invalid(
                "geocoder.requests_per_second cannot be zero",
            ));
        }

        let search = &self.schema.search;
        if !(search.min_radius_km >= 0.0
            && search.min_radius_km <= search.default_radius_km
            && search.default_radius_km <= search.max_radius_km)
        {
            return Err(Error::config_invalid(format!(
                "search radius bounds must satisfy 0 <= min ({}) <= default ({}) <= max ({})",
                search.min_radius_km, search.default_radius_km, search.max_radius_km
            )));
        }
        if search.resolve_timeout_secs == 0 {
            return Err(Error::config_invalid("search.resolve_timeout_secs cannot be zero"));
        }

        Ok(())
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("nextfinish.toml"),
        PathBuf::from(".nextfinish.toml"),
        PathBuf::from(".config/nextfinish.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("nextfinish").join("config.toml"));
    }

    candidates.into_iter().find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))
}
