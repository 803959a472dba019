//! tracing subscriber setup

use anyhow::Context;
use nextfinish_core::config::LoggingSettings;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Line format on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One short human-readable line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Line format
    pub format: LogFormat,
    /// Include the module path of each event
    pub show_target: bool,
    /// Include file and line of each event
    pub show_source: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::from(&LoggingSettings::default())
    }
}

impl From<&LoggingSettings> for TelemetryConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            filter: settings.level.clone(),
            format: if settings.json { LogFormat::Json } else { LogFormat::Compact },
            show_target: false,
            show_source: false,
        }
    }
}

impl TelemetryConfig {
    /// Debug output for the discovery path, with targets and source locations
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.filter = format!(
            "{},nextfinish=debug,nextfinish_discovery=debug,nextfinish_geocoder=debug",
            self.filter
        );
        self.show_target = true;
        self.show_source = true;
        self
    }

    /// Warnings and errors only
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.filter = "warn".to_string();
        self
    }
}

/// Install the default subscriber
pub fn init() -> anyhow::Result<()> {
    init_with_config(TelemetryConfig::default())
}

/// Install a subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured filter. Fails if the filter
/// does not parse or a global subscriber is already set.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .with_context(|| format!("invalid log filter {:?}", config.filter))?,
    };

    let json = (config.format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(config.show_target)
            .with_file(config.show_source)
            .with_line_number(config.show_source)
    });
    let compact = (config.format == LogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(config.show_target)
            .with_file(config.show_source)
            .with_line_number(config.show_source)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(compact)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    tracing::debug!(session_id = %crate::session_id(), format = ?config.format, "Logging ready");
    Ok(())
}
