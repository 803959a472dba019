//! NextFinish CLI
//!
//! Browse an event catalog, search around a place and backfill coordinates.

use anyhow::Result;
use clap::{Parser, Subcommand};
use nextfinish_cli::{OutputFormat, Status};
use nextfinish_core::config::{Config, ConfigSchema};
use nextfinish_core::error::{exit_codes, Error};
use nextfinish_search::{DistanceBucket, SortOrder};
use nextfinish_telemetry::{metrics, TelemetryConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

mod commands;

use commands::{backfill, resolve, search, show, status};

#[derive(Parser)]
#[command(name = "nextfinish")]
#[command(about = "Find running events near a place")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Print collected metrics as JSON to stderr when done
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events, optionally filtered and limited to a radius around a place
    Search {
        /// Event catalog (JSON array)
        #[arg(long)]
        catalog: PathBuf,
        /// Text to look for in name, title, description and location
        #[arg(short = 'q', long)]
        query: Option<String>,
        /// Only these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Distance bucket: all, marathon, half-marathon, up-to5, from5-to10, from10-to21, over21
        #[arg(long, default_value = "all")]
        bucket: DistanceBucket,
        /// Date order: asc or desc
        #[arg(long, default_value = "asc")]
        sort: SortOrder,
        /// Place to search around
        #[arg(long)]
        place: Option<String>,
        /// Search radius in km (defaults to the configured radius)
        #[arg(long, requires = "place")]
        radius: Option<f64>,
    },

    /// Show one event
    Show {
        /// Event catalog (JSON array)
        #[arg(long)]
        catalog: PathBuf,
        /// Event id
        id: String,
    },

    /// Resolve a place name to a coordinate
    Resolve {
        /// Place name
        place: String,
    },

    /// Look up coordinates for events that have none
    Backfill {
        /// Event catalog (JSON array)
        #[arg(long)]
        catalog: PathBuf,
        /// Where to write the updated catalog
        #[arg(short, long, required_unless_present = "dry_run")]
        output: Option<PathBuf>,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Check the geocoding service
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            report(&err, cli.format);
            return exit_code(err.exit_code());
        }
    };

    init_logging(&cli, &config.schema);
    debug!(path = ?config.path, "Configuration loaded");

    let format = cli.format;
    let show_metrics = cli.metrics;
    let outcome = run(cli, &config.schema).await;
    if show_metrics {
        print_metrics();
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<Error>() {
            Some(err) => {
                report(err, format);
                exit_code(err.exit_code())
            }
            None => {
                Status::error(&format!("{err:#}"));
                exit_code(exit_codes::FAILURE)
            }
        },
    }
}

fn report(err: &Error, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&err.to_report()) {
            Ok(json) => println!("{json}"),
            Err(_) => Status::error_report(err),
        },
        OutputFormat::Text => Status::error_report(err),
    }
}

fn print_metrics() {
    match serde_json::to_string_pretty(&metrics().export_json()) {
        Ok(json) => eprintln!("{json}"),
        Err(err) => Status::warning(&format!("Metrics unavailable: {err}")),
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn init_logging(cli: &Cli, schema: &ConfigSchema) {
    let mut telemetry = TelemetryConfig::from(&schema.logging);
    if cli.quiet {
        telemetry = telemetry.quiet();
    } else if cli.verbose > 0 {
        telemetry = telemetry.verbose();
    }
    if let Err(err) = nextfinish_telemetry::init_with_config(telemetry) {
        Status::warning(&format!("Logging disabled: {err}"));
    }
}

async fn run(cli: Cli, schema: &ConfigSchema) -> Result<()> {
    let format = cli.format;

    match cli.command {
        Commands::Search {
            catalog,
            query,
            categories,
            bucket,
            sort,
            place,
            radius,
        } => {
            let args = search::SearchArgs {
                query,
                categories,
                bucket,
                sort,
                place,
                radius,
            };
            search::run(&catalog, args, schema, format).await
        }
        Commands::Show { catalog, id } => show::run(&catalog, &id, format),
        Commands::Resolve { place } => resolve::run(&place, schema, format).await,
        Commands::Backfill {
            catalog,
            output,
            dry_run,
        } => backfill::run(&catalog, output.as_deref(), dry_run, schema, format).await,
        Commands::Status => status::run(schema, format).await,
    }
}
