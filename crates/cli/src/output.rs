//! Status lines and value formatting for command output

use nextfinish_core::Error;
use nextfinish_geo::Coordinate;
use owo_colors::OwoColorize;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON document on stdout
    Json,
}

/// One-line status messages with a colored marker
///
/// Successes and notes go to stdout so they interleave with results; warnings
/// and errors go to stderr.
pub struct Status;

impl Status {
    /// Operation completed
    pub fn success(message: &str) {
        println!("{} {message}", "✓".green());
    }

    /// Operation failed
    pub fn error(message: &str) {
        eprintln!("{} {message}", "✗".red());
    }

    /// A structured error with its code, context and hint
    pub fn error_report(err: &Error) {
        Self::error(&format!("{} {}", format!("[{}]", err.code).dimmed(), err.message));
        for (label, line) in [("Kontext:", &err.context), ("Hinweis:", &err.suggestion)] {
            if let Some(line) = line {
                eprintln!("  {} {line}", label.dimmed());
            }
        }
    }

    /// Something the user should look at
    pub fn warning(message: &str) {
        eprintln!("{} {message}", "!".yellow().bold());
    }

    /// Neutral note
    pub fn info(message: &str) {
        println!("{} {message}", "·".blue());
    }

    /// Section title, underlined to its own width
    pub fn header(title: &str) {
        println!("\n{}\n{}", title.bold(), "─".repeat(title.chars().count()));
    }

    /// Label/value row; absent values print nothing
    pub fn field(label: &str, value: Option<&str>) {
        if let Some(value) = value {
            println!("  {:<12} {value}", format!("{label}:").dimmed());
        }
    }
}

/// Short human form of an elapsed time: `850ms`, `4.2s`, `2m 5s`
pub fn format_duration(duration: std::time::Duration) -> String {
    match duration.as_millis() {
        ms @ 0..=999 => format!("{ms}ms"),
        1_000..=59_999 => format!("{:.1}s", duration.as_secs_f64()),
        _ => {
            let secs = duration.as_secs();
            format!("{}m {}s", secs / 60, secs % 60)
        }
    }
}

/// Format a distance in kilometers: one decimal below 100 km, whole numbers above
pub fn format_distance(km: f64) -> String {
    if km < 100.0 {
        format!("{km:.1} km")
    } else {
        format!("{km:.0} km")
    }
}

/// Format a coordinate as `lat, lng` with four decimals
pub fn format_coordinate(coordinate: &Coordinate) -> String {
    format!("{:.4}, {:.4}", coordinate.latitude, coordinate.longitude)
}

/// `count` followed by the matching noun form
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    let noun = if count == 1 { singular } else { plural };
    format!("{count} {noun}")
}
