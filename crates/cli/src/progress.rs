//! Progress indicators
//!
//! Spinners for single lookups and bars for batch jobs. Both draw to stderr
//! and are hidden when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

fn attach(pb: &ProgressBar) {
    if !console::Term::stderr().is_term() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
}

/// Spinner for a single lookup of unknown duration
pub fn spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["◜", "◠", "◝", "◞", "◡", "◟", "✓"]);
    let pb = ProgressBar::new_spinner().with_style(style).with_message(message.to_string());
    attach(&pb);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bar for a batch with a known number of items
pub fn progress_bar(total: u64, message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{prefix:.bold} [{bar:30.green/white}] {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    let pb = ProgressBar::new(total).with_style(style).with_prefix(message.to_string());
    attach(&pb);
    pb
}

/// Stop the indicator, leaving a success line
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.set_prefix("");
    pb.finish_with_message(format!("✓ {message}"));
}

/// Stop the indicator, leaving a failure line
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.set_prefix("");
    pb.abandon_with_message(format!("✗ {message}"));
}
