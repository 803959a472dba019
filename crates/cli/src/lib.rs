//! Terminal output helpers for the NextFinish command line
//!
//! Provides shared CLI functionality:
//! - Status messages and error reports
//! - Formatting for distances, coordinates and durations
//! - Progress indicators that stay quiet when stderr is not a terminal

#![warn(missing_docs)]

pub mod output;
pub mod progress;

pub use output::{OutputFormat, Status};
