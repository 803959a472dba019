//! Event catalog and filter pipeline for NextFinish.
//!
//! This crate provides:
//! - The [`Event`] record and its display helpers
//! - An immutable, ordered [`Catalog`]
//! - [`FilterState`] with named transitions and the [`DistanceBucket`] enum
//! - The pure [`pipeline::run`] function turning a catalog and filters into
//!   an ordered result set
//!
//! # Example
//!
//! ```
//! use nextfinish_geo::Coordinate;
//! use nextfinish_search::{pipeline, Catalog, FilterState, GeoFilter};
//!
//! let catalog = Catalog::from_json_str(r#"[
//!     {"id": "1", "name": "Leipzig Marathon", "lat": 51.34, "lng": 12.37},
//!     {"id": "2", "name": "Berlin Marathon", "lat": 52.52, "lng": 13.40}
//! ]"#).unwrap();
//!
//! let geo = GeoFilter::new(Coordinate::new(51.3397, 12.3731), 50.0);
//! let results = pipeline::run(&catalog, &FilterState::new(), Some(&geo));
//! assert_eq!(results.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bucket;
mod catalog;
mod error;
mod event;
mod filter;
pub mod pipeline;

pub use bucket::{DistanceBucket, ParseBucketError, HALF_MARATHON_KM, MARATHON_KM, NAMED_RACE_TOLERANCE_KM};
pub use catalog::Catalog;
pub use error::{Result, SearchError};
pub use event::{Event, UNKNOWN_DATE, UNTITLED_EVENT};
pub use filter::{FilterState, GeoFilter, SortOrder};
