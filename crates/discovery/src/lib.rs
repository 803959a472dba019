//! Discovery sessions for NextFinish.
//!
//! Ties the event catalog, the filter pipeline and place resolution together:
//!
//! - [`SearchSession`]: the place search state machine, last submit wins
//! - [`ViewportSync`]: map framing derived from the session
//! - [`DiscoveryEngine`]: runs resolutions on tokio and exposes a [`DiscoveryView`]
//! - [`backfill`]: resolves coordinates for catalog events that lack them
//!
//! # Example
//!
//! ```
//! use nextfinish_core::config::ConfigSchema;
//! use nextfinish_discovery::{DiscoveryEngine, SessionStatus};
//! use nextfinish_geo::Coordinate;
//! use nextfinish_geocoder::StaticResolver;
//! use nextfinish_search::Catalog;
//!
//! # tokio_test::block_on(async {
//! let catalog = Catalog::from_json_str(r#"[
//!     {"id": "1", "name": "Leipzig Marathon", "lat": 51.34, "lng": 12.37},
//!     {"id": "2", "name": "Berlin Marathon", "lat": 52.52, "lng": 13.40}
//! ]"#).unwrap();
//! let resolver = StaticResolver::new().with_place("Leipzig", Coordinate::new(51.3397, 12.3731));
//!
//! let mut engine = DiscoveryEngine::new(catalog, resolver, &ConfigSchema::default());
//! engine.submit("Leipzig", 50.0);
//! engine.settle().await;
//!
//! let view = engine.view();
//! assert_eq!(view.status, SessionStatus::Resolved);
//! assert_eq!(view.count, 1);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backfill;
mod engine;
mod session;
mod viewport;

pub use backfill::{backfill_coordinates, candidate_queries, BackfillEntry, BackfillOutcome, BackfillReport};
pub use engine::{DiscoveryEngine, DiscoveryView};
pub use session::{Completion, ResolveRequest, SearchSession, SessionStatus};
pub use viewport::{zoom_for_radius, Viewport, ViewportSync};
