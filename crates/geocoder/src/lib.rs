//! Place resolution for NextFinish
//!
//! Turns a free-form place name into a coordinate through a
//! Nominatim-compatible geocoding service.
//!
//! # Features
//!
//! - **Typed failures**: [`ResolutionError`] separates "not found" from transport problems
//! - **Usage policy**: per-host rate limiting that waits for the next free slot
//! - **Circuit breaker**: stop calling a geocoder that keeps failing
//! - **Request correlation**: every request carries a unique ID for debugging
//! - **Pluggable**: anything implementing [`PlaceResolver`] can drive a search session
//!
//! # Example
//!
//! ```rust,no_run
//! use nextfinish_geocoder::{NominatimClient, PlaceResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NominatimClient::new()?;
//!
//!     let leipzig = client.resolve("Leipzig").await?;
//!     println!("{}, {}", leipzig.latitude, leipzig.longitude);
//!
//!     let status = client.status().check().await?;
//!     println!("Geocoder status: {}", status.message);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod resolver;

pub use client::NominatimClient;
pub use config::GeocoderConfig;
pub use error::{GeocoderError, GeocoderResult, ResolutionError};
pub use resolver::{place_from_candidates, PlaceResolver, ResolvedPlace, StaticResolver};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::NominatimClient;
    pub use crate::config::GeocoderConfig;
    pub use crate::endpoints::{PlaceCandidate, SearchApi, ServiceStatus, StatusApi};
    pub use crate::error::{GeocoderError, GeocoderResult, ResolutionError};
    pub use crate::resolver::{PlaceResolver, ResolvedPlace, StaticResolver};
}
