//! Endpoint-specific API implementations
//!
//! | Module | Nominatim endpoint | Description |
//! |--------|--------------------|-------------|
//! | `search` | `/search` | Forward geocoding by free-form place name |
//! | `status` | `/status` | Service health probe |

pub mod search;
pub mod status;

pub use search::{Address, PlaceCandidate, SearchApi};
pub use status::{ServiceStatus, StatusApi};
