//! Batch distance calculations with optional parallelism.
//!
//! Used to annotate a filtered result list with each event's distance from
//! the search anchor.

use crate::{haversine_distance, Coordinate};
use serde::{Deserialize, Serialize};

/// Distance of one item from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// Position of the item in the input slice
    pub index: usize,
    /// Distance in kilometers, `None` when the item has no coordinate
    pub distance_km: Option<f64>,
}

/// Calculate distances from an anchor to every item, preserving input order.
///
/// # Example
/// ```
/// use nextfinish_geo::{calculate_distances, Coordinate};
///
/// let anchor = Coordinate::new(51.3397, 12.3731);
/// let points = [Some(Coordinate::new(52.5200, 13.4050)), None];
///
/// let results = calculate_distances(&anchor, &points);
/// assert_eq!(results.len(), 2);
/// assert!(results[0].distance_km.is_some());
/// assert!(results[1].distance_km.is_none());
/// ```
pub fn calculate_distances(anchor: &Coordinate, points: &[Option<Coordinate>]) -> Vec<DistanceResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        points
            .par_iter()
            .enumerate()
            .map(|(index, point)| single(anchor, index, point.as_ref()))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        points
            .iter()
            .enumerate()
            .map(|(index, point)| single(anchor, index, point.as_ref()))
            .collect()
    }
}

#[inline]
fn single(anchor: &Coordinate, index: usize, point: Option<&Coordinate>) -> DistanceResult {
    DistanceResult {
        index,
        distance_km: point.map(|p| haversine_distance(anchor, p)),
    }
}
