use std::cmp::Ordering;

use crate::core::distance::haversine_distance;
use crate::models::{Coordinate, ProximityResult};

/// Distance from `origin` to `point` if it lies within `max_distance_km`
/// (inclusive boundary).
#[inline]
pub fn distance_within(origin: Coordinate, max_distance_km: f64, point: Coordinate) -> Option<f64> {
    let distance_km = haversine_distance(origin, point);
    (distance_km <= max_distance_km).then_some(distance_km)
}

/// Stable ascending sort by distance.
///
/// Equal distances keep their incoming order, which is the store's fetch
/// order.
pub fn sort_by_distance<T>(results: &mut [ProximityResult<T>]) {
    results.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
}

/// Rank candidates by proximity to `origin`
///
/// Every candidate's distance is computed; those farther than
/// `max_distance_km` are dropped and the rest are sorted ascending.
/// A non-positive radius is accepted and only keeps exact matches of the
/// origin.
pub fn rank_by_proximity<T, I>(
    origin: Coordinate,
    max_distance_km: f64,
    candidates: I,
) -> Vec<ProximityResult<T>>
where
    I: IntoIterator<Item = (T, Coordinate)>,
{
    let mut ranked: Vec<ProximityResult<T>> = candidates
        .into_iter()
        .filter_map(|(entity, point)| {
            distance_within(origin, max_distance_km, point)
                .map(|distance_km| ProximityResult::new(entity, distance_km))
        })
        .collect();

    sort_by_distance(&mut ranked);
    ranked
}
